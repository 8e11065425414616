//! Shared utilities and common types for the culture map backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Content hashing for import deduplication
//! - JWT validation and editorial roles
//! - Page-based pagination
//! - Slug and cell normalisation
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod text;
pub mod validation;
