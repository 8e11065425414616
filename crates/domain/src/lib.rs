//! Domain layer for the culture map backend.
//!
//! This crate contains:
//! - Domain models (import/export jobs, locations, events, terms)
//! - The import pipeline: header mapping, row transformation, geocoding ranking
//! - Localised job messages

pub mod models;
pub mod services;
