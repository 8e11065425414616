//! HTTP route handlers.

pub mod data_exports;
pub mod data_imports;
pub mod health;
