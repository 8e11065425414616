//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod content;
pub mod data_job;

pub use content::{EventEntity, LocationEntity, TermEntity};
pub use data_job::{ExportJobEntity, ImportJobEntity};
