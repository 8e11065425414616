//! Import pipeline logic.
//!
//! Everything here is pure: no I/O, no database. The api crate feeds these
//! functions with file contents, provider answers and stored records.

pub mod export_rows;
pub mod geocode_ranking;
pub mod header_mapper;
pub mod headers;
pub mod job_context;
pub mod messages;
pub mod row_transformer;

pub use geocode_ranking::{
    center_of_gravity, geocoding_get_address_candidates, get_best_matching_location,
    needs_geocoding,
};
pub use header_mapper::{apply_assignments, map_headers, validate_mapping, MappingError, MappingValidation};
pub use job_context::{ImportStats, JobContext, RowAction, RowOutcome};
pub use messages::Message;
pub use row_transformer::{
    natural_key_hash, transform_row, Existing, RawRow, RowPayload, TransformContext,
    TransformError, TransformedRow,
};
