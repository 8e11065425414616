//! Runners, provider clients and file handling behind the routes and jobs.

pub mod csv_source;
pub mod export_runner;
pub mod file_store;
pub mod geocoding;
pub mod import_runner;

pub use export_runner::ExportRunner;
pub use file_store::FileStore;
pub use geocoding::{build_geocoder, Geocoder};
pub use import_runner::{ImportRunner, ImportSettings};
