//! Repository implementations for database operations.

pub mod event;
pub mod export_job;
pub mod import_job;
pub mod location;
pub mod taxonomy;

pub use event::EventRepository;
pub use export_job::ExportJobRepository;
pub use import_job::{ImportJobChanges, ImportJobRepository, NewImportJob};
pub use location::{next_free_slug, LocationRepository};
pub use taxonomy::TermRepository;
