//! Domain models for the culture map import pipeline.

pub mod event;
pub mod export_job;
pub mod geocoding;
pub mod import_job;
pub mod job_status;
pub mod language;
pub mod location;
pub mod publish_status;
pub mod taxonomy;

pub use event::{Event, EventData};
pub use export_job::{CreateExportJobRequest, ExportJob, ExportMeta};
pub use geocoding::{
    Address, AddressCandidate, BoundingBox, Coordinates, GeocodingInfo, GeocodingResult,
};
pub use import_job::{ImportJob, ImportKind, MappingEntry, UpdateImportJobRequest};
pub use job_status::JobStatus;
pub use language::{Lang, Translated};
pub use location::{Contact, Location, LocationData, SocialMedia};
pub use publish_status::PublishStatus;
pub use taxonomy::{Term, TermDictionary};
