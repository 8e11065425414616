//! Background job scheduler and job implementations.

mod export_dispatch;
mod import_dispatch;
mod job_cleanup;
mod queue_metrics;
mod scheduler;

pub use export_dispatch::ExportDispatchJob;
pub use import_dispatch::ImportDispatchJob;
pub use job_cleanup::JobCleanupJob;
pub use queue_metrics::QueueMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
