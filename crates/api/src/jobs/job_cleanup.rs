//! Purges soft-deleted import and export jobs.

use chrono::{Duration, Utc};
use persistence::repositories::{ExportJobRepository, ImportJobRepository};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::scheduler::{Job, JobFrequency};

/// Removes `deleted` job rows once they are older than the retention window.
pub struct JobCleanupJob {
    imports: ImportJobRepository,
    exports: ExportJobRepository,
    retention_days: u32,
}

impl JobCleanupJob {
    pub fn new(pool: PgPool, retention_days: u32) -> Self {
        Self {
            imports: ImportJobRepository::new(pool.clone()),
            exports: ExportJobRepository::new(pool),
            retention_days,
        }
    }
}

#[async_trait::async_trait]
impl Job for JobCleanupJob {
    fn name(&self) -> &'static str {
        "job_cleanup"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Daily
    }

    async fn execute(&self, _cancel: &CancellationToken) -> Result<(), String> {
        let before = Utc::now() - Duration::days(i64::from(self.retention_days));

        let imports = self
            .imports
            .purge_deleted(before)
            .await
            .map_err(|e| format!("Failed to purge import jobs: {}", e))?;
        let exports = self
            .exports
            .purge_deleted(before)
            .await
            .map_err(|e| format!("Failed to purge export jobs: {}", e))?;

        info!(
            imports_purged = imports,
            exports_purged = exports,
            retention_days = self.retention_days,
            "Deleted jobs purged"
        );
        Ok(())
    }
}
