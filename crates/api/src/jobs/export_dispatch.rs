//! Claims queued export jobs and runs them.

use std::sync::Arc;

use persistence::repositories::ExportJobRepository;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::scheduler::{Job, JobFrequency};
use crate::services::ExportRunner;

/// Runs at most one `process` export job per tick.
pub struct ExportDispatchJob {
    jobs: ExportJobRepository,
    runner: Arc<ExportRunner>,
    interval_secs: u64,
}

impl ExportDispatchJob {
    pub fn new(pool: PgPool, runner: Arc<ExportRunner>, interval_secs: u64) -> Self {
        Self {
            jobs: ExportJobRepository::new(pool),
            runner,
            interval_secs,
        }
    }
}

#[async_trait::async_trait]
impl Job for ExportDispatchJob {
    fn name(&self) -> &'static str {
        "export_dispatch"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    async fn execute(&self, cancel: &CancellationToken) -> Result<(), String> {
        if cancel.is_cancelled() {
            return Ok(());
        }

        let Some(entity) = self
            .jobs
            .claim_next()
            .await
            .map_err(|e| format!("Failed to claim export job: {}", e))?
        else {
            debug!("No queued export job");
            return Ok(());
        };

        let job_id = entity.id;
        info!(job_id = %job_id, "Export job claimed");
        let status = self
            .runner
            .run(entity.into())
            .await
            .map_err(|e| format!("Export job {} failed: {}", job_id, e))?;
        info!(job_id = %job_id, status = %status, "Export job done");
        Ok(())
    }
}
