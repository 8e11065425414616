//! Claims queued import jobs and runs them.

use std::sync::Arc;

use persistence::repositories::ImportJobRepository;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::scheduler::{Job, JobFrequency};
use crate::services::ImportRunner;

/// Runs at most one `process` import job per tick, to completion.
pub struct ImportDispatchJob {
    jobs: ImportJobRepository,
    runner: Arc<ImportRunner>,
    interval_secs: u64,
}

impl ImportDispatchJob {
    pub fn new(pool: PgPool, runner: Arc<ImportRunner>, interval_secs: u64) -> Self {
        Self {
            jobs: ImportJobRepository::new(pool),
            runner,
            interval_secs,
        }
    }
}

#[async_trait::async_trait]
impl Job for ImportDispatchJob {
    fn name(&self) -> &'static str {
        "import_dispatch"
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
            .map_err(|e| format!("Failed to claim import job: {}", e))?
        else {
            debug!("No queued import job");
            return Ok(());
        };

        let job_id = entity.id;
        info!(job_id = %job_id, "Import job claimed");
        let status = self
            .runner
            .run(entity.into(), cancel)
            .await
            .map_err(|e| format!("Import job {} failed: {}", job_id, e))?;
        info!(job_id = %job_id, status = %status, "Import job done");
        Ok(())
    }
}
