//! Periodic database gauges: pool usage and job counts per status.

use persistence::metrics::{record_job_statuses, record_pool_metrics};
use persistence::repositories::{ExportJobRepository, ImportJobRepository};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use super::scheduler::{Job, JobFrequency};

pub struct QueueMetricsJob {
    pool: PgPool,
    imports: ImportJobRepository,
    exports: ExportJobRepository,
}

impl QueueMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self {
            imports: ImportJobRepository::new(pool.clone()),
            exports: ExportJobRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait::async_trait]
impl Job for QueueMetricsJob {
    fn name(&self) -> &'static str {
        "queue_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(10)
    }

    async fn execute(&self, _cancel: &CancellationToken) -> Result<(), String> {
        record_pool_metrics(&self.pool);

        let imports = self.imports.status_counts().await.map_err(|e| e.to_string())?;
        record_job_statuses("data_imports", &imports);
        let exports = self.exports.status_counts().await.map_err(|e| e.to_string())?;
        record_job_statuses("data_exports", &exports);
        Ok(())
    }
}
