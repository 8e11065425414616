//! Query timings, pool gauges and job queue gauges.

use std::time::Instant;

use domain::models::JobStatus;
use metrics::{gauge, histogram};
use sqlx::PgPool;

/// Publishes connection pool usage.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Expands `(status, count)` rows to one count per known status.
///
/// Statuses absent from `rows` report zero so a drained queue resets its gauge.
pub fn status_gauge_values(rows: &[(String, i64)]) -> Vec<(&'static str, i64)> {
    JobStatus::ALL
        .iter()
        .map(|status| {
            let count = rows
                .iter()
                .filter(|(name, _)| name == status.as_str())
                .map(|(_, count)| *count)
                .sum();
            (status.as_str(), count)
        })
        .collect()
}

/// Publishes `data_jobs{table, status}` for one job table.
pub fn record_job_statuses(table: &'static str, rows: &[(String, i64)]) {
    for (status, count) in status_gauge_values(rows) {
        gauge!("data_jobs", "table" => table, "status" => status).set(count as f64);
    }
}

/// Times one repository query.
///
/// ```ignore
/// let timer = QueryTimer::new(TABLE, "claim_next");
/// let result = sqlx::query_as::<_, ImportJobEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    table: &'static str,
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(table: &'static str, query: &'static str) -> Self {
        Self {
            table,
            query,
            start: Instant::now(),
        }
    }

    /// Records `database_query_duration_seconds{table, query}`.
    pub fn record(self) {
        histogram!(
            "database_query_duration_seconds",
            "table" => self.table,
            "query" => self.query
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_gauges_cover_every_status() {
        let rows = vec![("process".to_string(), 3), ("error".to_string(), 1)];
        let values = status_gauge_values(&rows);

        assert_eq!(values.len(), JobStatus::ALL.len());
        assert!(values.contains(&("process", 3)));
        assert!(values.contains(&("error", 1)));
        assert!(values.contains(&("processing", 0)));
    }

    #[test]
    fn test_status_gauges_ignore_unknown_rows() {
        let values = status_gauge_values(&[("archived".to_string(), 7)]);
        assert!(values.iter().all(|(_, count)| *count == 0));
    }

    #[test]
    fn test_query_timer_keeps_labels() {
        let timer = QueryTimer::new("data_imports", "claim_next");
        assert_eq!(timer.table, "data_imports");
        assert_eq!(timer.query, "claim_next");
        timer.record();
    }
}
