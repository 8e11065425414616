//! Export job repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ExportJobEntity;
use crate::metrics::QueryTimer;

const TABLE: &str = "data_exports";

/// Repository for export job database operations.
#[derive(Clone)]
pub struct ExportJobRepository {
    pool: PgPool,
}

impl ExportJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates an export job, queued for the dispatcher.
    pub async fn create(
        &self,
        title: &str,
        kind: &str,
        lang: &str,
        meta: &serde_json::Value,
        owner_id: Uuid,
    ) -> Result<ExportJobEntity, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "create");
        let result = sqlx::query_as::<_, ExportJobEntity>(
            r#"
            INSERT INTO data_exports (title, kind, status, lang, meta, owner_id)
            VALUES ($1, $2, 'process', $3, $4, $5)
            RETURNING id, title, kind, status, lang, meta, log, errors,
                      file_ref, owner_id, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(kind)
        .bind(lang)
        .bind(meta)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ExportJobEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "find_by_id");
        let result = sqlx::query_as::<_, ExportJobEntity>(
            r#"
            SELECT id, title, kind, status, lang, meta, log, errors,
                   file_ref, owner_id, created_at, updated_at
            FROM data_exports
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Lists jobs newest first. `owner_id = None` lists all owners; deleted jobs are hidden.
    pub async fn list(
        &self,
        owner_id: Option<Uuid>,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ExportJobEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "list");
        let result = sqlx::query_as::<_, ExportJobEntity>(
            r#"
            SELECT id, title, kind, status, lang, meta, log, errors,
                   file_ref, owner_id, created_at, updated_at
            FROM data_exports
            WHERE status <> 'deleted'
              AND ($1::uuid IS NULL OR owner_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC, id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count(&self, owner_id: Option<Uuid>, status: Option<&str>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "count");
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM data_exports
            WHERE status <> 'deleted'
              AND ($1::uuid IS NULL OR owner_id = $1)
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(owner_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(count.0)
    }

    /// Moves the oldest queued export to `processing`.
    pub async fn claim_next(&self) -> Result<Option<ExportJobEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "claim_next");
        let result = sqlx::query_as::<_, ExportJobEntity>(
            r#"
            UPDATE data_exports
            SET status = 'processing', updated_at = NOW()
            WHERE id = (
                SELECT id FROM data_exports
                WHERE status = 'process'
                ORDER BY updated_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, title, kind, status, lang, meta, log, errors,
                      file_ref, owner_id, created_at, updated_at
            "#,
        )
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Writes the final status, log and produced file.
    pub async fn finish(
        &self,
        id: Uuid,
        status: &str,
        log: &[String],
        errors: &[String],
        file_ref: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "finish");
        let result = sqlx::query(
            r#"
            UPDATE data_exports
            SET status = $2, log = $3, errors = $4, file_ref = $5, updated_at = NOW()
            WHERE id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(log)
        .bind(errors)
        .bind(file_ref)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Marks the job deleted and forgets its file; rejected while processing.
    pub async fn soft_delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "soft_delete");
        let result = sqlx::query(
            r#"
            UPDATE data_exports
            SET status = 'deleted', file_ref = NULL, updated_at = NOW()
            WHERE id = $1 AND status NOT IN ('processing', 'deleted')
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    pub async fn purge_deleted(&self, before: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "purge_deleted");
        let result = sqlx::query(
            r#"
            DELETE FROM data_exports
            WHERE status = 'deleted' AND updated_at < $1
            "#,
        )
        .bind(before)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    pub async fn status_counts(&self) -> Result<Vec<(String, i64)>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "status_counts");
        let result = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM data_exports GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
