//! Import job repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ImportJobEntity;
use crate::metrics::QueryTimer;

const TABLE: &str = "data_imports";

/// Values of a freshly uploaded import.
#[derive(Debug, Clone)]
pub struct NewImportJob<'a> {
    pub title: &'a str,
    pub kind: &'a str,
    pub status: &'a str,
    pub lang: &'a str,
    pub mapping: serde_json::Value,
    pub log: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub file_ref: Option<&'a str>,
    pub owner_id: Uuid,
}

/// Partial update of an import job; `None` leaves a column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ImportJobChanges {
    pub title: Option<String>,
    pub mapping: Option<serde_json::Value>,
    pub status: Option<String>,
    pub warnings: Option<Vec<String>>,
}

/// Repository for import job database operations.
#[derive(Clone)]
pub struct ImportJobRepository {
    pool: PgPool,
}

impl ImportJobRepository {
    /// Creates a new ImportJobRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, job: NewImportJob<'_>) -> Result<ImportJobEntity, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "create");
        let result = sqlx::query_as::<_, ImportJobEntity>(
            r#"
            INSERT INTO data_imports (title, kind, status, lang, mapping, log, warnings, errors, file_ref, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, title, kind, status, lang, mapping, log, warnings, errors,
                      file_ref, owner_id, created_at, updated_at
            "#,
        )
        .bind(job.title)
        .bind(job.kind)
        .bind(job.status)
        .bind(job.lang)
        .bind(&job.mapping)
        .bind(&job.log)
        .bind(&job.warnings)
        .bind(&job.errors)
        .bind(job.file_ref)
        .bind(job.owner_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ImportJobEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "find_by_id");
        let result = sqlx::query_as::<_, ImportJobEntity>(
            r#"
            SELECT id, title, kind, status, lang, mapping, log, warnings, errors,
                   file_ref, owner_id, created_at, updated_at
            FROM data_imports
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
    ) -> Result<Vec<ImportJobEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "list");
        let result = sqlx::query_as::<_, ImportJobEntity>(
            r#"
            SELECT id, title, kind, status, lang, mapping, log, warnings, errors,
                   file_ref, owner_id, created_at, updated_at
            FROM data_imports
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
            FROM data_imports
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

    /// Applies a partial update unless a worker holds the job.
    pub async fn update(
        &self,
        id: Uuid,
        changes: ImportJobChanges,
    ) -> Result<Option<ImportJobEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "update");
        let result = sqlx::query_as::<_, ImportJobEntity>(
            r#"
            UPDATE data_imports
            SET title = COALESCE($2, title),
                mapping = COALESCE($3, mapping),
                status = COALESCE($4, status),
                warnings = COALESCE($5, warnings),
                updated_at = NOW()
            WHERE id = $1 AND status NOT IN ('processing', 'deleted')
            RETURNING id, title, kind, status, lang, mapping, log, warnings, errors,
                      file_ref, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.mapping)
        .bind(changes.status)
        .bind(changes.warnings)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Moves the oldest queued job to `processing`.
    ///
    /// `FOR UPDATE SKIP LOCKED` keeps concurrent dispatchers from claiming the same job.
    pub async fn claim_next(&self) -> Result<Option<ImportJobEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "claim_next");
        let result = sqlx::query_as::<_, ImportJobEntity>(
            r#"
            UPDATE data_imports
            SET status = 'processing', updated_at = NOW()
            WHERE id = (
                SELECT id FROM data_imports
                WHERE status = 'process'
                ORDER BY updated_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, title, kind, status, lang, mapping, log, warnings, errors,
                      file_ref, owner_id, created_at, updated_at
            "#,
        )
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Persists the progress of a running job.
    pub async fn save_progress(
        &self,
        id: Uuid,
        log: &[String],
        warnings: &[String],
        errors: &[String],
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "save_progress");
        let result = sqlx::query(
            r#"
            UPDATE data_imports
            SET log = $2, warnings = $3, errors = $4, updated_at = NOW()
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(log)
        .bind(warnings)
        .bind(errors)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Writes the final status together with the complete log.
    pub async fn finish(
        &self,
        id: Uuid,
        status: &str,
        log: &[String],
        warnings: &[String],
        errors: &[String],
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "finish");
        let result = sqlx::query(
            r#"
            UPDATE data_imports
            SET status = $2, log = $3, warnings = $4, errors = $5, updated_at = NOW()
            WHERE id = $1 AND status <> 'deleted'
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(log)
        .bind(warnings)
        .bind(errors)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Forgets the uploaded file; rejected while processing.
    pub async fn clear_file(&self, id: Uuid) -> Result<Option<ImportJobEntity>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "clear_file");
        let result = sqlx::query_as::<_, ImportJobEntity>(
            r#"
            UPDATE data_imports
            SET file_ref = NULL, updated_at = NOW()
            WHERE id = $1 AND status NOT IN ('processing', 'deleted')
            RETURNING id, title, kind, status, lang, mapping, log, warnings, errors,
                      file_ref, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Marks the job deleted and forgets its file; rejected while processing.
    pub async fn soft_delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "soft_delete");
        let result = sqlx::query(
            r#"
            UPDATE data_imports
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

    /// Removes soft-deleted jobs last touched before `before`.
    pub async fn purge_deleted(&self, before: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "purge_deleted");
        let result = sqlx::query(
            r#"
            DELETE FROM data_imports
            WHERE status = 'deleted' AND updated_at < $1
            "#,
        )
        .bind(before)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Number of import jobs per status.
    pub async fn status_counts(&self) -> Result<Vec<(String, i64)>, sqlx::Error> {
        let timer = QueryTimer::new(TABLE, "status_counts");
        let result = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM data_imports GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
