//! Export job endpoints.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use domain::models::{CreateExportJobRequest, ExportJob, JobStatus};
use persistence::repositories::ExportJobRepository;
use serde::{Deserialize, Serialize};
use shared::pagination::{PageInfo, PageParams};
use shared::text::slugify;
use tokio_util::io::ReaderStream;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Create export routes, nested under `/api/v1/data-exports`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exports).post(create_export))
        .route("/:id", get(get_export).delete(delete_export))
        .route("/:id/download", get(download_export))
}

/// Query parameters for export listing.
#[derive(Debug, Deserialize)]
pub struct ListExportsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Serialize)]
pub struct ExportListResponse {
    pub data: Vec<ExportJob>,
    pub pagination: PageInfo,
}

/// `<slug of title>.xlsx`, falling back to the job id.
fn download_name(job: &ExportJob) -> String {
    let slug = slugify(&job.title);
    if slug.is_empty() {
        format!("{}.xlsx", job.id)
    } else {
        format!("{}.xlsx", slug)
    }
}

async fn load_job(
    repo: &ExportJobRepository,
    id: Uuid,
    user: &UserAuth,
) -> Result<ExportJob, ApiError> {
    let job: ExportJob = repo
        .find_by_id(id)
        .await?
        .map(ExportJob::from)
        .filter(|job| job.status != JobStatus::Deleted)
        .ok_or_else(|| ApiError::NotFound("Export job not found".to_string()))?;

    if !user.can_access(job.owner_id) {
        return Err(ApiError::Forbidden("Not your export job".to_string()));
    }
    Ok(job)
}

/// Queue a new export.
///
/// POST /api/v1/data-exports
async fn create_export(
    State(state): State<AppState>,
    user: UserAuth,
    Json(request): Json<CreateExportJobRequest>,
) -> Result<(StatusCode, Json<ExportJob>), ApiError> {
    request.validate()?;
    let meta = serde_json::to_value(&request.meta).map_err(|e| ApiError::Internal(e.to_string()))?;

    let repo = ExportJobRepository::new(state.pool.clone());
    let entity = repo
        .create(
            request.title.trim(),
            request.kind.as_str(),
            request.lang.as_str(),
            &meta,
            user.user_id,
        )
        .await?;

    info!(job_id = %entity.id, kind = %request.kind, owner_id = %user.user_id, "Export queued");
    Ok((StatusCode::CREATED, Json(entity.into())))
}

/// GET /api/v1/data-exports
async fn list_exports(
    State(state): State<AppState>,
    user: UserAuth,
    Query(query): Query<ListExportsQuery>,
) -> Result<Json<ExportListResponse>, ApiError> {
    let page = PageParams {
        page: query.page,
        per_page: query.per_page,
    }
    .normalized();
    let owner = user.owner_scope();
    let status = query.status.map(|s| s.as_str());

    let repo = ExportJobRepository::new(state.pool.clone());
    let jobs = repo.list(owner, status, page.limit(), page.offset()).await?;
    let total = repo.count(owner, status).await?;

    Ok(Json(ExportListResponse {
        data: jobs.into_iter().map(ExportJob::from).collect(),
        pagination: PageInfo::new(page, total),
    }))
}

/// GET /api/v1/data-exports/:id
async fn get_export(
    State(state): State<AppState>,
    user: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ExportJob>, ApiError> {
    let repo = ExportJobRepository::new(state.pool.clone());
    Ok(Json(load_job(&repo, id, &user).await?))
}

/// DELETE /api/v1/data-exports/:id
async fn delete_export(
    State(state): State<AppState>,
    user: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = ExportJobRepository::new(state.pool.clone());
    let job = load_job(&repo, id, &user).await?;
    if job.status.is_locked() || repo.soft_delete(id).await? == 0 {
        return Err(ApiError::Conflict("Export job is processing".to_string()));
    }
    if let Some(file_ref) = job.file_ref.as_deref() {
        state.files.delete(file_ref).await?;
    }

    info!(job_id = %id, "Export deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Stream the generated spreadsheet.
///
/// GET /api/v1/data-exports/:id/download
async fn download_export(
    State(state): State<AppState>,
    user: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = ExportJobRepository::new(state.pool.clone());
    let job = load_job(&repo, id, &user).await?;
    let file_ref = match (job.status, job.file_ref.as_deref()) {
        (JobStatus::Processed, Some(file_ref)) => file_ref,
        _ => {
            return Err(ApiError::Conflict(format!(
                "Export job is {} and has no file yet",
                job.status
            )))
        }
    };

    let file = state.files.open(file_ref).await?;
    let body = Body::from_stream(ReaderStream::new(file));
    let disposition = format!("attachment; filename=\"{}\"", download_name(&job));

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::{ExportMeta, ImportKind, Lang};

    fn export(title: &str) -> ExportJob {
        let now = Utc::now();
        ExportJob {
            id: Uuid::nil(),
            title: title.to_string(),
            kind: ImportKind::Event,
            status: JobStatus::Processed,
            lang: Lang::De,
            meta: ExportMeta::default(),
            log: vec![],
            errors: vec![],
            file_ref: Some("exports/a.xlsx".to_string()),
            owner_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_download_name() {
        assert_eq!(download_name(&export("Konzerte Mai 2024")), "konzerte-mai-2024.xlsx");
        assert_eq!(
            download_name(&export("???")),
            "00000000-0000-0000-0000-000000000000.xlsx"
        );
    }
}
