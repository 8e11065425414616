//! Import job endpoints: upload, column assignment, queueing and deletion.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use domain::models::{ImportJob, ImportKind, JobStatus, Lang, MappingEntry, UpdateImportJobRequest};
use domain::services::header_mapper::{apply_assignments, map_headers, validate_mapping};
use domain::services::messages::Message;
use persistence::repositories::{ImportJobChanges, ImportJobRepository, NewImportJob};
use serde::{Deserialize, Serialize};
use shared::pagination::{PageInfo, PageParams};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::csv_source::read_sheet;

const UPLOAD_FOLDER: &str = "imports";

/// Create import routes, nested under `/api/v1/data-imports`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_imports).post(create_import))
        .route(
            "/:id",
            get(get_import).patch(update_import).delete(delete_import),
        )
        .route("/:id/file", delete(delete_import_file))
}

/// Query parameters for import listing.
#[derive(Debug, Deserialize)]
pub struct ListImportsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Serialize)]
pub struct ImportListResponse {
    pub data: Vec<ImportJob>,
    pub pagination: PageInfo,
}

/// Text fields of the upload form.
#[derive(Debug, Default, Validate)]
struct UploadForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    title: String,
    kind: Option<ImportKind>,
    lang: Lang,
    file: Option<Vec<u8>>,
}

/// Result of parsing an uploaded file.
#[derive(Debug, PartialEq)]
struct ParsedUpload {
    mapping: Vec<MappingEntry>,
    warnings: Vec<String>,
    rows: usize,
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => form.file = Some(field.bytes().await.map_err(multipart_error)?.to_vec()),
            "title" => form.title = field.text().await.map_err(multipart_error)?.trim().to_string(),
            "kind" => {
                let value = field.text().await.map_err(multipart_error)?;
                form.kind = Some(value.parse().map_err(ApiError::Validation)?);
            }
            "lang" => {
                let value = field.text().await.map_err(multipart_error)?;
                form.lang = value.parse().map_err(ApiError::Validation)?;
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Builds the initial mapping and its warnings; rejects files above `max_rows`.
fn parse_upload(
    kind: ImportKind,
    lang: Lang,
    bytes: &[u8],
    max_rows: usize,
) -> Result<ParsedUpload, ApiError> {
    let sheet = read_sheet(bytes).map_err(|e| ApiError::Validation(e.to_string()))?;
    if sheet.rows.len() > max_rows {
        return Err(ApiError::Validation(
            Message::TooManyRows {
                rows: sheet.rows.len(),
                max: max_rows,
            }
            .render(lang),
        ));
    }

    let mapping = map_headers(kind, &sheet.headers, sheet.first_row());
    let warnings = validate_mapping(kind, &mapping).warnings(kind, lang);
    Ok(ParsedUpload {
        mapping,
        warnings,
        rows: sheet.rows.len(),
    })
}

/// Turns a PATCH request into repository changes, enforcing the status machine.
fn plan_update(job: &ImportJob, request: UpdateImportJobRequest) -> Result<ImportJobChanges, ApiError> {
    if job.status.is_locked() || job.status == JobStatus::Deleted {
        return Err(ApiError::Conflict(format!(
            "Import job is {} and cannot be changed",
            job.status
        )));
    }

    let mapping_changed = request.mapping.is_some();
    let mapping = match request.mapping {
        Some(proposed) => apply_assignments(job.kind, &job.mapping, &proposed)
            .map_err(|e| ApiError::Validation(e.to_string()))?,
        None => job.mapping.clone(),
    };
    let validation = validate_mapping(job.kind, &mapping);

    if let Some(next) = request.status {
        if !matches!(next, JobStatus::Assign | JobStatus::Process) {
            return Err(ApiError::Validation(
                "Status can only be set to assign or process".to_string(),
            ));
        }
        if !job.status.can_transition_to(next) {
            return Err(ApiError::Conflict(format!(
                "Cannot move import job from {} to {}",
                job.status, next
            )));
        }
    }

    // Only a complete mapping may sit in `process`
    let queued = request.status.unwrap_or(job.status) == JobStatus::Process;
    if queued && (mapping_changed || request.status.is_some()) {
        if job.file_ref.is_none() {
            return Err(ApiError::Validation("The import has no file".to_string()));
        }
        if !validation.is_complete() {
            return Err(ApiError::Validation(
                validation.warnings(job.kind, job.lang).join("; "),
            ));
        }
    }

    // Run warnings survive a rename
    let refresh = mapping_changed || request.status.is_some();
    let mapping = if mapping_changed {
        Some(serde_json::to_value(&mapping).map_err(|e| ApiError::Internal(e.to_string()))?)
    } else {
        None
    };

    Ok(ImportJobChanges {
        title: request.title,
        mapping,
        status: request.status.map(|s| s.as_str().to_string()),
        warnings: refresh.then(|| validation.warnings(job.kind, job.lang)),
    })
}

async fn load_job(
    repo: &ImportJobRepository,
    id: Uuid,
    user: &UserAuth,
) -> Result<ImportJob, ApiError> {
    let job: ImportJob = repo
        .find_by_id(id)
        .await?
        .map(ImportJob::from)
        .filter(|job| job.status != JobStatus::Deleted)
        .ok_or_else(|| ApiError::NotFound("Import job not found".to_string()))?;

    if !user.can_access(job.owner_id) {
        return Err(ApiError::Forbidden("Not your import job".to_string()));
    }
    Ok(job)
}

/// Upload a spreadsheet and create an import job.
///
/// POST /api/v1/data-imports
async fn create_import(
    State(state): State<AppState>,
    user: UserAuth,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ImportJob>), ApiError> {
    let form = read_form(multipart).await?;
    form.validate()?;
    let kind = form
        .kind
        .ok_or_else(|| ApiError::Validation("kind is required".to_string()))?;
    let bytes = form
        .file
        .as_deref()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::Validation("file is required".to_string()))?;

    let parsed = parse_upload(kind, form.lang, bytes, state.config.import.max_rows)?;
    let file_ref = state.files.save(UPLOAD_FOLDER, "csv", bytes).await?;
    let mapping =
        serde_json::to_value(&parsed.mapping).map_err(|e| ApiError::Internal(e.to_string()))?;

    let repo = ImportJobRepository::new(state.pool.clone());
    let entity = repo
        .create(NewImportJob {
            title: &form.title,
            kind: kind.as_str(),
            status: JobStatus::Assign.as_str(),
            lang: form.lang.as_str(),
            mapping,
            log: Vec::new(),
            warnings: parsed.warnings,
            errors: Vec::new(),
            file_ref: Some(&file_ref),
            owner_id: user.user_id,
        })
        .await?;

    info!(
        job_id = %entity.id,
        kind = %kind,
        rows = parsed.rows,
        owner_id = %user.user_id,
        "Import uploaded"
    );
    Ok((StatusCode::CREATED, Json(entity.into())))
}

/// GET /api/v1/data-imports
async fn list_imports(
    State(state): State<AppState>,
    user: UserAuth,
    Query(query): Query<ListImportsQuery>,
) -> Result<Json<ImportListResponse>, ApiError> {
    let page = PageParams {
        page: query.page,
        per_page: query.per_page,
    }
    .normalized();
    let owner = user.owner_scope();
    let status = query.status.map(|s| s.as_str());

    let repo = ImportJobRepository::new(state.pool.clone());
    let jobs = repo.list(owner, status, page.limit(), page.offset()).await?;
    let total = repo.count(owner, status).await?;

    Ok(Json(ImportListResponse {
        data: jobs.into_iter().map(ImportJob::from).collect(),
        pagination: PageInfo::new(page, total),
    }))
}

/// GET /api/v1/data-imports/:id
async fn get_import(
    State(state): State<AppState>,
    user: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ImportJob>, ApiError> {
    let repo = ImportJobRepository::new(state.pool.clone());
    Ok(Json(load_job(&repo, id, &user).await?))
}

/// Rename, reassign columns, or queue the job.
///
/// PATCH /api/v1/data-imports/:id
async fn update_import(
    State(state): State<AppState>,
    user: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateImportJobRequest>,
) -> Result<Json<ImportJob>, ApiError> {
    request.validate()?;

    let repo = ImportJobRepository::new(state.pool.clone());
    let job = load_job(&repo, id, &user).await?;
    let queued = request.status == Some(JobStatus::Process);
    let changes = plan_update(&job, request)?;

    let updated = repo
        .update(id, changes)
        .await?
        .ok_or_else(|| ApiError::Conflict("Import job was picked up by a worker".to_string()))?;

    if queued {
        info!(job_id = %id, "Import queued");
    }
    Ok(Json(updated.into()))
}

/// Soft delete the job and remove its file.
///
/// DELETE /api/v1/data-imports/:id
async fn delete_import(
    State(state): State<AppState>,
    user: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = ImportJobRepository::new(state.pool.clone());
    let job = load_job(&repo, id, &user).await?;
    if job.status.is_locked() {
        return Err(ApiError::Conflict("Import job is processing".to_string()));
    }

    if repo.soft_delete(id).await? == 0 {
        return Err(ApiError::Conflict("Import job is processing".to_string()));
    }
    if let Some(file_ref) = job.file_ref.as_deref() {
        state.files.delete(file_ref).await?;
    }

    info!(job_id = %id, "Import deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Remove only the uploaded file.
///
/// DELETE /api/v1/data-imports/:id/file
async fn delete_import_file(
    State(state): State<AppState>,
    user: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ImportJob>, ApiError> {
    let repo = ImportJobRepository::new(state.pool.clone());
    let job = load_job(&repo, id, &user).await?;
    if job.status.is_locked() {
        return Err(ApiError::Conflict("Import job is processing".to_string()));
    }

    let updated = repo
        .clear_file(id)
        .await?
        .ok_or_else(|| ApiError::Conflict("Import job is processing".to_string()))?;
    if let Some(file_ref) = job.file_ref.as_deref() {
        state.files.delete(file_ref).await?;
    }

    Ok(Json(updated.into()))
}
