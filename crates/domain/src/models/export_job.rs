//! Export job domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::import_job::ImportKind;
use super::job_status::JobStatus;
use super::language::Lang;
use super::publish_status::PublishStatus;

/// Filters selecting the exported entities. Empty lists do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMeta {
    #[serde(default)]
    pub statuses: Vec<PublishStatus>,
    #[serde(default)]
    pub term_slugs: Vec<String>,
}

/// A spreadsheet generated from stored entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJob {
    pub id: Uuid,
    pub title: String,
    pub kind: ImportKind,
    pub status: JobStatus,
    pub lang: Lang,
    pub meta: ExportMeta,
    pub log: Vec<String>,
    pub errors: Vec<String>,
    pub file_ref: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating an export job.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExportJobRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub kind: ImportKind,

    #[serde(default)]
    pub lang: Lang,

    #[serde(default)]
    pub meta: ExportMeta,
}
