//! Import job domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::job_status::JobStatus;
use super::language::Lang;

/// Kind of entity a spreadsheet describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Location,
    Event,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Location => "location",
            ImportKind::Event => "event",
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "location" => Ok(ImportKind::Location),
            "event" => Ok(ImportKind::Event),
            _ => Err(format!("Unknown import kind: {}", s)),
        }
    }
}

/// Assignment of one spreadsheet column to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    /// Header text as found in the file.
    pub header: String,
    /// Canonical key, `###` or a synthetic `unknown-N`.
    pub header_key: String,
    pub sample_value: Option<String>,
    /// Field the column feeds; `None` leaves the column unused.
    pub matched_field: Option<String>,
}

/// An uploaded spreadsheet and its processing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportJob {
    pub id: Uuid,
    pub title: String,
    pub kind: ImportKind,
    pub status: JobStatus,
    pub lang: Lang,
    pub mapping: Vec<MappingEntry>,
    pub log: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub file_ref: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for updating an import job (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImportJobRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    pub mapping: Option<Vec<MappingEntry>>,

    pub status: Option<JobStatus>,
}
