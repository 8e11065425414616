//! Import and export job entities.

use chrono::{DateTime, Utc};
use domain::models::{
    ExportJob, ExportMeta, ImportJob, ImportKind, JobStatus, Lang, MappingEntry,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row of `data_imports`.
#[derive(Debug, Clone, FromRow)]
pub struct ImportJobEntity {
    pub id: Uuid,
    pub title: String,
    pub kind: String,
    pub status: String,
    pub lang: String,
    pub mapping: serde_json::Value,
    pub log: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub file_ref: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row of `data_exports`.
#[derive(Debug, Clone, FromRow)]
pub struct ExportJobEntity {
    pub id: Uuid,
    pub title: String,
    pub kind: String,
    pub status: String,
    pub lang: String,
    pub meta: serde_json::Value,
    pub log: Vec<String>,
    pub errors: Vec<String>,
    pub file_ref: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ImportJobEntity> for ImportJob {
    fn from(entity: ImportJobEntity) -> Self {
        let mapping: Vec<MappingEntry> =
            serde_json::from_value(entity.mapping).unwrap_or_default();

        Self {
            id: entity.id,
            title: entity.title,
            kind: entity.kind.parse().unwrap_or(ImportKind::Location),
            status: entity.status.parse().unwrap_or(JobStatus::Error),
            lang: entity.lang.parse().unwrap_or_default(),
            mapping,
            log: entity.log,
            warnings: entity.warnings,
            errors: entity.errors,
            file_ref: entity.file_ref,
            owner_id: entity.owner_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<ExportJobEntity> for ExportJob {
    fn from(entity: ExportJobEntity) -> Self {
        let meta: ExportMeta = serde_json::from_value(entity.meta).unwrap_or_default();

        Self {
            id: entity.id,
            title: entity.title,
            kind: entity.kind.parse().unwrap_or(ImportKind::Location),
            status: entity.status.parse().unwrap_or(JobStatus::Error),
            lang: entity.lang.parse::<Lang>().unwrap_or_default(),
            meta,
            log: entity.log,
            errors: entity.errors,
            file_ref: entity.file_ref,
            owner_id: entity.owner_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn import_entity() -> ImportJobEntity {
        let now = Utc::now();
        ImportJobEntity {
            id: Uuid::new_v4(),
            title: "Museen".to_string(),
            kind: "location".to_string(),
            status: "assign".to_string(),
            lang: "en".to_string(),
            mapping: json!([{
                "header": "PLZ",
                "headerKey": "postCode",
                "sampleValue": "10318",
                "matchedField": "postCode"
            }]),
            log: vec![],
            warnings: vec!["w".to_string()],
            errors: vec![],
            file_ref: Some("imports/a.csv".to_string()),
            owner_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_import_entity_to_domain() {
        let job: ImportJob = import_entity().into();
        assert_eq!(job.status, JobStatus::Assign);
        assert_eq!(job.lang, Lang::En);
        assert_eq!(job.mapping.len(), 1);
        assert_eq!(job.mapping[0].matched_field.as_deref(), Some("postCode"));
        assert_eq!(job.warnings, vec!["w".to_string()]);
    }

    #[test]
    fn test_import_entity_with_broken_mapping() {
        let mut entity = import_entity();
        entity.mapping = json!({"not": "a list"});
        let job: ImportJob = entity.into();
        assert!(job.mapping.is_empty());
    }

    #[test]
    fn test_export_entity_to_domain() {
        let now = Utc::now();
        let entity = ExportJobEntity {
            id: Uuid::new_v4(),
            title: "Events".to_string(),
            kind: "event".to_string(),
            status: "processed".to_string(),
            lang: "de".to_string(),
            meta: json!({"statuses": ["imported"], "termSlugs": ["konzert"]}),
            log: vec![],
            errors: vec![],
            file_ref: None,
            owner_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };

        let job: ExportJob = entity.into();
        assert_eq!(job.kind, ImportKind::Event);
        assert_eq!(job.status, JobStatus::Processed);
        assert_eq!(job.meta.term_slugs, vec!["konzert".to_string()]);
    }
}
