//! Maps spreadsheet headers to canonical fields and checks mapping completeness.

use std::collections::HashSet;
use thiserror::Error;

use super::headers::{dictionary, ROW_NUMBER_HEADER};
use super::messages::Message;
use crate::models::{ImportKind, Lang, MappingEntry};

/// Builds the initial mapping for a file's header row.
///
/// Every input column yields exactly one entry, in file order. Known headers are
/// matched to their canonical key; unknown headers and repeated keys become
/// `unknown-N` with no matched field, so an admin can assign them later.
pub fn map_headers(
    kind: ImportKind,
    headers: &[String],
    sample_row: Option<&[String]>,
) -> Vec<MappingEntry> {
    let dict = dictionary(kind);
    let mut seen = HashSet::new();
    let mut unknown = 0usize;

    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let sample_value = sample_row
                .and_then(|row| row.get(index))
                .and_then(|value| shared::text::non_empty(value));

            if header.trim() == ROW_NUMBER_HEADER {
                return MappingEntry {
                    header: header.clone(),
                    header_key: ROW_NUMBER_HEADER.to_string(),
                    sample_value,
                    matched_field: None,
                };
            }

            match dict.find_by_header(header) {
                Some(def) if seen.insert(def.key) => MappingEntry {
                    header: header.clone(),
                    header_key: def.key.to_string(),
                    sample_value,
                    matched_field: Some(def.key.to_string()),
                },
                _ => {
                    unknown += 1;
                    MappingEntry {
                        header: header.clone(),
                        header_key: format!("unknown-{}", unknown),
                        sample_value,
                        matched_field: None,
                    }
                }
            }
        })
        .collect()
}

/// Outcome of checking a mapping against the required columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingValidation {
    pub missing_required: Vec<&'static str>,
    pub missing_groups: Vec<&'static [&'static str]>,
}

impl MappingValidation {
    /// Whether the job may be queued for processing.
    pub fn is_complete(&self) -> bool {
        self.missing_required.is_empty() && self.missing_groups.is_empty()
    }

    /// One message listing all missing required columns, one per unmet group.
    pub fn messages(&self, kind: ImportKind, lang: Lang) -> Vec<Message> {
        let dict = dictionary(kind);
        let mut messages = Vec::new();

        if !self.missing_required.is_empty() {
            messages.push(Message::MissingColumns {
                labels: self
                    .missing_required
                    .iter()
                    .map(|key| dict.label(key, lang))
                    .collect(),
            });
        }
        for group in &self.missing_groups {
            messages.push(Message::MissingGroup {
                labels: group.iter().map(|key| dict.label(key, lang)).collect(),
            });
        }
        messages
    }

    pub fn warnings(&self, kind: ImportKind, lang: Lang) -> Vec<String> {
        self.messages(kind, lang)
            .iter()
            .map(|m| m.render(lang))
            .collect()
    }
}

/// Reports required columns and column groups not covered by `mapping`.
pub fn validate_mapping(kind: ImportKind, mapping: &[MappingEntry]) -> MappingValidation {
    let dict = dictionary(kind);
    let assigned: HashSet<&str> = mapping
        .iter()
        .filter_map(|entry| entry.matched_field.as_deref())
        .collect();

    MappingValidation {
        missing_required: dict
            .required
            .iter()
            .copied()
            .filter(|key| !assigned.contains(key))
            .collect(),
        missing_groups: dict
            .required_groups
            .iter()
            .copied()
            .filter(|group| !group.iter().any(|key| assigned.contains(key)))
            .collect(),
    }
}

/// Rejected manual column assignment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field assigned to more than one column: {0}")]
    DuplicateField(String),

    #[error("The row number column cannot be assigned")]
    RowNumberColumn,
}

/// Applies an admin's column assignments to the stored mapping.
///
/// Columns are identified by `header_key`; only `matched_field` changes. Columns
/// missing from `proposed` keep their current assignment.
pub fn apply_assignments(
    kind: ImportKind,
    current: &[MappingEntry],
    proposed: &[MappingEntry],
) -> Result<Vec<MappingEntry>, MappingError> {
    let dict = dictionary(kind);
    let mut updated = current.to_vec();

    for change in proposed {
        let entry = updated
            .iter_mut()
            .find(|e| e.header_key == change.header_key)
            .ok_or_else(|| MappingError::UnknownColumn(change.header_key.clone()))?;

        if let Some(field) = change.matched_field.as_deref() {
            if entry.header_key == ROW_NUMBER_HEADER {
                return Err(MappingError::RowNumberColumn);
            }
            if dict.get(field).is_none() {
                return Err(MappingError::UnknownField(field.to_string()));
            }
        }
        entry.matched_field = change.matched_field.clone();
    }

    let mut seen = HashSet::new();
    for field in updated.iter().filter_map(|e| e.matched_field.as_deref()) {
        if !seen.insert(field) {
            return Err(MappingError::DuplicateField(field.to_string()));
        }
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::headers::keys;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_all_required_columns_in_german() {
        let headers = strings(&["###", "Titel (de)", "Straße", "Hausnummer", "PLZ", "Ort", "Typ 1"]);
        let mapping = map_headers(ImportKind::Location, &headers, None);

        assert_eq!(mapping.len(), headers.len());
        let validation = validate_mapping(ImportKind::Location, &mapping);
        assert!(validation.is_complete());
        assert!(validation.warnings(ImportKind::Location, Lang::De).is_empty());
    }

    #[test]
    fn test_all_required_columns_in_english_and_mixed_case() {
        let headers = strings(&["TITLE (DE)", "street", "House Number", "postcode", "City", "type 2"]);
        let mapping = map_headers(ImportKind::Location, &headers, None);
        assert!(validate_mapping(ImportKind::Location, &mapping).is_complete());
    }

    #[test]
    fn test_three_of_five_required_columns() {
        let headers = strings(&["Titel (de)", "Straße", "Ort", "Typ 1"]);
        let mapping = map_headers(ImportKind::Location, &headers, None);
        let validation = validate_mapping(ImportKind::Location, &mapping);

        assert!(!validation.is_complete());
        assert_eq!(
            validation.missing_required,
            vec![keys::HOUSE_NUMBER, keys::POST_CODE]
        );
        assert_eq!(
            validation.warnings(ImportKind::Location, Lang::De),
            vec!["Pflichtspalten fehlen: Hausnummer, PLZ".to_string()]
        );
        assert_eq!(
            validation.warnings(ImportKind::Location, Lang::En),
            vec!["Required columns missing: House number, Postcode".to_string()]
        );
    }

    #[test]
    fn test_missing_group_yields_one_warning() {
        let headers = strings(&["Event ID", "Title (de)", "Start date", "Start time", "City"]);
        let mapping = map_headers(ImportKind::Event, &headers, None);
        let validation = validate_mapping(ImportKind::Event, &mapping);

        assert!(validation.missing_required.is_empty());
        assert_eq!(validation.missing_groups.len(), 1);
        let warnings = validation.warnings(ImportKind::Event, Lang::En);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Event type 1 / Event type 2"));
        assert!(mapping
            .iter()
            .all(|e| e.matched_field.as_deref() != Some(keys::EVENT_TYPE_1)));
    }

    #[test]
    fn test_unknown_and_duplicate_columns_are_retained() {
        let headers = strings(&["Titel (de)", "Öffnungszeiten", "Title (de)", "Notiz"]);
        let mapping = map_headers(ImportKind::Location, &headers, None);

        assert_eq!(mapping[0].matched_field.as_deref(), Some(keys::TITLE_DE));
        assert_eq!(mapping[1].header_key, "unknown-1");
        assert_eq!(mapping[1].matched_field, None);
        assert_eq!(mapping[2].header_key, "unknown-2");
        assert_eq!(mapping[2].header, "Title (de)");
        assert_eq!(mapping[3].header_key, "unknown-3");
    }

    #[test]
    fn test_row_number_column_is_reserved() {
        let headers = strings(&["###", "PLZ"]);
        let mapping = map_headers(ImportKind::Location, &headers, None);
        assert_eq!(mapping[0].header_key, "###");
        assert_eq!(mapping[0].matched_field, None);
    }

    #[test]
    fn test_sample_values() {
        let headers = strings(&["Titel (de)", "PLZ", "Ort"]);
        let sample = strings(&[" Café Mitte ", "", "Berlin"]);
        let mapping = map_headers(ImportKind::Location, &headers, Some(&sample));

        assert_eq!(mapping[0].sample_value.as_deref(), Some("Café Mitte"));
        assert_eq!(mapping[1].sample_value, None);
        assert_eq!(mapping[2].sample_value.as_deref(), Some("Berlin"));
    }

    #[test]
    fn test_apply_assignments() {
        let headers = strings(&["Name", "PLZ"]);
        let current = map_headers(ImportKind::Location, &headers, None);
        let proposed = vec![MappingEntry {
            header: "Name".to_string(),
            header_key: "unknown-1".to_string(),
            sample_value: None,
            matched_field: Some(keys::TITLE_DE.to_string()),
        }];

        let updated = apply_assignments(ImportKind::Location, &current, &proposed).unwrap();
        assert_eq!(updated[0].matched_field.as_deref(), Some(keys::TITLE_DE));
        assert_eq!(updated[1].matched_field.as_deref(), Some(keys::POST_CODE));
    }

    #[test]
    fn test_apply_assignments_rejects_invalid_changes() {
        let headers = strings(&["###", "Name", "PLZ"]);
        let current = map_headers(ImportKind::Location, &headers, None);
        let change = |key: &str, field: &str| MappingEntry {
            header: String::new(),
            header_key: key.to_string(),
            sample_value: None,
            matched_field: Some(field.to_string()),
        };

        assert_eq!(
            apply_assignments(ImportKind::Location, &current, &[change("unknown-9", "city")]),
            Err(MappingError::UnknownColumn("unknown-9".to_string()))
        );
        assert_eq!(
            apply_assignments(ImportKind::Location, &current, &[change("unknown-1", "eventId")]),
            Err(MappingError::UnknownField("eventId".to_string()))
        );
        assert_eq!(
            apply_assignments(ImportKind::Location, &current, &[change("unknown-1", "postCode")]),
            Err(MappingError::DuplicateField("postCode".to_string()))
        );
        assert_eq!(
            apply_assignments(ImportKind::Location, &current, &[change("###", "city")]),
            Err(MappingError::RowNumberColumn)
        );
    }
}
