//! Turns raw spreadsheet rows into location and event data.
//!
//! Transformation is a partial update: a field whose column is not mapped keeps
//! the existing value, a mapped but empty cell clears it. Soft problems (bad
//! email, unknown term) become warnings and never abort the row; a missing or
//! malformed natural key or event start is a [`TransformError`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use shared::crypto::content_hash;
use shared::validation::{is_valid_email, is_valid_url, normalize_url, parse_coordinate};

use super::headers::{
    dictionary, keys, HeaderDictionary, EVENT_TYPE_TAXONOMY, LOCATION_TYPE_TAXONOMY,
    ROW_NUMBER_HEADER,
};
use super::messages::Message;
use crate::models::{
    Address, Contact, Coordinates, EventData, ImportKind, Lang, LocationData, MappingEntry,
    SocialMedia, TermDictionary, Translated,
};

/// One data row keyed by matched field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// Row number shown in messages: the `###` cell when numeric, else the 1-based data row.
    pub number: usize,
    pub values: HashMap<String, String>,
}

enum Cell<'a> {
    Unmapped,
    Empty,
    Value(&'a str),
}

impl RawRow {
    /// Builds a row from the cells of a file line, in mapping order.
    pub fn from_cells(mapping: &[MappingEntry], data_index: usize, cells: &[String]) -> Self {
        let mut number = data_index + 1;
        let mut values = HashMap::new();

        for (entry, cell) in mapping.iter().zip(cells.iter()) {
            if entry.header_key == ROW_NUMBER_HEADER {
                if let Ok(n) = cell.trim().parse::<usize>() {
                    number = n;
                }
                continue;
            }
            if let Some(field) = &entry.matched_field {
                values
                    .entry(field.clone())
                    .or_insert_with(|| cell.trim().to_string());
            }
        }

        Self { number, values }
    }

    /// A row without any non-blank mapped cell.
    pub fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }

    fn cell(&self, key: &str) -> Cell<'_> {
        match self.values.get(key).map(|v| v.trim()) {
            None => Cell::Unmapped,
            Some("") => Cell::Empty,
            Some(value) => Cell::Value(value),
        }
    }

    fn value(&self, key: &str) -> Option<&str> {
        match self.cell(key) {
            Cell::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Row-level failure; the row is skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("missing value for {column}")]
    MissingValue { column: String },

    #[error("invalid date in {column}: {value}")]
    InvalidDate { column: String, value: String },

    #[error("invalid time in {column}: {value}")]
    InvalidTime { column: String, value: String },
}

impl TransformError {
    pub fn message(&self, row: usize) -> Message {
        match self.clone() {
            TransformError::MissingValue { column } => Message::MissingValue { row, column },
            TransformError::InvalidDate { column, value } => {
                Message::InvalidDate { row, column, value }
            }
            TransformError::InvalidTime { column, value } => {
                Message::InvalidTime { row, column, value }
            }
        }
    }
}

/// Lookup data shared by all rows of a job.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    pub lang: Lang,
    pub terms: &'a TermDictionary,
    /// Location ids by slug, for the event `location` column.
    pub venues: &'a HashMap<String, Uuid>,
}

/// Transformed entity content.
#[derive(Debug, Clone, PartialEq)]
pub enum RowPayload {
    Location(LocationData),
    Event(EventData),
}

impl RowPayload {
    pub fn address(&self) -> &Address {
        match self {
            RowPayload::Location(data) => &data.address,
            RowPayload::Event(data) => &data.address,
        }
    }

    pub fn point(&self) -> Option<Coordinates> {
        match self {
            RowPayload::Location(data) => data.point,
            RowPayload::Event(data) => data.point,
        }
    }

    pub fn set_point(&mut self, point: Option<Coordinates>) {
        match self {
            RowPayload::Location(data) => data.point = point,
            RowPayload::Event(data) => data.point = point,
        }
    }
}

/// Result of transforming one row.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedRow {
    pub payload: RowPayload,
    pub warnings: Vec<Message>,
    /// Coordinates came from `lat`/`lng` columns; geocoding is skipped.
    pub explicit_point: bool,
}

/// Computes the deduplication hash from the row's natural key.
pub fn natural_key_hash(kind: ImportKind, row: &RawRow, lang: Lang) -> Result<String, TransformError> {
    let dict = dictionary(kind);
    let missing = |key: &str| TransformError::MissingValue {
        column: dict.label(key, lang),
    };

    match kind {
        ImportKind::Location => {
            let title_de = row.value(keys::TITLE_DE).ok_or_else(|| missing(keys::TITLE_DE))?;
            let title_en = row.value(keys::TITLE_EN).unwrap_or("");
            Ok(content_hash("location", &[title_de, title_en]))
        }
        ImportKind::Event => {
            let event_id = row.value(keys::EVENT_ID).ok_or_else(|| missing(keys::EVENT_ID))?;
            Ok(content_hash("event", &[event_id]))
        }
    }
}

/// Existing record content a row is applied on.
#[derive(Debug, Clone, Copy)]
pub enum Existing<'a> {
    Location(&'a LocationData),
    Event(&'a EventData),
}

/// Transforms a row of the given kind, starting from the existing content if any.
pub fn transform_row(
    kind: ImportKind,
    row: &RawRow,
    ctx: &TransformContext<'_>,
    existing: Option<Existing<'_>>,
) -> Result<TransformedRow, TransformError> {
    match kind {
        ImportKind::Location => {
            let base = match existing {
                Some(Existing::Location(data)) => data.clone(),
                _ => LocationData::default(),
            };
            transform_location(row, ctx, base)
        }
        ImportKind::Event => {
            let base = match existing {
                Some(Existing::Event(data)) => data.clone(),
                _ => EventData::default(),
            };
            transform_event(row, ctx, base)
        }
    }
}

struct FieldWriter<'r, 'c> {
    row: &'r RawRow,
    ctx: &'r TransformContext<'c>,
    dict: &'static HeaderDictionary,
    warnings: Vec<Message>,
}

impl<'r, 'c> FieldWriter<'r, 'c> {
    fn new(kind: ImportKind, row: &'r RawRow, ctx: &'r TransformContext<'c>) -> Self {
        Self {
            row,
            ctx,
            dict: dictionary(kind),
            warnings: Vec::new(),
        }
    }

    fn label(&self, key: &str) -> String {
        self.dict.label(key, self.ctx.lang)
    }

    fn text(&self, key: &str, target: &mut Option<String>) {
        match self.row.cell(key) {
            Cell::Unmapped => {}
            Cell::Empty => *target = None,
            Cell::Value(v) => *target = Some(v.to_string()),
        }
    }

    fn translated(&self, de_key: &str, en_key: &str, target: &mut Translated) {
        self.text(de_key, &mut target.de);
        self.text(en_key, &mut target.en);
    }

    fn address(&self, target: &mut Address) {
        self.text(keys::STREET1, &mut target.street1);
        self.text(keys::STREET2, &mut target.street2);
        self.text(keys::HOUSE_NUMBER, &mut target.house_number);
        self.text(keys::POST_CODE, &mut target.post_code);
        self.text(keys::CITY, &mut target.city);
    }

    fn email(&mut self, key: &str, target: &mut Option<String>) {
        match self.row.cell(key) {
            Cell::Unmapped => {}
            Cell::Empty => *target = None,
            Cell::Value(v) if is_valid_email(v) => *target = Some(v.to_string()),
            Cell::Value(v) => self.warnings.push(Message::InvalidEmail {
                row: self.row.number,
                column: self.label(key),
                value: v.to_string(),
            }),
        }
    }

    fn url(&mut self, key: &str, target: &mut Option<String>) {
        match self.row.cell(key) {
            Cell::Unmapped => {}
            Cell::Empty => *target = None,
            Cell::Value(v) if is_valid_url(v) => *target = Some(normalize_url(v)),
            Cell::Value(v) => self.warnings.push(Message::InvalidUrl {
                row: self.row.number,
                column: self.label(key),
                value: v.to_string(),
            }),
        }
    }

    fn contact(&mut self, target: &mut Contact) {
        self.text(keys::PHONE, &mut target.phone);
        self.email(keys::EMAIL, &mut target.email);
        self.url(keys::WEBSITE, &mut target.website);
    }

    /// Replaces the term list when any of the columns is mapped.
    fn terms(&mut self, taxonomy: &str, columns: &[&str], target: &mut Vec<Uuid>) {
        if columns
            .iter()
            .all(|key| matches!(self.row.cell(key), Cell::Unmapped))
        {
            return;
        }

        let mut resolved = Vec::new();
        for key in columns {
            let Cell::Value(value) = self.row.cell(key) else {
                continue;
            };
            match self.ctx.terms.resolve(taxonomy, value) {
                Some(term) if !resolved.contains(&term.id) => resolved.push(term.id),
                Some(_) => {}
                None => self.warnings.push(Message::UnknownTerm {
                    row: self.row.number,
                    column: self.label(key),
                    value: value.to_string(),
                }),
            }
        }
        *target = resolved;
    }

    /// Sets the point from `lat`/`lng` columns; returns whether it did.
    fn point(&mut self, target: &mut Option<Coordinates>) -> bool {
        let (lat, lng) = match (self.row.cell(keys::LAT), self.row.cell(keys::LNG)) {
            (Cell::Value(lat), Cell::Value(lng)) => (lat, lng),
            (Cell::Value(_), _) | (_, Cell::Value(_)) => {
                self.warnings.push(Message::InvalidCoordinates {
                    row: self.row.number,
                });
                return false;
            }
            _ => return false,
        };

        match (parse_coordinate(lat), parse_coordinate(lng)) {
            (Some(lat), Some(lng)) if Coordinates::new(lat, lng).is_valid() => {
                *target = Some(Coordinates::new(lat, lng));
                true
            }
            _ => {
                self.warnings.push(Message::InvalidCoordinates {
                    row: self.row.number,
                });
                false
            }
        }
    }
}

fn transform_location(
    row: &RawRow,
    ctx: &TransformContext<'_>,
    mut data: LocationData,
) -> Result<TransformedRow, TransformError> {
    let mut writer = FieldWriter::new(ImportKind::Location, row, ctx);

    writer.translated(keys::TITLE_DE, keys::TITLE_EN, &mut data.title);
    if data.title.de.is_none() {
        return Err(TransformError::MissingValue {
            column: writer.label(keys::TITLE_DE),
        });
    }
    writer.translated(keys::DESCRIPTION_DE, keys::DESCRIPTION_EN, &mut data.description);
    writer.address(&mut data.address);
    writer.contact(&mut data.contact);
    social(&mut writer, &mut data.social);
    writer.terms(
        LOCATION_TYPE_TAXONOMY,
        &[keys::TYPE_1, keys::TYPE_2],
        &mut data.term_ids,
    );
    let explicit_point = writer.point(&mut data.point);

    Ok(TransformedRow {
        payload: RowPayload::Location(data),
        warnings: writer.warnings,
        explicit_point,
    })
}

fn social(writer: &mut FieldWriter<'_, '_>, target: &mut SocialMedia) {
    writer.url(keys::FACEBOOK, &mut target.facebook);
    writer.url(keys::INSTAGRAM, &mut target.instagram);
    writer.url(keys::TWITTER, &mut target.twitter);
    writer.url(keys::YOUTUBE, &mut target.youtube);
}

fn transform_event(
    row: &RawRow,
    ctx: &TransformContext<'_>,
    mut data: EventData,
) -> Result<TransformedRow, TransformError> {
    let mut writer = FieldWriter::new(ImportKind::Event, row, ctx);

    writer.text(keys::EVENT_ID, &mut data.event_id);
    writer.translated(keys::TITLE_DE, keys::TITLE_EN, &mut data.title);
    if data.title.de.is_none() {
        return Err(TransformError::MissingValue {
            column: writer.label(keys::TITLE_DE),
        });
    }

    let begin_date = required_date(&writer, keys::DATE_BEGIN, data.begins_at.map(|d| d.date()))?;
    let begin_time = required_time(&writer, keys::TIME_BEGIN, data.begins_at.map(|d| d.time()))?;
    data.begins_at = Some(NaiveDateTime::new(begin_date, begin_time));
    data.ends_at = event_end(&mut writer, begin_date, data.ends_at);

    writer.translated(keys::DESCRIPTION_DE, keys::DESCRIPTION_EN, &mut data.description);
    writer.address(&mut data.address);
    writer.contact(&mut data.contact);

    match row.cell(keys::LOCATION) {
        Cell::Unmapped => {}
        Cell::Empty => data.location_id = None,
        Cell::Value(value) => match ctx.venues.get(&shared::text::slugify(value)) {
            Some(id) => data.location_id = Some(*id),
            None => writer.warnings.push(Message::UnknownLocation {
                row: row.number,
                value: value.to_string(),
            }),
        },
    }

    writer.terms(
        EVENT_TYPE_TAXONOMY,
        &[keys::EVENT_TYPE_1, keys::EVENT_TYPE_2],
        &mut data.term_ids,
    );
    let explicit_point = writer.point(&mut data.point);

    Ok(TransformedRow {
        payload: RowPayload::Event(data),
        warnings: writer.warnings,
        explicit_point,
    })
}

/// Parses `YYYY-MM-DD` or `DD.MM.YYYY`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d.%m.%Y"))
        .ok()
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

fn required_date(
    writer: &FieldWriter<'_, '_>,
    key: &str,
    current: Option<NaiveDate>,
) -> Result<NaiveDate, TransformError> {
    match writer.row.cell(key) {
        Cell::Value(v) => parse_date(v).ok_or_else(|| TransformError::InvalidDate {
            column: writer.label(key),
            value: v.to_string(),
        }),
        Cell::Unmapped => current.ok_or_else(|| TransformError::MissingValue {
            column: writer.label(key),
        }),
        Cell::Empty => Err(TransformError::MissingValue {
            column: writer.label(key),
        }),
    }
}

fn required_time(
    writer: &FieldWriter<'_, '_>,
    key: &str,
    current: Option<NaiveTime>,
) -> Result<NaiveTime, TransformError> {
    match writer.row.cell(key) {
        Cell::Value(v) => parse_time(v).ok_or_else(|| TransformError::InvalidTime {
            column: writer.label(key),
            value: v.to_string(),
        }),
        Cell::Unmapped => current.ok_or_else(|| TransformError::MissingValue {
            column: writer.label(key),
        }),
        Cell::Empty => Err(TransformError::MissingValue {
            column: writer.label(key),
        }),
    }
}

/// End of an event; invalid values warn and keep the current end.
fn event_end(
    writer: &mut FieldWriter<'_, '_>,
    begin_date: NaiveDate,
    current: Option<NaiveDateTime>,
) -> Option<NaiveDateTime> {
    let date_cell = writer.row.cell(keys::DATE_END);
    let time_cell = writer.row.cell(keys::TIME_END);
    if matches!(date_cell, Cell::Unmapped) && matches!(time_cell, Cell::Unmapped) {
        return current;
    }

    let date = match date_cell {
        Cell::Value(v) => match parse_date(v) {
            Some(date) => Some(date),
            None => {
                writer.warnings.push(Message::InvalidDate {
                    row: writer.row.number,
                    column: writer.label(keys::DATE_END),
                    value: v.to_string(),
                });
                return current;
            }
        },
        _ => None,
    };
    let time = match time_cell {
        Cell::Value(v) => match parse_time(v) {
            Some(time) => Some(time),
            None => {
                writer.warnings.push(Message::InvalidTime {
                    row: writer.row.number,
                    column: writer.label(keys::TIME_END),
                    value: v.to_string(),
                });
                return current;
            }
        },
        _ => None,
    };

    match (date, time) {
        (None, None) => None,
        (date, time) => Some(NaiveDateTime::new(
            date.unwrap_or(begin_date),
            time.unwrap_or(NaiveTime::MIN),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PublishStatus, Term};
    use crate::services::header_mapper::map_headers;

    fn row_from(kind: ImportKind, headers: &[&str], cells: &[&str]) -> RawRow {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let cells: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        let mapping = map_headers(kind, &headers, None);
        RawRow::from_cells(&mapping, 0, &cells)
    }

    fn terms() -> TermDictionary {
        TermDictionary::new(vec![
            Term {
                id: Uuid::from_u128(1),
                taxonomy: LOCATION_TYPE_TAXONOMY.to_string(),
                slug: "museum".to_string(),
                name_de: Some("Museum".to_string()),
                name_en: Some("Museum".to_string()),
            },
            Term {
                id: Uuid::from_u128(2),
                taxonomy: EVENT_TYPE_TAXONOMY.to_string(),
                slug: "konzert".to_string(),
                name_de: Some("Konzert".to_string()),
                name_en: Some("Concert".to_string()),
            },
        ])
    }

    const LOCATION_HEADERS: [&str; 8] = [
        "###", "Titel (de)", "Straße", "Hausnummer", "PLZ", "Ort", "Typ 1", "E-Mail",
    ];

    fn location_row(email: &str) -> RawRow {
        row_from(
            ImportKind::Location,
            &LOCATION_HEADERS,
            &["7", "Café Mitte", "Treskowallee", "8", "10318", "Berlin", "Museum", email],
        )
    }

    fn transform(kind: ImportKind, row: &RawRow, existing: Option<Existing<'_>>) -> TransformedRow {
        let terms = terms();
        let venues = HashMap::from([("kulturhaus".to_string(), Uuid::from_u128(9))]);
        let ctx = TransformContext {
            lang: Lang::De,
            terms: &terms,
            venues: &venues,
        };
        transform_row(kind, row, &ctx, existing).unwrap()
    }

    fn location(result: &TransformedRow) -> &LocationData {
        match &result.payload {
            RowPayload::Location(data) => data,
            RowPayload::Event(_) => panic!("expected location"),
        }
    }

    fn event(result: &TransformedRow) -> &EventData {
        match &result.payload {
            RowPayload::Event(data) => data,
            RowPayload::Location(_) => panic!("expected event"),
        }
    }

    #[test]
    fn test_row_number_from_reserved_column() {
        let row = location_row("info@example.org");
        assert_eq!(row.number, 7);
        assert!(!row.values.contains_key(ROW_NUMBER_HEADER));
    }

    #[test]
    fn test_row_number_falls_back_to_data_index() {
        let headers = vec!["PLZ".to_string()];
        let mapping = map_headers(ImportKind::Location, &headers, None);
        let row = RawRow::from_cells(&mapping, 4, &["10318".to_string()]);
        assert_eq!(row.number, 5);
    }

    #[test]
    fn test_transform_location() {
        let result = transform(ImportKind::Location, &location_row("info@example.org"), None);
        let data = location(&result);

        assert!(result.warnings.is_empty());
        assert_eq!(data.title.de.as_deref(), Some("Café Mitte"));
        assert_eq!(data.address.post_code.as_deref(), Some("10318"));
        assert_eq!(data.contact.email.as_deref(), Some("info@example.org"));
        assert_eq!(data.term_ids, vec![Uuid::from_u128(1)]);
        assert!(!result.explicit_point);
    }

    #[test]
    fn test_invalid_email_is_a_warning() {
        let result = transform(ImportKind::Location, &location_row("not-an-email"), None);

        assert_eq!(
            result.warnings,
            vec![Message::InvalidEmail {
                row: 7,
                column: "E-Mail".to_string(),
                value: "not-an-email".to_string(),
            }]
        );
        assert_eq!(location(&result).contact.email, None);
        assert_eq!(
            PublishStatus::for_import(!result.warnings.is_empty()),
            PublishStatus::ImportedWithWarnings
        );
    }

    #[test]
    fn test_unmapped_fields_keep_existing_values() {
        let existing = LocationData {
            description: Translated {
                de: Some("Altes Haus".to_string()),
                en: None,
            },
            contact: Contact {
                phone: Some("030 123".to_string()),
                email: Some("old@example.org".to_string()),
                website: None,
            },
            ..Default::default()
        };

        let result = transform(
            ImportKind::Location,
            &location_row("not-an-email"),
            Some(Existing::Location(&existing)),
        );
        let data = location(&result);

        assert_eq!(data.description.de.as_deref(), Some("Altes Haus"));
        assert_eq!(data.contact.phone.as_deref(), Some("030 123"));
        assert_eq!(data.contact.email.as_deref(), Some("old@example.org"));
    }

    #[test]
    fn test_mapped_empty_cell_clears_value() {
        let existing = LocationData {
            contact: Contact {
                email: Some("old@example.org".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = transform(
            ImportKind::Location,
            &location_row(""),
            Some(Existing::Location(&existing)),
        );
        assert_eq!(location(&result).contact.email, None);
    }

    #[test]
    fn test_url_gets_scheme() {
        let row = row_from(
            ImportKind::Location,
            &["Titel (de)", "Webseite", "Instagram"],
            &["Kino", "www.kino.example.org", "no url"],
        );
        let result = transform(ImportKind::Location, &row, None);
        let data = location(&result);

        assert_eq!(
            data.contact.website.as_deref(),
            Some("https://www.kino.example.org")
        );
        assert_eq!(data.social.instagram, None);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_unknown_term_is_a_warning() {
        let row = row_from(
            ImportKind::Location,
            &["Titel (de)", "Typ 1", "Typ 2"],
            &["Kino", "Museum", "Zoo"],
        );
        let result = transform(ImportKind::Location, &row, None);

        assert_eq!(location(&result).term_ids, vec![Uuid::from_u128(1)]);
        assert_eq!(
            result.warnings,
            vec![Message::UnknownTerm {
                row: 1,
                column: "Typ 2".to_string(),
                value: "Zoo".to_string(),
            }]
        );
    }

    #[test]
    fn test_explicit_coordinates() {
        let row = row_from(
            ImportKind::Location,
            &["Titel (de)", "Breitengrad", "Längengrad"],
            &["Kino", "52,4895", "13.5263"],
        );
        let result = transform(ImportKind::Location, &row, None);

        assert!(result.explicit_point);
        assert_eq!(location(&result).point, Some(Coordinates::new(52.4895, 13.5263)));
    }

    #[test]
    fn test_invalid_coordinates_warn() {
        let row = row_from(
            ImportKind::Location,
            &["Titel (de)", "Breitengrad", "Längengrad"],
            &["Kino", "152", "13.5"],
        );
        let result = transform(ImportKind::Location, &row, None);

        assert!(!result.explicit_point);
        assert_eq!(result.warnings, vec![Message::InvalidCoordinates { row: 1 }]);
    }

    #[test]
    fn test_location_hash_uses_both_titles() {
        let a = row_from(ImportKind::Location, &["Titel (de)", "Titel (en)"], &["Café Mitte", "Cafe"]);
        let b = row_from(ImportKind::Location, &["Titel (de)", "Titel (en)"], &[" café mitte ", "CAFE"]);
        let c = row_from(ImportKind::Location, &["Titel (de)"], &["Café Mitte"]);

        let hash_a = natural_key_hash(ImportKind::Location, &a, Lang::De).unwrap();
        assert_eq!(hash_a, natural_key_hash(ImportKind::Location, &b, Lang::De).unwrap());
        assert_ne!(hash_a, natural_key_hash(ImportKind::Location, &c, Lang::De).unwrap());
    }

    #[test]
    fn test_missing_natural_key_is_an_error() {
        let row = row_from(ImportKind::Event, &["Veranstaltungs-ID", "Titel (de)"], &["", "Jazz"]);
        assert_eq!(
            natural_key_hash(ImportKind::Event, &row, Lang::En),
            Err(TransformError::MissingValue {
                column: "Event ID".to_string()
            })
        );
    }

    const EVENT_HEADERS: [&str; 9] = [
        "Veranstaltungs-ID",
        "Titel (de)",
        "Beginn (Datum)",
        "Beginn (Uhrzeit)",
        "Ende (Uhrzeit)",
        "Ort",
        "Veranstaltungsort",
        "Veranstaltungsart 1",
        "Webseite",
    ];

    #[test]
    fn test_transform_event() {
        let row = row_from(
            ImportKind::Event,
            &EVENT_HEADERS,
            &["EV-1", "Jazz im Park", "24.08.2024", "19:30", "22:00", "Berlin", "Kulturhaus", "Concert", ""],
        );
        let result = transform(ImportKind::Event, &row, None);
        let data = event(&result);

        assert!(result.warnings.is_empty());
        assert_eq!(data.event_id.as_deref(), Some("EV-1"));
        assert_eq!(
            data.begins_at,
            NaiveDate::from_ymd_opt(2024, 8, 24).and_then(|d| d.and_hms_opt(19, 30, 0))
        );
        assert_eq!(
            data.ends_at,
            NaiveDate::from_ymd_opt(2024, 8, 24).and_then(|d| d.and_hms_opt(22, 0, 0))
        );
        assert_eq!(data.location_id, Some(Uuid::from_u128(9)));
        assert_eq!(data.term_ids, vec![Uuid::from_u128(2)]);
    }

    #[test]
    fn test_event_with_bad_start_date_fails() {
        let row = row_from(
            ImportKind::Event,
            &EVENT_HEADERS,
            &["EV-1", "Jazz", "32.13.2024", "19:30", "", "Berlin", "", "", ""],
        );
        let terms = terms();
        let venues = HashMap::new();
        let ctx = TransformContext {
            lang: Lang::De,
            terms: &terms,
            venues: &venues,
        };

        let err = transform_row(ImportKind::Event, &row, &ctx, None).unwrap_err();
        assert_eq!(
            err,
            TransformError::InvalidDate {
                column: "Beginn (Datum)".to_string(),
                value: "32.13.2024".to_string(),
            }
        );
        assert_eq!(
            err.message(row.number),
            Message::InvalidDate {
                row: 1,
                column: "Beginn (Datum)".to_string(),
                value: "32.13.2024".to_string(),
            }
        );
    }

    #[test]
    fn test_event_unknown_venue_warns() {
        let row = row_from(
            ImportKind::Event,
            &EVENT_HEADERS,
            &["EV-2", "Lesung", "2024-09-01", "18:00", "", "Berlin", "Unbekannt", "", ""],
        );
        let result = transform(ImportKind::Event, &row, None);

        assert_eq!(event(&result).location_id, None);
        assert_eq!(event(&result).ends_at, None);
        assert_eq!(
            result.warnings,
            vec![Message::UnknownLocation {
                row: 1,
                value: "Unbekannt".to_string(),
            }]
        );
    }

    #[test]
    fn test_empty_row() {
        let row = row_from(ImportKind::Location, &["###", "Titel (de)", "PLZ"], &["3", " ", ""]);
        assert!(row.is_empty());
        assert!(!location_row("x").is_empty());
    }

    #[test]
    fn test_parse_date_and_time() {
        assert_eq!(parse_date("2024-08-24"), NaiveDate::from_ymd_opt(2024, 8, 24));
        assert_eq!(parse_date("24.08.2024"), NaiveDate::from_ymd_opt(2024, 8, 24));
        assert_eq!(parse_date("08/24/2024"), None);
        assert_eq!(parse_time("19:30"), NaiveTime::from_hms_opt(19, 30, 0));
        assert_eq!(parse_time("19:30:15"), NaiveTime::from_hms_opt(19, 30, 15));
        assert_eq!(parse_time("7pm"), None);
    }
}
