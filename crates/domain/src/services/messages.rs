//! User-facing job messages, rendered in the job language.

use crate::models::Lang;

/// A log, warning or error line of an import or export job.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    MissingColumns { labels: Vec<String> },
    MissingGroup { labels: Vec<String> },
    TooManyRows { rows: usize, max: usize },
    FileMissing,
    FileUnreadable { reason: String },
    MappingMissing,
    WrongStatus { status: String },
    ImportStarted { rows: usize },
    ImportFinished { created: usize, updated: usize, skipped: usize },
    ExportStarted,
    ExportFinished { rows: usize },
    ExportFailed { reason: String },
    ImportFailed { reason: String },
    Cancelled,
    EmptyRow { row: usize },
    MissingValue { row: usize, column: String },
    InvalidEmail { row: usize, column: String, value: String },
    InvalidUrl { row: usize, column: String, value: String },
    InvalidDate { row: usize, column: String, value: String },
    InvalidTime { row: usize, column: String, value: String },
    InvalidCoordinates { row: usize },
    UnknownTerm { row: usize, column: String, value: String },
    UnknownLocation { row: usize, value: String },
    GeocodingNoResult { row: usize, query: String },
    GeocodingAmbiguous { row: usize, count: usize },
    RowFailed { row: usize, reason: String },
}

impl Message {
    pub fn render(&self, lang: Lang) -> String {
        use Message::*;

        match (self, lang) {
            (MissingColumns { labels }, Lang::De) => {
                format!("Pflichtspalten fehlen: {}", labels.join(", "))
            }
            (MissingColumns { labels }, Lang::En) => {
                format!("Required columns missing: {}", labels.join(", "))
            }
            (MissingGroup { labels }, Lang::De) => format!(
                "Mindestens eine dieser Spalten muss zugeordnet sein: {}",
                labels.join(" / ")
            ),
            (MissingGroup { labels }, Lang::En) => format!(
                "At least one of these columns must be assigned: {}",
                labels.join(" / ")
            ),
            (TooManyRows { rows, max }, Lang::De) => format!(
                "Die Datei enthält {} Zeilen, erlaubt sind höchstens {}",
                rows, max
            ),
            (TooManyRows { rows, max }, Lang::En) => {
                format!("The file contains {} rows, at most {} are allowed", rows, max)
            }
            (FileMissing, Lang::De) => "Die Importdatei fehlt".to_string(),
            (FileMissing, Lang::En) => "The import file is missing".to_string(),
            (FileUnreadable { reason }, Lang::De) => {
                format!("Die Datei konnte nicht gelesen werden: {}", reason)
            }
            (FileUnreadable { reason }, Lang::En) => {
                format!("The file could not be read: {}", reason)
            }
            (MappingMissing, Lang::De) => "Die Spaltenzuordnung ist unvollständig".to_string(),
            (MappingMissing, Lang::En) => "The column mapping is incomplete".to_string(),
            (WrongStatus { status }, Lang::De) => {
                format!("Der Auftrag hat den unerwarteten Status {}", status)
            }
            (WrongStatus { status }, Lang::En) => {
                format!("The job has the unexpected status {}", status)
            }
            (ImportStarted { rows }, Lang::De) => format!("Import gestartet ({} Zeilen)", rows),
            (ImportStarted { rows }, Lang::En) => format!("Import started ({} rows)", rows),
            (
                ImportFinished {
                    created,
                    updated,
                    skipped,
                },
                Lang::De,
            ) => format!(
                "Import beendet: {} angelegt, {} aktualisiert, {} übersprungen",
                created, updated, skipped
            ),
            (
                ImportFinished {
                    created,
                    updated,
                    skipped,
                },
                Lang::En,
            ) => format!(
                "Import finished: {} created, {} updated, {} skipped",
                created, updated, skipped
            ),
            (ExportStarted, Lang::De) => "Export gestartet".to_string(),
            (ExportStarted, Lang::En) => "Export started".to_string(),
            (ExportFinished { rows }, Lang::De) => {
                format!("Export beendet: {} Zeilen geschrieben", rows)
            }
            (ExportFinished { rows }, Lang::En) => {
                format!("Export finished: {} rows written", rows)
            }
            (ExportFailed { reason }, Lang::De) => {
                format!("Export fehlgeschlagen: {}", reason)
            }
            (ExportFailed { reason }, Lang::En) => format!("Export failed: {}", reason),
            (ImportFailed { reason }, Lang::De) => {
                format!("Import abgebrochen: {}", reason)
            }
            (ImportFailed { reason }, Lang::En) => format!("Import aborted: {}", reason),
            (Cancelled, Lang::De) => "Der Auftrag wurde abgebrochen".to_string(),
            (Cancelled, Lang::En) => "The job was cancelled".to_string(),
            (EmptyRow { row }, Lang::De) => format!("Zeile {}: leere Zeile übersprungen", row),
            (EmptyRow { row }, Lang::En) => format!("Row {}: empty row skipped", row),
            (MissingValue { row, column }, Lang::De) => {
                format!("Zeile {}: Pflichtwert \"{}\" fehlt", row, column)
            }
            (MissingValue { row, column }, Lang::En) => {
                format!("Row {}: required value \"{}\" is missing", row, column)
            }
            (InvalidEmail { row, column, value }, Lang::De) => format!(
                "Zeile {}: ungültige E-Mail-Adresse in Spalte \"{}\": {}",
                row, column, value
            ),
            (InvalidEmail { row, column, value }, Lang::En) => format!(
                "Row {}: invalid email address in column \"{}\": {}",
                row, column, value
            ),
            (InvalidUrl { row, column, value }, Lang::De) => {
                format!("Zeile {}: ungültige URL in Spalte \"{}\": {}", row, column, value)
            }
            (InvalidUrl { row, column, value }, Lang::En) => {
                format!("Row {}: invalid URL in column \"{}\": {}", row, column, value)
            }
            (InvalidDate { row, column, value }, Lang::De) => {
                format!("Zeile {}: ungültiges Datum in Spalte \"{}\": {}", row, column, value)
            }
            (InvalidDate { row, column, value }, Lang::En) => {
                format!("Row {}: invalid date in column \"{}\": {}", row, column, value)
            }
            (InvalidTime { row, column, value }, Lang::De) => format!(
                "Zeile {}: ungültige Uhrzeit in Spalte \"{}\": {}",
                row, column, value
            ),
            (InvalidTime { row, column, value }, Lang::En) => {
                format!("Row {}: invalid time in column \"{}\": {}", row, column, value)
            }
            (InvalidCoordinates { row }, Lang::De) => {
                format!("Zeile {}: ungültige Koordinaten, Adresse wird geokodiert", row)
            }
            (InvalidCoordinates { row }, Lang::En) => {
                format!("Row {}: invalid coordinates, geocoding the address instead", row)
            }
            (UnknownTerm { row, column, value }, Lang::De) => format!(
                "Zeile {}: unbekannter Begriff in Spalte \"{}\": {}",
                row, column, value
            ),
            (UnknownTerm { row, column, value }, Lang::En) => {
                format!("Row {}: unknown term in column \"{}\": {}", row, column, value)
            }
            (UnknownLocation { row, value }, Lang::De) => {
                format!("Zeile {}: unbekannter Veranstaltungsort: {}", row, value)
            }
            (UnknownLocation { row, value }, Lang::En) => {
                format!("Row {}: unknown venue: {}", row, value)
            }
            (GeocodingNoResult { row, query }, Lang::De) => {
                format!("Zeile {}: Adresse nicht gefunden: {}", row, query)
            }
            (GeocodingNoResult { row, query }, Lang::En) => {
                format!("Row {}: address not found: {}", row, query)
            }
            (GeocodingAmbiguous { row, count }, Lang::De) => format!(
                "Zeile {}: Adresse mehrdeutig ({} Treffer), erster Treffer verwendet",
                row, count
            ),
            (GeocodingAmbiguous { row, count }, Lang::En) => format!(
                "Row {}: ambiguous address ({} matches), using the first match",
                row, count
            ),
            (RowFailed { row, reason }, Lang::De) => {
                format!("Zeile {}: konnte nicht importiert werden: {}", row, reason)
            }
            (RowFailed { row, reason }, Lang::En) => {
                format!("Row {}: could not be imported: {}", row, reason)
            }
        }
    }
}
