//! Runs a claimed export job and stores the resulting XLSX file.

use std::collections::HashMap;

use domain::models::{Event, ExportJob, ExportMeta, ImportKind, JobStatus, Location, PublishStatus, Term};
use domain::services::export_rows::{event_row, header_row, location_row, ExportLookup};
use domain::services::job_context::JobContext;
use domain::services::messages::Message;
use persistence::repositories::{EventRepository, ExportJobRepository, LocationRepository, TermRepository};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::file_store::{FileStore, FileStoreError};

const EXPORT_FOLDER: &str = "exports";
const SHEET_NAME: &str = "Export";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("Storage error: {0}")]
    Storage(#[from] FileStoreError),
}

/// Statuses to export; an empty filter exports every status.
pub fn status_filter(meta: &ExportMeta) -> Vec<String> {
    let statuses: &[PublishStatus] = if meta.statuses.is_empty() {
        &[
            PublishStatus::Draft,
            PublishStatus::Published,
            PublishStatus::Imported,
            PublishStatus::ImportedWithWarnings,
        ]
    } else {
        &meta.statuses
    };
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

/// Writes a single-sheet workbook with a bold header row and returns it with its row count.
///
/// The sheet runs in constant memory mode: each row is flushed as soon as it is
/// rendered, so `rows` should be a lazy iterator.
pub fn build_workbook<I>(header: &[String], rows: I) -> Result<(Vec<u8>, usize), XlsxError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet_with_constant_memory();
    worksheet.set_name(SHEET_NAME)?;

    for (col, value) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, value, &bold)?;
    }
    let mut count = 0usize;
    for row in rows {
        count += 1;
        let line = count as u32;
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(line, col as u16, value)?;
            }
        }
    }

    Ok((workbook.save_to_buffer()?, count))
}

/// Records selected for one export, with the lookups needed to render them.
struct Selection {
    records: Records,
    lookup: ExportLookup,
}

enum Records {
    Locations(Vec<Location>),
    Events(Vec<Event>),
}

pub struct ExportRunner {
    jobs: ExportJobRepository,
    locations: LocationRepository,
    events: EventRepository,
    terms: TermRepository,
    files: FileStore,
}

impl ExportRunner {
    pub fn new(pool: PgPool, files: FileStore) -> Self {
        Self {
            jobs: ExportJobRepository::new(pool.clone()),
            locations: LocationRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            terms: TermRepository::new(pool),
            files,
        }
    }

    /// Runs a job that was claimed (status `processing`) and returns its final status.
    pub async fn run(&self, job: ExportJob) -> Result<JobStatus, ExportError> {
        let mut ctx = JobContext::new(job.id, job.lang);
        ctx.log(Message::ExportStarted);
        info!(job_id = %job.id, kind = %job.kind, "Export started");

        match self.write_file(&job).await {
            Ok((file_ref, rows)) => {
                ctx.log(Message::ExportFinished { rows });
                info!(job_id = %job.id, rows, file_ref = %file_ref, "Export finished");
                self.finish(&ctx, JobStatus::Processed, Some(&file_ref)).await
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "Export failed");
                ctx.error(Message::ExportFailed {
                    reason: e.to_string(),
                });
                self.finish(&ctx, JobStatus::Error, None).await
            }
        }
    }

    async fn write_file(&self, job: &ExportJob) -> Result<(String, usize), ExportError> {
        let Selection { records, lookup } = self.select(job).await?;
        let header = header_row(job.kind, job.lang);
        let lang = job.lang;

        let (bytes, rows) = match &records {
            Records::Locations(locations) => build_workbook(
                &header,
                locations
                    .iter()
                    .enumerate()
                    .map(|(i, location)| location_row(i + 1, location, &lookup, lang)),
            )?,
            Records::Events(events) => build_workbook(
                &header,
                events
                    .iter()
                    .enumerate()
                    .map(|(i, event)| event_row(i + 1, event, &lookup, lang)),
            )?,
        };
        let file_ref = self.files.save(EXPORT_FOLDER, "xlsx", &bytes).await?;
        Ok((file_ref, rows))
    }

    async fn select(&self, job: &ExportJob) -> Result<Selection, sqlx::Error> {
        let statuses = status_filter(&job.meta);
        let mut lookup = ExportLookup {
            terms: HashMap::new(),
            venues: HashMap::new(),
        };
        let empty = match job.kind {
            ImportKind::Location => Records::Locations(Vec::new()),
            ImportKind::Event => Records::Events(Vec::new()),
        };

        let term_ids = if job.meta.term_slugs.is_empty() {
            Vec::new()
        } else {
            let ids = self.terms.ids_by_slugs(&job.meta.term_slugs).await?;
            if ids.is_empty() {
                // none of the requested terms exist
                return Ok(Selection {
                    records: empty,
                    lookup,
                });
            }
            ids
        };

        lookup.terms = self
            .terms
            .list_all()
            .await?
            .into_iter()
            .map(|entity| {
                let term = Term::from(entity);
                (term.id, term)
            })
            .collect();

        let records = match job.kind {
            ImportKind::Location => Records::Locations(
                self.locations
                    .list_for_export(&statuses, &term_ids)
                    .await?
                    .into_iter()
                    .map(Location::from)
                    .collect(),
            ),
            ImportKind::Event => {
                let events: Vec<Event> = self
                    .events
                    .list_for_export(&statuses, &term_ids)
                    .await?
                    .into_iter()
                    .map(Event::from)
                    .collect();
                let venue_ids: Vec<Uuid> = events.iter().filter_map(|e| e.data.location_id).collect();
                if !venue_ids.is_empty() {
                    lookup.venues = self.locations.slugs_by_ids(&venue_ids).await?;
                }
                Records::Events(events)
            }
        };
        Ok(Selection { records, lookup })
    }

    async fn finish(
        &self,
        ctx: &JobContext,
        status: JobStatus,
        file_ref: Option<&str>,
    ) -> Result<JobStatus, ExportError> {
        self.jobs
            .finish(ctx.job_id, status.as_str(), ctx.log_lines(), ctx.errors(), file_ref)
            .await?;
        Ok(status)
    }
}
