//! Runs a claimed import job: reads the uploaded sheet, transforms, geocodes and
//! upserts every row, and records progress on the job.

use std::collections::HashMap;
use std::sync::Arc;

use domain::models::{
    Address, BoundingBox, Coordinates, Event, GeocodingInfo, ImportJob, ImportKind, JobStatus,
    Lang, Location, MappingEntry, PublishStatus, TermDictionary, Term,
};
use domain::services::geocode_ranking::{
    center_of_gravity, geocoding_get_address_candidates, get_best_matching_location, is_ambiguous,
    needs_geocoding,
};
use domain::services::header_mapper::validate_mapping;
use domain::services::job_context::{JobContext, RowAction, RowOutcome};
use domain::services::messages::Message;
use domain::services::row_transformer::{
    natural_key_hash, transform_row, Existing, RawRow, RowPayload, TransformContext,
};
use futures::stream::{self, StreamExt};
use metrics::counter;
use persistence::repositories::{
    EventRepository, ImportJobRepository, LocationRepository, TermRepository,
};
use shared::text::slugify;
use sqlx::PgPool;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::csv_source::{read_sheet, CsvSheet};
use super::file_store::{FileStore, FileStoreError};
use super::geocoding::Geocoder;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Tuning knobs taken from the `[import]` and `[geocoding]` config sections.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub max_rows: usize,
    pub row_concurrency: usize,
    pub flush_every: usize,
    pub bounding_box: Option<BoundingBox>,
    pub center_of_gravity: Option<Coordinates>,
}

/// Reference data for candidate ranking.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranking {
    pub bounding_box: Option<BoundingBox>,
    pub center: Option<Coordinates>,
}

/// Result of geocoding one address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeOutcome {
    pub point: Option<Coordinates>,
    pub info: GeocodingInfo,
    pub warnings: Vec<Message>,
}

/// Queries the provider and picks the candidate for `address`.
pub async fn geocode_address(
    geocoder: &dyn Geocoder,
    ranking: &Ranking,
    address: &Address,
    row: usize,
) -> GeocodeOutcome {
    let query = geocoder.describe(address);
    let result = geocoder.query(address).await;
    let candidates = geocoding_get_address_candidates(
        result.candidates,
        ranking.bounding_box.as_ref(),
        ranking.center,
    );

    let mut warnings = Vec::new();
    if candidates.is_empty() {
        warnings.push(Message::GeocodingNoResult {
            row,
            query: query.clone(),
        });
    } else if is_ambiguous(&candidates, address.post_code.as_deref()) {
        warnings.push(Message::GeocodingAmbiguous {
            row,
            count: candidates.len(),
        });
    }

    let chosen = get_best_matching_location(&candidates, address.post_code.as_deref()).cloned();
    GeocodeOutcome {
        point: chosen.as_ref().map(|c| c.coordinates),
        info: GeocodingInfo {
            provider: geocoder.provider().to_string(),
            query,
            count: result.count,
            chosen,
        },
        warnings,
    }
}

/// Setup checks that abort the whole job before any row is touched.
pub fn check_job(job: &ImportJob, bytes: &[u8], max_rows: usize) -> Result<CsvSheet, Message> {
    if job.status != JobStatus::Processing {
        return Err(Message::WrongStatus {
            status: job.status.to_string(),
        });
    }
    if job.mapping.is_empty() || !validate_mapping(job.kind, &job.mapping).is_complete() {
        return Err(Message::MappingMissing);
    }

    let sheet = read_sheet(bytes).map_err(|e| Message::FileUnreadable {
        reason: e.to_string(),
    })?;
    if sheet.headers.len() != job.mapping.len() {
        return Err(Message::FileUnreadable {
            reason: format!(
                "{} columns, mapping has {}",
                sheet.headers.len(),
                job.mapping.len()
            ),
        });
    }
    if sheet.rows.len() > max_rows {
        return Err(Message::TooManyRows {
            rows: sheet.rows.len(),
            max: max_rows,
        });
    }
    Ok(sheet)
}

/// Records a failure that stopped the run after setup.
pub fn abort(ctx: &mut JobContext, error: &ImportError) -> JobStatus {
    warn!(job_id = %ctx.job_id, error = %error, "Import aborted");
    ctx.error(Message::ImportFailed {
        reason: error.to_string(),
    });
    JobStatus::Error
}

/// Final job status for a finished run.
pub fn final_status(ctx: &JobContext) -> JobStatus {
    if ctx.has_errors() {
        JobStatus::Error
    } else {
        JobStatus::Processed
    }
}

fn slug_base(candidates: &[Option<&str>], fallback: &str) -> String {
    candidates
        .iter()
        .flatten()
        .map(|s| slugify(s))
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// A record found by its import hash.
enum Stored {
    Location(Location),
    Event(Event),
}

impl Stored {
    fn id(&self) -> Uuid {
        match self {
            Stored::Location(l) => l.id,
            Stored::Event(e) => e.id,
        }
    }

    fn existing(&self) -> Existing<'_> {
        match self {
            Stored::Location(l) => Existing::Location(&l.data),
            Stored::Event(e) => Existing::Event(&e.data),
        }
    }

    fn address_and_point(&self) -> (&Address, Option<Coordinates>) {
        match self {
            Stored::Location(l) => (&l.data.address, l.data.point),
            Stored::Event(e) => (&e.data.address, e.data.point),
        }
    }
}

/// Per-job lookups shared by all rows.
struct Lookups {
    lang: Lang,
    kind: ImportKind,
    owner_id: Uuid,
    terms: TermDictionary,
    venues: HashMap<String, Uuid>,
    ranking: Ranking,
}

pub struct ImportRunner {
    jobs: ImportJobRepository,
    locations: LocationRepository,
    events: EventRepository,
    terms: TermRepository,
    files: FileStore,
    geocoder: Arc<dyn Geocoder>,
    settings: ImportSettings,
}

impl ImportRunner {
    pub fn new(
        pool: PgPool,
        files: FileStore,
        geocoder: Arc<dyn Geocoder>,
        settings: ImportSettings,
    ) -> Self {
        Self {
            jobs: ImportJobRepository::new(pool.clone()),
            locations: LocationRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            terms: TermRepository::new(pool),
            files,
            geocoder,
            settings,
        }
    }

    /// Runs a job that was claimed (status `processing`) and returns its final status.
    ///
    /// The job always leaves `processing`: a database failure mid-run is logged on the
    /// job and finishes it as `error`.
    pub async fn run(
        &self,
        job: ImportJob,
        cancel: &CancellationToken,
    ) -> Result<JobStatus, ImportError> {
        let mut ctx = JobContext::new(job.id, job.lang);
        info!(job_id = %job.id, kind = %job.kind.as_str(), "Import started");

        let status = match self.load_sheet(&job).await {
            Ok(sheet) => match self.import_sheet(&job, sheet, &mut ctx, cancel).await {
                Ok(status) => status,
                Err(e) => abort(&mut ctx, &e),
            },
            Err(message) => {
                warn!(job_id = %job.id, reason = %message.render(Lang::En), "Import aborted");
                ctx.error(message);
                JobStatus::Error
            }
        };
        self.finish(&ctx, status).await
    }

    async fn import_sheet(
        &self,
        job: &ImportJob,
        sheet: CsvSheet,
        ctx: &mut JobContext,
        cancel: &CancellationToken,
    ) -> Result<JobStatus, ImportError> {
        let lookups = self.lookups(job).await?;
        ctx.log(Message::ImportStarted {
            rows: sheet.rows.len(),
        });
        self.save_progress(ctx).await?;

        let mapping = job.mapping.as_slice();
        let lookups = &lookups;
        let mut outcomes = stream::iter(sheet.rows.into_iter().enumerate())
            .map(|(index, cells)| self.process_row(mapping, lookups, index, cells))
            .buffered(self.settings.row_concurrency.max(1));

        let mut processed = 0usize;
        let mut cancelled = false;
        loop {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = outcomes.next() => match next {
                    Some(outcome) => outcome,
                    None => break,
                },
            };

            record_row_metric(job.kind, &outcome);
            ctx.merge(outcome);
            processed += 1;
            if processed % self.settings.flush_every.max(1) == 0 {
                self.save_progress(ctx).await?;
            }
        }
        drop(outcomes);

        let stats = ctx.stats();
        ctx.log(Message::ImportFinished {
            created: stats.created,
            updated: stats.updated,
            skipped: stats.skipped,
        });
        if cancelled {
            warn!(job_id = %job.id, processed, "Import cancelled");
            ctx.error(Message::Cancelled);
        }

        let status = final_status(ctx);
        info!(
            job_id = %job.id,
            created = stats.created,
            updated = stats.updated,
            skipped = stats.skipped,
            errors = ctx.errors().len(),
            status = %status,
            "Import finished"
        );
        Ok(status)
    }

    async fn load_sheet(&self, job: &ImportJob) -> Result<CsvSheet, Message> {
        let file_ref = job.file_ref.as_deref().ok_or(Message::FileMissing)?;
        let bytes = self.files.read(file_ref).await.map_err(|e| match e {
            FileStoreError::NotFound(_) => Message::FileMissing,
            other => Message::FileUnreadable {
                reason: other.to_string(),
            },
        })?;
        check_job(job, &bytes, self.settings.max_rows)
    }

    async fn lookups(&self, job: &ImportJob) -> Result<Lookups, sqlx::Error> {
        let terms: Vec<Term> = self.terms.list_all().await?.into_iter().map(Term::from).collect();

        let venues = match job.kind {
            ImportKind::Event => self.locations.venue_ids_by_slug().await?,
            ImportKind::Location => HashMap::new(),
        };

        let located: Vec<Coordinates> = if self.settings.center_of_gravity.is_some() {
            Vec::new()
        } else {
            self.locations
                .located_points()
                .await?
                .into_iter()
                .map(|(lat, lng)| Coordinates::new(lat, lng))
                .collect()
        };
        let center = center_of_gravity(
            self.settings.center_of_gravity,
            &located,
            self.settings.bounding_box.as_ref(),
        );
        debug!(job_id = %job.id, ?center, "Geocoding reference point");

        Ok(Lookups {
            lang: job.lang,
            kind: job.kind,
            owner_id: job.owner_id,
            terms: TermDictionary::new(terms),
            venues,
            ranking: Ranking {
                bounding_box: self.settings.bounding_box,
                center,
            },
        })
    }

    async fn find_stored(&self, kind: ImportKind, hash: &str) -> Result<Option<Stored>, sqlx::Error> {
        Ok(match kind {
            ImportKind::Location => self
                .locations
                .find_by_hash(hash)
                .await?
                .map(|e| Stored::Location(e.into())),
            ImportKind::Event => self
                .events
                .find_by_hash(hash)
                .await?
                .map(|e| Stored::Event(e.into())),
        })
    }

    async fn process_row(
        &self,
        mapping: &[MappingEntry],
        lookups: &Lookups,
        index: usize,
        cells: Vec<String>,
    ) -> RowOutcome {
        let raw = RawRow::from_cells(mapping, index, &cells);
        let row = raw.number;
        if raw.is_empty() {
            return RowOutcome::skipped(row, Message::EmptyRow { row });
        }

        match self.import_row(&raw, lookups).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(row, error = %e, "Row failed");
                RowOutcome::failed(
                    row,
                    Message::RowFailed {
                        row,
                        reason: e.to_string(),
                    },
                )
            }
        }
    }

    async fn import_row(&self, raw: &RawRow, lookups: &Lookups) -> Result<RowOutcome, sqlx::Error> {
        let row = raw.number;
        let hash = match natural_key_hash(lookups.kind, raw, lookups.lang) {
            Ok(hash) => hash,
            Err(e) => return Ok(RowOutcome::failed(row, e.message(row))),
        };

        let stored = self.find_stored(lookups.kind, &hash).await?;
        let ctx = TransformContext {
            lang: lookups.lang,
            terms: &lookups.terms,
            venues: &lookups.venues,
        };
        let transformed = match transform_row(
            lookups.kind,
            raw,
            &ctx,
            stored.as_ref().map(Stored::existing),
        ) {
            Ok(t) => t,
            Err(e) => return Ok(RowOutcome::failed(row, e.message(row))),
        };

        let mut payload = transformed.payload;
        let mut warnings = transformed.warnings;
        let mut geocoding_info = None;

        let previous = stored.as_ref().map(Stored::address_and_point);
        if needs_geocoding(payload.address(), transformed.explicit_point, previous) {
            let outcome = geocode_address(
                self.geocoder.as_ref(),
                &lookups.ranking,
                payload.address(),
                row,
            )
            .await;
            payload.set_point(outcome.point);
            warnings.extend(outcome.warnings);
            geocoding_info = serde_json::to_value(&outcome.info).ok();
        } else if transformed.explicit_point {
            if let Some(point) = payload.point() {
                geocoding_info = serde_json::to_value(GeocodingInfo::manual(point)).ok();
            }
        }

        let status = PublishStatus::for_import(!warnings.is_empty());
        let action = match (&payload, &stored) {
            (RowPayload::Location(data), Some(stored)) => {
                self.locations
                    .update(stored.id(), status, data, geocoding_info.as_ref())
                    .await?;
                RowAction::Updated
            }
            (RowPayload::Location(data), None) => {
                let base = slug_base(&[data.title.de.as_deref(), data.title.en.as_deref()], "location");
                let slug = self.locations.unique_slug(&base).await?;
                self.locations
                    .insert(&slug, &hash, status, lookups.owner_id, data, geocoding_info.as_ref())
                    .await?;
                RowAction::Created
            }
            (RowPayload::Event(data), Some(stored)) => {
                self.events
                    .update(stored.id(), status, data, geocoding_info.as_ref())
                    .await?;
                RowAction::Updated
            }
            (RowPayload::Event(data), None) => {
                let base = slug_base(
                    &[data.title.de.as_deref(), data.title.en.as_deref(), data.event_id.as_deref()],
                    "event",
                );
                let slug = self.events.unique_slug(&base).await?;
                self.events
                    .insert(&slug, &hash, status, lookups.owner_id, data, geocoding_info.as_ref())
                    .await?;
                RowAction::Created
            }
        };

        debug!(row, ?action, warnings = warnings.len(), "Row imported");
        Ok(RowOutcome {
            row,
            action,
            warnings,
            error: None,
        })
    }

    async fn save_progress(&self, ctx: &JobContext) -> Result<(), sqlx::Error> {
        self.jobs
            .save_progress(ctx.job_id, ctx.log_lines(), ctx.warnings(), ctx.errors())
            .await?;
        Ok(())
    }

    async fn finish(&self, ctx: &JobContext, status: JobStatus) -> Result<JobStatus, ImportError> {
        self.jobs
            .finish(
                ctx.job_id,
                status.as_str(),
                ctx.log_lines(),
                ctx.warnings(),
                ctx.errors(),
            )
            .await?;
        Ok(status)
    }
}

fn record_row_metric(kind: ImportKind, outcome: &RowOutcome) {
    let result = if outcome.error.is_some() {
        "error"
    } else {
        match outcome.action {
            RowAction::Created => "created",
            RowAction::Updated => "updated",
            RowAction::Skipped => "skipped",
        }
    };
    counter!(
        "import_rows_total",
        "kind" => kind.as_str(),
        "result" => result
    )
    .increment(1);
}
