//! Per-job log, warning and error accumulation.

use uuid::Uuid;

use super::messages::Message;
use crate::models::Lang;

/// What happened to one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Created,
    Updated,
    Skipped,
}

/// Outcome of processing a single row, merged into the job context in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub row: usize,
    pub action: RowAction,
    pub warnings: Vec<Message>,
    pub error: Option<Message>,
}

impl RowOutcome {
    pub fn skipped(row: usize, warning: Message) -> Self {
        Self {
            row,
            action: RowAction::Skipped,
            warnings: vec![warning],
            error: None,
        }
    }

    pub fn failed(row: usize, error: Message) -> Self {
        Self {
            row,
            action: RowAction::Skipped,
            warnings: Vec::new(),
            error: Some(error),
        }
    }
}

/// Counts of row actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Running state of one job, passed explicitly through the pipeline.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_id: Uuid,
    pub lang: Lang,
    log: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    stats: ImportStats,
}

impl JobContext {
    pub fn new(job_id: Uuid, lang: Lang) -> Self {
        Self {
            job_id,
            lang,
            log: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            stats: ImportStats::default(),
        }
    }

    pub fn log(&mut self, message: Message) {
        self.log.push(message.render(self.lang));
    }

    pub fn warn(&mut self, message: Message) {
        self.warnings.push(message.render(self.lang));
    }

    pub fn error(&mut self, message: Message) {
        self.errors.push(message.render(self.lang));
    }

    /// Appends a row outcome; outcomes must be merged in row order.
    pub fn merge(&mut self, outcome: RowOutcome) {
        match outcome.action {
            RowAction::Created => self.stats.created += 1,
            RowAction::Updated => self.stats.updated += 1,
            RowAction::Skipped => self.stats.skipped += 1,
        }
        for warning in outcome.warnings {
            self.warn(warning);
        }
        if let Some(error) = outcome.error {
            self.error(error);
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn stats(&self) -> ImportStats {
        self.stats
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_order_and_counts() {
        let mut ctx = JobContext::new(Uuid::new_v4(), Lang::En);
        ctx.merge(RowOutcome {
            row: 1,
            action: RowAction::Created,
            warnings: vec![Message::UnknownLocation {
                row: 1,
                value: "X".to_string(),
            }],
            error: None,
        });
        ctx.merge(RowOutcome::skipped(2, Message::EmptyRow { row: 2 }));
        ctx.merge(RowOutcome::failed(
            3,
            Message::MissingValue {
                row: 3,
                column: "Event ID".to_string(),
            },
        ));

        assert_eq!(ctx.warnings().len(), 2);
        assert!(ctx.warnings()[0].starts_with("Row 1"));
        assert!(ctx.warnings()[1].starts_with("Row 2"));
        assert_eq!(ctx.errors().len(), 1);
        assert!(ctx.has_errors());
        assert_eq!(
            ctx.stats(),
            ImportStats {
                created: 1,
                updated: 0,
                skipped: 2
            }
        );
    }

    #[test]
    fn test_contexts_do_not_share_state() {
        let mut first = JobContext::new(Uuid::new_v4(), Lang::De);
        first.error(Message::FileMissing);
        let second = JobContext::new(Uuid::new_v4(), Lang::De);

        assert!(first.has_errors());
        assert!(!second.has_errors());
    }

    #[test]
    fn test_log_renders_in_job_language() {
        let mut ctx = JobContext::new(Uuid::new_v4(), Lang::De);
        ctx.log(Message::ImportStarted { rows: 3 });
        assert_eq!(ctx.log_lines(), ["Import gestartet (3 Zeilen)".to_string()]);
    }
}
