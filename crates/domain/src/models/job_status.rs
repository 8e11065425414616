//! Lifecycle status shared by import and export jobs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of an import or export job.
///
/// `created → assign → process → processing → processed | error`, with `error`
/// re-enterable by an explicit retry and `deleted` as soft-delete marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Created,
    Assign,
    Process,
    Processing,
    Processed,
    Error,
    Deleted,
}

impl JobStatus {
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Created,
        JobStatus::Assign,
        JobStatus::Process,
        JobStatus::Processing,
        JobStatus::Processed,
        JobStatus::Error,
        JobStatus::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Created => "created",
            JobStatus::Assign => "assign",
            JobStatus::Process => "process",
            JobStatus::Processing => "processing",
            JobStatus::Processed => "processed",
            JobStatus::Error => "error",
            JobStatus::Deleted => "deleted",
        }
    }

    /// Whether a job may move from `self` to `next`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;

        match self {
            Created => matches!(next, Assign | Process | Error | Deleted),
            Assign => matches!(next, Assign | Process | Error | Deleted),
            Process => matches!(next, Processing | Error | Deleted),
            Processing => matches!(next, Processed | Error),
            Error => matches!(next, Assign | Process | Deleted),
            Processed => matches!(next, Deleted),
            Deleted => false,
        }
    }

    /// A worker owns the job; files and the record must not be removed.
    pub fn is_locked(&self) -> bool {
        matches!(self, JobStatus::Processing)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created" => Ok(JobStatus::Created),
            "assign" => Ok(JobStatus::Assign),
            "process" => Ok(JobStatus::Process),
            "processing" => Ok(JobStatus::Processing),
            "processed" => Ok(JobStatus::Processed),
            "error" => Ok(JobStatus::Error),
            "deleted" => Ok(JobStatus::Deleted),
            _ => Err(format!("Unknown job status: {}", s)),
        }
    }
}
