//! Publication status of imported entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    Draft,
    Published,
    Imported,
    ImportedWithWarnings,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Published => "published",
            PublishStatus::Imported => "imported",
            PublishStatus::ImportedWithWarnings => "imported_with_warnings",
        }
    }

    /// Status an import assigns to a row depending on whether it produced warnings.
    pub fn for_import(has_warnings: bool) -> Self {
        if has_warnings {
            PublishStatus::ImportedWithWarnings
        } else {
            PublishStatus::Imported
        }
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PublishStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(PublishStatus::Draft),
            "published" => Ok(PublishStatus::Published),
            "imported" => Ok(PublishStatus::Imported),
            "imported_with_warnings" => Ok(PublishStatus::ImportedWithWarnings),
            _ => Err(format!("Unknown publish status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_import() {
        assert_eq!(PublishStatus::for_import(false), PublishStatus::Imported);
        assert_eq!(
            PublishStatus::for_import(true),
            PublishStatus::ImportedWithWarnings
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "imported_with_warnings".parse::<PublishStatus>().unwrap(),
            PublishStatus::ImportedWithWarnings
        );
        assert!("archived".parse::<PublishStatus>().is_err());
    }
}
