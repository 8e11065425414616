//! Location domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geocoding::{Address, Coordinates};
use super::language::Translated;
use super::publish_status::PublishStatus;

/// Contact channels of a location or event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

/// Social media profile URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMedia {
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub youtube: Option<String>,
}

/// Importable content of a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub title: Translated,
    pub description: Translated,
    pub address: Address,
    pub contact: Contact,
    pub social: SocialMedia,
    pub term_ids: Vec<Uuid>,
    pub point: Option<Coordinates>,
}

/// A stored location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Uuid,
    pub slug: String,
    /// Content hash of the natural key, set when the location came from an import.
    pub import_hash: Option<String>,
    pub status: PublishStatus,
    pub owner_id: Option<Uuid>,
    #[serde(flatten)]
    pub data: LocationData,
    pub geocoding_info: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
