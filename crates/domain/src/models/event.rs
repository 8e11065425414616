//! Event domain model.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geocoding::{Address, Coordinates};
use super::language::Translated;
use super::location::Contact;
use super::publish_status::PublishStatus;

/// Importable content of an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    /// External id from the organiser's system; natural key for imports.
    pub event_id: Option<String>,
    pub title: Translated,
    pub description: Translated,
    pub address: Address,
    pub contact: Contact,
    pub begins_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
    /// Venue, when the row references a known location.
    pub location_id: Option<Uuid>,
    pub term_ids: Vec<Uuid>,
    pub point: Option<Coordinates>,
}

/// A stored event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub slug: String,
    pub import_hash: Option<String>,
    pub status: PublishStatus,
    pub owner_id: Option<Uuid>,
    #[serde(flatten)]
    pub data: EventData,
    pub geocoding_info: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
