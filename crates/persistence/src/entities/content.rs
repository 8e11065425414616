//! Location, event and taxonomy term entities.

use chrono::{DateTime, NaiveDateTime, Utc};
use domain::models::{
    Address, Contact, Coordinates, Event, EventData, Location, LocationData, PublishStatus,
    SocialMedia, Term, Translated,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row of `taxonomy_terms`.
#[derive(Debug, Clone, FromRow)]
pub struct TermEntity {
    pub id: Uuid,
    pub taxonomy: String,
    pub slug: String,
    pub name_de: Option<String>,
    pub name_en: Option<String>,
}

impl From<TermEntity> for Term {
    fn from(entity: TermEntity) -> Self {
        Self {
            id: entity.id,
            taxonomy: entity.taxonomy,
            slug: entity.slug,
            name_de: entity.name_de,
            name_en: entity.name_en,
        }
    }
}

/// Database row of `locations`.
#[derive(Debug, Clone, FromRow)]
pub struct LocationEntity {
    pub id: Uuid,
    pub slug: String,
    pub import_hash: Option<String>,
    pub status: String,
    pub owner_id: Option<Uuid>,
    pub title_de: Option<String>,
    pub title_en: Option<String>,
    pub description_de: Option<String>,
    pub description_en: Option<String>,
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub house_number: Option<String>,
    pub post_code: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub youtube: Option<String>,
    pub term_ids: Vec<Uuid>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub geocoding_info: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row of `events`.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub slug: String,
    pub import_hash: Option<String>,
    pub status: String,
    pub owner_id: Option<Uuid>,
    pub event_id: Option<String>,
    pub title_de: Option<String>,
    pub title_en: Option<String>,
    pub description_de: Option<String>,
    pub description_en: Option<String>,
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub house_number: Option<String>,
    pub post_code: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub begins_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
    pub location_id: Option<Uuid>,
    pub term_ids: Vec<Uuid>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub geocoding_info: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn point(lat: Option<f64>, lng: Option<f64>) -> Option<Coordinates> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
        _ => None,
    }
}

impl From<LocationEntity> for Location {
    fn from(e: LocationEntity) -> Self {
        Self {
            id: e.id,
            slug: e.slug,
            import_hash: e.import_hash,
            status: e.status.parse().unwrap_or(PublishStatus::Draft),
            owner_id: e.owner_id,
            data: LocationData {
                title: Translated {
                    de: e.title_de,
                    en: e.title_en,
                },
                description: Translated {
                    de: e.description_de,
                    en: e.description_en,
                },
                address: Address {
                    street1: e.street1,
                    street2: e.street2,
                    house_number: e.house_number,
                    post_code: e.post_code,
                    city: e.city,
                },
                contact: Contact {
                    phone: e.phone,
                    email: e.email,
                    website: e.website,
                },
                social: SocialMedia {
                    facebook: e.facebook,
                    instagram: e.instagram,
                    twitter: e.twitter,
                    youtube: e.youtube,
                },
                term_ids: e.term_ids,
                point: point(e.lat, e.lng),
            },
            geocoding_info: e.geocoding_info,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

impl From<EventEntity> for Event {
    fn from(e: EventEntity) -> Self {
        Self {
            id: e.id,
            slug: e.slug,
            import_hash: e.import_hash,
            status: e.status.parse().unwrap_or(PublishStatus::Draft),
            owner_id: e.owner_id,
            data: EventData {
                event_id: e.event_id,
                title: Translated {
                    de: e.title_de,
                    en: e.title_en,
                },
                description: Translated {
                    de: e.description_de,
                    en: e.description_en,
                },
                address: Address {
                    street1: e.street1,
                    street2: e.street2,
                    house_number: e.house_number,
                    post_code: e.post_code,
                    city: e.city,
                },
                contact: Contact {
                    phone: e.phone,
                    email: e.email,
                    website: e.website,
                },
                begins_at: e.begins_at,
                ends_at: e.ends_at,
                location_id: e.location_id,
                term_ids: e.term_ids,
                point: point(e.lat, e.lng),
            },
            geocoding_info: e.geocoding_info,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}
