//! Addresses and geocoding candidates.

use serde::{Deserialize, Serialize};

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        shared::validation::validate_latitude(self.lat).is_ok()
            && shared::validation::validate_longitude(self.lng).is_ok()
    }
}

/// Postal address of a location or event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub house_number: Option<String>,
    pub post_code: Option<String>,
    pub city: Option<String>,
}

impl Address {
    /// Street line with house number, e.g. `Karl-Marx-Allee 12`.
    pub fn street_line(&self) -> Option<String> {
        match (self.street1.as_deref(), self.house_number.as_deref()) {
            (Some(street), Some(number)) => Some(format!("{} {}", street, number)),
            (Some(street), None) => Some(street.to_string()),
            _ => None,
        }
    }

    /// Whether enough fields are present to ask a provider.
    pub fn is_geocodable(&self) -> bool {
        self.city.is_some() || self.post_code.is_some()
    }

    /// Fields relevant for geocoding differ from `other`.
    pub fn differs_for_geocoding(&self, other: &Address) -> bool {
        self.street1 != other.street1
            || self.house_number != other.house_number
            || self.post_code != other.post_code
            || self.city != other.city
    }
}

/// A single provider answer, normalised across providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCandidate {
    pub coordinates: Coordinates,
    pub postal_code: Option<String>,
    /// Distance to the center of gravity in metres, once ranked.
    pub distance: Option<f64>,
    pub label: Option<String>,
    pub raw: serde_json::Value,
}

/// Result of a provider query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResult {
    pub candidates: Vec<AddressCandidate>,
    pub count: usize,
}

impl GeocodingResult {
    pub fn new(candidates: Vec<AddressCandidate>) -> Self {
        let count = candidates.len();
        Self { candidates, count }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Inclusive bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn center(&self) -> Coordinates {
        Coordinates {
            lat: (self.min_lat + self.max_lat) / 2.0,
            lng: (self.min_lng + self.max_lng) / 2.0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min_lat < self.max_lat && self.min_lng < self.max_lng
    }
}

/// What is stored with an entity after geocoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodingInfo {
    pub provider: String,
    pub query: String,
    pub count: usize,
    pub chosen: Option<AddressCandidate>,
}

impl GeocodingInfo {
    pub const MANUAL_PROVIDER: &'static str = "manual";

    /// Marks a point taken from the sheet instead of a provider.
    pub fn manual(point: Coordinates) -> Self {
        Self {
            provider: Self::MANUAL_PROVIDER.to_string(),
            query: format!("{},{}", point.lat, point.lng),
            count: 0,
            chosen: None,
        }
    }
}
