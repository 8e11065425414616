//! Komoot Photon: free-text search returning a GeoJSON FeatureCollection.

use async_trait::async_trait;
use domain::models::{Address, AddressCandidate, Coordinates, GeocodingResult};
use serde_json::Value;

use super::{degrade, free_text, Geocoder, GeocodingError, ProviderHttp, CANDIDATE_LIMIT};

const DEFAULT_BASE_URL: &str = "https://photon.komoot.io";

pub struct PhotonGeocoder {
    http: ProviderHttp,
    base_url: String,
    country: String,
}

impl PhotonGeocoder {
    pub fn new(http: ProviderHttp, base_url: &str, country: &str) -> Self {
        let base_url = if base_url.is_empty() { DEFAULT_BASE_URL } else { base_url };
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            country: country.to_string(),
        }
    }

    async fn fetch(&self, q: &str) -> Result<GeocodingResult, GeocodingError> {
        let url = format!("{}/api", self.base_url);
        let params = [("q", q.to_string()), ("limit", CANDIDATE_LIMIT.to_string())];
        let body = self.http.get_json(&url, &params).await?;
        parse_feature_collection(&body)
    }
}

/// Reads Photon features. Features without a point geometry are skipped.
pub(super) fn parse_feature_collection(body: &Value) -> Result<GeocodingResult, GeocodingError> {
    let features = body["features"]
        .as_array()
        .ok_or_else(|| GeocodingError::Decode("missing features".to_string()))?;

    let candidates = features
        .iter()
        .filter_map(|feature| {
            let coords = feature["geometry"]["coordinates"].as_array()?;
            let lng = coords.first()?.as_f64()?;
            let lat = coords.get(1)?.as_f64()?;
            let properties = &feature["properties"];
            let label = [
                properties["name"].as_str(),
                properties["street"].as_str(),
                properties["housenumber"].as_str(),
                properties["city"].as_str(),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

            Some(AddressCandidate {
                coordinates: Coordinates::new(lat, lng),
                postal_code: properties["postcode"].as_str().map(str::to_string),
                distance: None,
                label: Some(label).filter(|l| !l.is_empty()),
                raw: feature.clone(),
            })
        })
        .collect();

    Ok(GeocodingResult::new(candidates))
}

#[async_trait]
impl Geocoder for PhotonGeocoder {
    fn provider(&self) -> &'static str {
        "photon"
    }

    fn describe(&self, address: &Address) -> String {
        free_text(address, &self.country)
    }

    async fn query(&self, address: &Address) -> GeocodingResult {
        let q = self.describe(address);
        let result = self.fetch(&q).await;
        degrade(self.provider(), &q, result)
    }
}
