//! HERE Geocoding & Search v7 with a qualified query (`qq`).

use async_trait::async_trait;
use domain::models::{Address, AddressCandidate, Coordinates, GeocodingResult};
use serde_json::Value;

use super::{degrade, Geocoder, GeocodingError, ProviderHttp, CANDIDATE_LIMIT};

const DEFAULT_BASE_URL: &str = "https://geocode.search.hereapi.com";

pub struct HereGeocoder {
    http: ProviderHttp,
    base_url: String,
    api_key: String,
    country: String,
}

impl HereGeocoder {
    pub fn new(http: ProviderHttp, base_url: &str, api_key: &str, country: &str) -> Self {
        let base_url = if base_url.is_empty() { DEFAULT_BASE_URL } else { base_url };
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            country: country.to_string(),
        }
    }

    async fn fetch(&self, qq: &str) -> Result<GeocodingResult, GeocodingError> {
        let url = format!("{}/v1/geocode", self.base_url);
        let params = [
            ("qq", qq.to_string()),
            ("limit", CANDIDATE_LIMIT.to_string()),
            ("apiKey", self.api_key.clone()),
        ];
        let body = self.http.get_json(&url, &params).await?;
        parse_items(&body)
    }
}

/// `street=…;houseNumber=…;postalCode=…;city=…;country=…` from the present fields.
fn qualified_query(address: &Address, country: &str) -> String {
    [
        ("street", address.street1.as_deref()),
        ("houseNumber", address.house_number.as_deref()),
        ("postalCode", address.post_code.as_deref()),
        ("city", address.city.as_deref()),
        ("country", Some(country).filter(|c| !c.is_empty())),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| format!("{}={}", key, v)))
    .collect::<Vec<_>>()
    .join(";")
}

fn parse_items(body: &Value) -> Result<GeocodingResult, GeocodingError> {
    let items = body["items"]
        .as_array()
        .ok_or_else(|| GeocodingError::Decode("missing items".to_string()))?;

    let candidates = items
        .iter()
        .filter_map(|item| {
            let lat = item["position"]["lat"].as_f64()?;
            let lng = item["position"]["lng"].as_f64()?;
            Some(AddressCandidate {
                coordinates: Coordinates::new(lat, lng),
                postal_code: item["address"]["postalCode"].as_str().map(str::to_string),
                distance: None,
                label: item["title"].as_str().map(str::to_string),
                raw: item.clone(),
            })
        })
        .collect();

    Ok(GeocodingResult::new(candidates))
}

#[async_trait]
impl Geocoder for HereGeocoder {
    fn provider(&self) -> &'static str {
        "here"
    }

    fn describe(&self, address: &Address) -> String {
        qualified_query(address, &self.country)
    }

    async fn query(&self, address: &Address) -> GeocodingResult {
        let qq = self.describe(address);
        let result = self.fetch(&qq).await;
        degrade(self.provider(), &qq, result)
    }
}
