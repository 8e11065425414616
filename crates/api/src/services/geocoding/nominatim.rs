//! Nominatim structured search with `format=geojson`.

use async_trait::async_trait;
use domain::models::{Address, AddressCandidate, Coordinates, GeocodingResult};
use serde_json::Value;

use super::{degrade, Geocoder, GeocodingError, ProviderHttp, CANDIDATE_LIMIT};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

pub struct NominatimGeocoder {
    http: ProviderHttp,
    base_url: String,
    country: String,
}

impl NominatimGeocoder {
    pub fn new(http: ProviderHttp, base_url: &str, country: &str) -> Self {
        let base_url = if base_url.is_empty() { DEFAULT_BASE_URL } else { base_url };
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            country: country.to_string(),
        }
    }

    fn params(&self, address: &Address) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = [
            ("street", address.street_line()),
            ("postalcode", address.post_code.clone()),
            ("city", address.city.clone()),
            ("country", Some(self.country.clone()).filter(|c| !c.is_empty())),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();
        params.push(("format", "geojson".to_string()));
        params.push(("addressdetails", "1".to_string()));
        params.push(("limit", CANDIDATE_LIMIT.to_string()));
        params
    }

    async fn fetch(&self, address: &Address) -> Result<GeocodingResult, GeocodingError> {
        let url = format!("{}/search", self.base_url);
        let body = self.http.get_json(&url, &self.params(address)).await?;
        parse_features(&body)
    }
}

fn parse_features(body: &Value) -> Result<GeocodingResult, GeocodingError> {
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
            Some(AddressCandidate {
                coordinates: Coordinates::new(lat, lng),
                postal_code: properties["address"]["postcode"].as_str().map(str::to_string),
                distance: None,
                label: properties["display_name"].as_str().map(str::to_string),
                raw: feature.clone(),
            })
        })
        .collect();

    Ok(GeocodingResult::new(candidates))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn provider(&self) -> &'static str {
        "nominatim"
    }

    fn describe(&self, address: &Address) -> String {
        self.params(address)
            .iter()
            .take_while(|(key, _)| *key != "format")
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&")
    }

    async fn query(&self, address: &Address) -> GeocodingResult {
        let result = self.fetch(address).await;
        degrade(self.provider(), &self.describe(address), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::geocoding::test_address;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_describe_lists_present_fields() {
        let geocoder = NominatimGeocoder::new(ProviderHttp::for_tests(1), "", "");
        assert_eq!(
            geocoder.describe(&test_address()),
            "street=Treskowallee 8&postalcode=10318&city=Berlin"
        );
    }

    #[tokio::test]
    async fn test_query_structured_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("street", "Treskowallee 8"))
            .and(query_param("postalcode", "10318"))
            .and(query_param("country", "Deutschland"))
            .and(query_param("format", "geojson"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [13.5262, 52.4931]},
                    "properties": {
                        "display_name": "8, Treskowallee, Karlshorst, Berlin, 10318, Deutschland",
                        "address": {"postcode": "10318"}
                    }
                }]
            })))
            .mount(&server)
            .await;

        let geocoder = NominatimGeocoder::new(ProviderHttp::for_tests(1), &server.uri(), "Deutschland");
        let result = geocoder.query(&test_address()).await;

        assert_eq!(result.count, 1);
        assert_eq!(result.candidates[0].coordinates.lat, 52.4931);
        assert_eq!(result.candidates[0].postal_code.as_deref(), Some("10318"));
    }
}
