//! Geocoding providers.
//!
//! All providers implement [`Geocoder`]; one is selected by `geocoding.provider`
//! at start-up. Provider failures never reach the caller: after the last retry
//! the query resolves to an empty candidate list.

mod here;
mod nominatim;
mod photon;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::models::{Address, GeocodingResult};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::GeocodingConfig;

pub use here::HereGeocoder;
pub use nominatim::NominatimGeocoder;
pub use photon::PhotonGeocoder;

/// Max candidates requested from a provider.
pub const CANDIDATE_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider answered with status {0}")]
    Status(u16),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Unknown geocoding provider: {0}")]
    UnknownProvider(String),
}

/// Resolves postal addresses to coordinate candidates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Provider name stored in `geocoding_info`.
    fn provider(&self) -> &'static str;

    /// Human readable form of what is sent for `address`.
    fn describe(&self, address: &Address) -> String;

    /// Candidates in provider order; empty when nothing was found or the provider failed.
    async fn query(&self, address: &Address) -> GeocodingResult;
}

/// Retry settings for provider calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl From<&GeocodingConfig> for RetryPolicy {
    fn from(config: &GeocodingConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff_ms: config.initial_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
        }
    }
}

fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}

/// Exponential backoff plus up to 50% jitter.
fn calculate_backoff(attempt: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Duration {
    let mut backoff = initial_backoff_ms;
    for _ in 0..attempt {
        backoff = backoff.saturating_mul(2);
        if backoff >= max_backoff_ms {
            backoff = max_backoff_ms;
            break;
        }
    }
    let jitter_max = std::cmp::max(backoff / 2, 1);
    let jitter = rand::thread_rng().gen_range(0..jitter_max);
    Duration::from_millis(backoff + jitter)
}

/// HTTP plumbing shared by the providers: throttling, retries, JSON decoding.
pub struct ProviderHttp {
    client: reqwest::Client,
    retry: RetryPolicy,
    throttle: Option<Arc<DefaultDirectRateLimiter>>,
    #[cfg(test)]
    no_sleep: bool,
}

impl ProviderHttp {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodingError::Client(e.to_string()))?;

        let throttle = Quota::with_period(Duration::from_millis(config.throttle_ms))
            .map(|quota| Arc::new(RateLimiter::direct(quota.allow_burst(NonZeroU32::MIN))));

        Ok(Self {
            client,
            retry: RetryPolicy::from(config),
            throttle,
            #[cfg(test)]
            no_sleep: false,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(max_attempts: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            retry: RetryPolicy {
                max_attempts,
                initial_backoff_ms: 1,
                max_backoff_ms: 2,
            },
            throttle: None,
            no_sleep: true,
        }
    }

    async fn do_sleep(&self, duration: Duration) {
        #[cfg(test)]
        {
            if self.no_sleep {
                return;
            }
        }
        tokio::time::sleep(duration).await;
    }

    /// GETs `url` with `params` and decodes the JSON body, retrying transient failures.
    pub async fn get_json(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, GeocodingError> {
        let max_attempts = self.retry.max_attempts;
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let delay = calculate_backoff(
                    attempt - 1,
                    self.retry.initial_backoff_ms,
                    self.retry.max_backoff_ms,
                );
                warn!(
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "Retrying geocoding request"
                );
                self.do_sleep(delay).await;
            }

            if let Some(throttle) = &self.throttle {
                throttle.until_ready().await;
            }

            let response = match self.client.get(url).query(params).send().await {
                Ok(response) => response,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status().as_u16();
            if is_retryable_status(status) {
                last_error = format!("status {}", status);
                continue;
            }
            if !response.status().is_success() {
                return Err(GeocodingError::Status(status));
            }

            return response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| GeocodingError::Decode(e.to_string()));
        }

        Err(GeocodingError::RetriesExhausted {
            attempts: max_attempts,
            last_error,
        })
    }
}

/// Logs a provider failure and degrades it to "nothing found".
pub(crate) fn degrade(
    provider: &'static str,
    query: &str,
    result: Result<GeocodingResult, GeocodingError>,
) -> GeocodingResult {
    match result {
        Ok(result) => {
            debug!(provider, query, count = result.count, "Geocoding finished");
            result
        }
        Err(e) => {
            warn!(provider, query, error = %e, "Geocoding failed, treating as no result");
            GeocodingResult::empty()
        }
    }
}

/// Non-empty address parts joined for free-text providers, e.g.
/// `Treskowallee 8, 10318 Berlin, Deutschland`.
pub(crate) fn free_text(address: &Address, country: &str) -> String {
    let locality = [address.post_code.as_deref(), address.city.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    [
        address.street_line(),
        Some(locality).filter(|l| !l.is_empty()),
        Some(country.to_string()).filter(|c| !c.is_empty()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ")
}

/// Builds the provider selected by configuration.
pub fn build_geocoder(config: &GeocodingConfig) -> Result<Arc<dyn Geocoder>, GeocodingError> {
    let http = ProviderHttp::new(config)?;
    let geocoder: Arc<dyn Geocoder> = match config.provider.as_str() {
        "photon" => Arc::new(PhotonGeocoder::new(http, &config.base_url, &config.country)),
        "here" => Arc::new(HereGeocoder::new(
            http,
            &config.base_url,
            &config.api_key,
            &config.country,
        )),
        "nominatim" => Arc::new(NominatimGeocoder::new(http, &config.base_url, &config.country)),
        other => return Err(GeocodingError::UnknownProvider(other.to_string())),
    };
    Ok(geocoder)
}

#[cfg(test)]
pub(crate) fn test_address() -> Address {
    Address {
        street1: Some("Treskowallee".to_string()),
        street2: Some("Hinterhaus".to_string()),
        house_number: Some("8".to_string()),
        post_code: Some("10318".to_string()),
        city: Some("Berlin".to_string()),
    }
}
