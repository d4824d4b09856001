//! Nominatim client (public OpenStreetMap geocoder).
//!
//! Used for addresses PDOK doesn't know. The public instance's usage
//! policy allows at most one request per second and requires an
//! identifying User-Agent, so every call goes through a shared
//! [`RateLimiter`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::geo::{GeoLocation, Source};

use super::error::ProviderError;
use super::provider::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, Geocoder, QueryKind};
use super::rate_limit::RateLimiter;
use super::types::{NominatimPlace, classify_nominatim};

/// Default base URL for the public Nominatim instance.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Fair-use spacing between requests.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
    /// Minimum time between consecutive requests
    pub min_interval: Duration,
    /// ISO country filter
    pub country_codes: String,
}

impl NominatimConfig {
    /// Set a custom base URL (for testing or a self-hosted instance).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the minimum spacing between requests.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_interval: DEFAULT_MIN_INTERVAL,
            country_codes: "nl".to_string(),
        }
    }
}

/// Client for a Nominatim search endpoint.
///
/// Clones share the rate limiter.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
    country_codes: String,
    limiter: Arc<RateLimiter>,
}

impl NominatimClient {
    /// Create a new Nominatim client.
    pub fn new(config: NominatimConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_codes: config.country_codes,
            limiter: Arc::new(RateLimiter::new(config.min_interval)),
        })
    }

    async fn search(&self, query: &str, kind: QueryKind) -> Result<Option<GeoLocation>, ProviderError> {
        let url = format!("{}/search", self.base_url);

        let query_param = match kind {
            QueryKind::Postal => "postalcode",
            QueryKind::Address => "q",
        };
        let params = [
            (query_param, query),
            ("format", "json"),
            ("countrycodes", self.country_codes.as_str()),
            ("limit", "1"),
        ];

        self.limiter.acquire().await;
        let response = self.http.get(&url).query(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        let places: Vec<NominatimPlace> =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed {
                message: e.to_string(),
            })?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let (lat, lng) = match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
            (Ok(lat), Ok(lng)) if lat.is_finite() && lng.is_finite() => (lat, lng),
            _ => {
                return Err(ProviderError::Malformed {
                    message: format!("unusable coordinates: {:?}, {:?}", place.lat, place.lon),
                });
            }
        };

        let accuracy = classify_nominatim(place.addresstype.as_deref().or(place.kind.as_deref()));
        let mut location = GeoLocation::new(lat, lng, accuracy, Source::Nominatim);
        location.address = place.display_name;
        Ok(Some(location))
    }
}

impl Geocoder for NominatimClient {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn geocode(&self, query: &str, kind: QueryKind) -> Option<GeoLocation> {
        match self.search(query, kind).await {
            Ok(Some(location)) => Some(location),
            Ok(None) => {
                debug!(provider = "nominatim", %kind, query, "no results");
                None
            }
            Err(e) => {
                warn!(provider = "nominatim", %kind, query, error = %e, "geocoding failed");
                None
            }
        }
    }
}
