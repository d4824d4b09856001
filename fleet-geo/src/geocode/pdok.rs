//! PDOK locatieserver client (Dutch government geocoder).
//!
//! Free-text search over the national address and place registry. Fast,
//! authoritative for the Netherlands, and without a client-side rate
//! limit. Coordinates come back as a WKT point string.

use std::time::Duration;

use tracing::{debug, warn};

use crate::geo::{GeoLocation, Source};

use super::error::ProviderError;
use super::provider::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, Geocoder, QueryKind};
use super::types::{PdokResponse, classify_pdok, parse_wkt_point};

/// Default base URL for the locatieserver search API.
const DEFAULT_BASE_URL: &str = "https://api.pdok.nl/bzk/locatieserver/search/v3_1";

/// Configuration for the PDOK client.
#[derive(Debug, Clone)]
pub struct PdokConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
}

impl PdokConfig {
    /// Set a custom base URL (for testing).
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
}

impl Default for PdokConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Client for the PDOK locatieserver.
#[derive(Debug, Clone)]
pub struct PdokClient {
    http: reqwest::Client,
    base_url: String,
}

impl PdokClient {
    /// Create a new PDOK client.
    pub fn new(config: PdokConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Run one search and convert the best hit.
    async fn search(&self, query: &str, kind: QueryKind) -> Result<Option<GeoLocation>, ProviderError> {
        let url = format!("{}/free", self.base_url);

        let mut params = vec![
            ("rows", "1".to_string()),
            ("fl", "centroide_ll,type,weergavenaam".to_string()),
        ];
        match kind {
            QueryKind::Postal => {
                params.push(("q", format!("postcode:{query}")));
                params.push(("fq", "type:postcode".to_string()));
            }
            QueryKind::Address => params.push(("q", query.to_string())),
        }

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
        let parsed: PdokResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed {
                message: e.to_string(),
            })?;

        let Some(doc) = parsed.response.docs.into_iter().next() else {
            return Ok(None);
        };

        let (lat, lng) = doc
            .centroide_ll
            .as_deref()
            .and_then(parse_wkt_point)
            .ok_or_else(|| ProviderError::Malformed {
                message: format!("unusable centroide_ll: {:?}", doc.centroide_ll),
            })?;

        let mut location = GeoLocation::new(lat, lng, classify_pdok(doc.kind.as_deref()), Source::Pdok);
        location.address = doc.weergavenaam;
        Ok(Some(location))
    }
}

impl Geocoder for PdokClient {
    fn name(&self) -> &'static str {
        "pdok"
    }

    async fn geocode(&self, query: &str, kind: QueryKind) -> Option<GeoLocation> {
        match self.search(query, kind).await {
            Ok(Some(location)) => Some(location),
            Ok(None) => {
                debug!(provider = "pdok", %kind, query, "no results");
                None
            }
            Err(e) => {
                warn!(provider = "pdok", %kind, query, error = %e, "geocoding failed");
                None
            }
        }
    }
}
