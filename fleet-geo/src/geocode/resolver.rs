//! Geocode resolution with caching and provider fallback.
//!
//! Postal codes: cache → PDOK → prefix table → interpolation. The last step
//! always produces a point, so a well-formed postal code never comes back
//! empty.
//!
//! Addresses: cache → PDOK → Nominatim. The prefix table can't represent an
//! address, so there's no offline fallback.
//!
//! Any result is written back to the cache before it's returned.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheKey, GeoCache};
use crate::geo::{GeoLocation, PostalCode, postal};

use super::nominatim::NominatimClient;
use super::pdok::PdokClient;
use super::provider::{Geocoder, QueryKind};

/// Resolves postal codes and addresses to locations.
///
/// Generic over the two remote providers so tests can substitute them; in
/// production these are [`PdokClient`] and [`NominatimClient`].
pub struct GeocodeResolver<G = PdokClient, O = NominatimClient> {
    cache: Arc<GeoCache>,
    government: G,
    osm: O,
}

impl<G: Geocoder, O: Geocoder> GeocodeResolver<G, O> {
    /// Create a resolver over a shared cache.
    pub fn new(cache: Arc<GeoCache>, government: G, osm: O) -> Self {
        Self {
            cache,
            government,
            osm,
        }
    }

    /// The cache this resolver reads and fills.
    pub fn cache(&self) -> &Arc<GeoCache> {
        &self.cache
    }

    /// Resolve free-form input, auto-detecting postal codes.
    ///
    /// Input that parses as a Dutch postal code takes the postal path;
    /// anything else is treated as an address. Blank input returns `None`
    /// without touching the cache or the network.
    pub async fn geocode(&self, input: &str) -> Option<GeoLocation> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        match PostalCode::parse(input) {
            Ok(code) => Some(self.resolve_postal(&code).await),
            Err(_) => self.geocode_address(input).await,
        }
    }

    /// Resolve a postal code. Returns `None` only if `code` isn't one.
    pub async fn geocode_postal_code(&self, code: &str) -> Option<GeoLocation> {
        match PostalCode::parse(code) {
            Ok(code) => Some(self.resolve_postal(&code).await),
            Err(e) => {
                debug!(input = code, error = %e, "not a postal code");
                None
            }
        }
    }

    /// Resolve a free-form address.
    pub async fn geocode_address(&self, address: &str) -> Option<GeoLocation> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }

        let key = CacheKey::address(address);
        if let Some(hit) = self.cache.get(&key) {
            return Some(hit);
        }

        let location = match self.government.geocode(address, QueryKind::Address).await {
            Some(location) => location,
            None => {
                debug!(
                    from = self.government.name(),
                    to = self.osm.name(),
                    "falling back to next provider"
                );
                self.osm.geocode(address, QueryKind::Address).await?
            }
        };

        self.cache.set(key, location.clone());
        Some(location)
    }

    async fn resolve_postal(&self, code: &PostalCode) -> GeoLocation {
        let canonical = code.to_string();
        let key = CacheKey::postal(&canonical);

        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let location = match self.government.geocode(&canonical, QueryKind::Postal).await {
            Some(location) => location,
            None => {
                debug!(code = %canonical, "using offline postal approximation");
                postal::approximate(code)
            }
        };

        self.cache.set(key, location.clone());
        location
    }
}
