//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::GeoCache;
use crate::geocode::GeocodeResolver;
use crate::matcher::Matcher;
use crate::store::MemoryStore;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Geocoder with its cache and provider chain
    pub geocoder: Arc<GeocodeResolver>,

    /// Trip/timesheet matcher over the store
    pub matcher: Arc<Matcher<MemoryStore>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(geocoder: GeocodeResolver, matcher: Matcher<MemoryStore>) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
            matcher: Arc::new(matcher),
        }
    }

    /// The geocode cache shared with the cleanup task.
    pub fn cache(&self) -> &Arc<GeoCache> {
        self.geocoder.cache()
    }
}
