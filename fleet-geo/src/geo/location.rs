//! Resolved location value type.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// How precisely a location pins down the queried place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    /// A building or street address.
    Exact,
    /// A postcode, street, or town centroid.
    Approximate,
    /// A coarse regional estimate.
    Region,
}

/// Where a location came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Served from the in-process geocode cache.
    Cache,
    /// PDOK locatieserver (Dutch government geocoder).
    Pdok,
    /// Nominatim (public OpenStreetMap geocoder).
    Nominatim,
    /// The embedded postal-prefix table or its interpolation fallback.
    LookupTable,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Cache => "cache",
            Source::Pdok => "pdok",
            Source::Nominatim => "nominatim",
            Source::LookupTable => "lookup_table",
        };
        f.write_str(name)
    }
}

/// A geocoding result.
///
/// Every resolution path returns one of these; the cache hands out copies
/// with `source` rewritten to [`Source::Cache`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Accuracy,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl GeoLocation {
    pub fn new(lat: f64, lng: f64, accuracy: Accuracy, source: Source) -> Self {
        Self {
            lat,
            lng,
            accuracy,
            source,
            address: None,
        }
    }

    /// Attach a display address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Copy of this location attributed to a different source.
    pub fn with_source(&self, source: Source) -> Self {
        Self {
            source,
            ..self.clone()
        }
    }

    /// The bare coordinate pair.
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}
