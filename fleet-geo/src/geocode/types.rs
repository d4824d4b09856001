//! Provider response DTOs.
//!
//! These types map directly to the JSON the providers return, plus the
//! per-provider translation of place types onto [`Accuracy`].

use serde::Deserialize;

use crate::geo::Accuracy;

/// PDOK locatieserver `/free` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct PdokResponse {
    pub response: PdokDocs,
}

/// The `response` object of a PDOK answer. Only the first row is requested.
#[derive(Debug, Clone, Deserialize)]
pub struct PdokDocs {
    #[serde(default)]
    pub docs: Vec<PdokDoc>,
}

/// A single PDOK search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct PdokDoc {
    /// WGS84 centroid as WKT, e.g. `POINT(4.89 52.37)` (longitude first).
    pub centroide_ll: Option<String>,

    /// Place type: `adres`, `postcode`, `weg`, `woonplaats`, `gemeente`, ...
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Human-readable label.
    pub weergavenaam: Option<String>,
}

/// A single Nominatim search hit. Coordinates arrive as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    pub display_name: Option<String>,

    /// Coarse address category (`house`, `road`, `city`, ...).
    pub addresstype: Option<String>,

    /// OSM feature type; used when `addresstype` is missing.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Parse a WKT `POINT(lng lat)` string into `(lat, lng)`.
///
/// Returns `None` for anything that isn't a well-formed finite point.
pub fn parse_wkt_point(wkt: &str) -> Option<(f64, f64)> {
    let inner = wkt
        .trim()
        .strip_prefix("POINT")?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;

    let mut parts = inner.split_whitespace();
    let lng: f64 = parts.next()?.parse().ok()?;
    let lat: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !lat.is_finite() || !lng.is_finite() {
        return None;
    }

    Some((lat, lng))
}

/// Map a PDOK place type onto the accuracy scale.
pub fn classify_pdok(kind: Option<&str>) -> Accuracy {
    match kind {
        Some("adres") => Accuracy::Exact,
        Some("postcode" | "weg" | "woonplaats") => Accuracy::Approximate,
        _ => Accuracy::Region,
    }
}

/// Map a Nominatim address/feature type onto the accuracy scale.
pub fn classify_nominatim(kind: Option<&str>) -> Accuracy {
    match kind {
        Some("house" | "building" | "residential" | "house_number") => Accuracy::Exact,
        Some(
            "postcode" | "road" | "street" | "city" | "town" | "village" | "suburb"
            | "neighbourhood",
        ) => Accuracy::Approximate,
        _ => Accuracy::Region,
    }
}
