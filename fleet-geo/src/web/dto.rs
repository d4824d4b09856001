//! Data transfer objects for web requests and responses.
//!
//! Geocode results, match results, and stats are serialized directly from
//! their domain types; only query strings and small envelopes live here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DateRange;
use crate::geo::GeoPoint;

/// Free-form geocode query (`?q=`).
#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    /// Postal code or address
    #[serde(default)]
    pub q: String,
}

/// Postal code query (`?code=`).
#[derive(Debug, Deserialize)]
pub struct PostalQuery {
    #[serde(default)]
    pub code: String,
}

/// Two points and an optional radius.
#[derive(Debug, Deserialize)]
pub struct DistanceQuery {
    pub from_lat: f64,
    pub from_lng: f64,
    pub to_lat: f64,
    pub to_lng: f64,

    /// If given, also report whether the points are within this many metres
    pub radius: Option<f64>,
}

impl DistanceQuery {
    /// Validate coordinates and radius, returning the two points.
    pub fn points(&self) -> Result<(GeoPoint, GeoPoint), String> {
        let from = checked_point("from", self.from_lat, self.from_lng)?;
        let to = checked_point("to", self.to_lat, self.to_lng)?;

        match self.radius {
            Some(radius) if !(radius.is_finite() && radius >= 0.0) => {
                Err(format!("Invalid radius: {radius}"))
            }
            _ => Ok((from, to)),
        }
    }
}

fn checked_point(label: &str, lat: f64, lng: f64) -> Result<GeoPoint, String> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("Invalid {label} coordinates: {lat}, {lng}"));
    }
    Ok(GeoPoint::new(lat, lng))
}

/// Response for `/distance`.
#[derive(Debug, Serialize)]
pub struct DistanceResponse {
    /// Great-circle distance in metres
    pub distance_m: f64,

    /// Present when a radius was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub within_radius: Option<bool>,
}

/// Optional departure-time window (`?date_from=&date_to=`), RFC 3339.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl RangeQuery {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.date_from, self.date_to)
    }
}

/// Response for `/cache/cleanup`.
#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    /// Expired entries removed
    pub removed: usize,
}

/// Response for clearing a tenant's matches.
#[derive(Debug, Serialize)]
pub struct ClearMatchesResponse {
    /// Trips unlinked from their timesheet
    pub cleared: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
