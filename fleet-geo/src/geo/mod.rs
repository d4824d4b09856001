//! Geometric and temporal primitives.
//!
//! Pure functions with no state: great-circle distance between two points
//! and the overlap between two time ranges. Everything else in the crate
//! that reasons about "near" or "at the same time" goes through here.

mod location;
pub mod postal;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use location::{Accuracy, GeoLocation, Source};
pub use postal::{InvalidPostalCode, PostalCode};

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A bare latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance between two points in metres (Haversine).
///
/// # Examples
///
/// ```
/// use fleet_geo::geo::{GeoPoint, distance};
///
/// let amsterdam = GeoPoint::new(52.3676, 4.9041);
/// let rotterdam = GeoPoint::new(51.9244, 4.4777);
/// let km = distance(amsterdam, rotterdam) / 1000.0;
/// assert!((km - 57.0).abs() < 2.0);
/// ```
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    // Rounding can push h a hair past 1 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_M * c
}

/// Returns true if `b` lies within `radius_m` metres of `a`.
pub fn within_radius(a: GeoPoint, b: GeoPoint, radius_m: f64) -> bool {
    distance(a, b) <= radius_m
}

/// Minutes during which two time ranges overlap.
///
/// Returns zero when the ranges do not intersect (or merely touch).
pub fn overlap_minutes(
    start_a: DateTime<Utc>,
    end_a: DateTime<Utc>,
    start_b: DateTime<Utc>,
    end_b: DateTime<Utc>,
) -> f64 {
    let start = start_a.max(start_b);
    let end = end_a.min(end_b);

    if end <= start {
        return 0.0;
    }

    (end - start).num_seconds() as f64 / 60.0
}
