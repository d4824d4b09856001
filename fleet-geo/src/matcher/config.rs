//! Matcher configuration.

use serde::Deserialize;

/// Weights and thresholds for trip/timesheet scoring.
///
/// The three weights sum to 1 by default, so a candidate that matches on
/// identity, time, and place scores exactly 1.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Weight of "timesheet belongs to the trip's driver".
    pub identity_weight: f64,

    /// Weight of the time-overlap signal.
    pub temporal_weight: f64,

    /// Weight of "trip departed near where the timesheet starts".
    pub spatial_weight: f64,

    /// Overlaps shorter than this (minutes) count as no overlap.
    pub min_overlap_mins: f64,

    /// Departure within this many metres of the timesheet start counts as near.
    pub proximity_radius_m: f64,

    /// Best candidates scoring below this are rejected.
    pub accept_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            identity_weight: 0.40,
            temporal_weight: 0.35,
            spatial_weight: 0.25,
            min_overlap_mins: 5.0,
            proximity_radius_m: 500.0,
            accept_threshold: 0.30,
        }
    }
}
