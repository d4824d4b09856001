//! Confidence scoring of a trip against candidate timesheets.
//!
//! Three independent signals, each either on or off (the temporal one is
//! proportional), combined as a weighted sum:
//! 1. Identity: the timesheet belongs to the trip's driver
//! 2. Temporal: the trip falls inside the timesheet's hours
//! 3. Spatial: the trip departed near where the timesheet starts

use crate::domain::{TimesheetRef, TripRecord, UserId};
use crate::geo::{GeoPoint, overlap_minutes, within_radius};

use super::config::MatchConfig;

/// Per-candidate score and the signals behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    /// Weighted sum, always within `[0, 1]`.
    pub confidence: f64,
    pub same_user: bool,
    pub overlap_mins: f64,
    /// Share of the trip covered by the timesheet, `[0, 1]`; zero below the
    /// minimum overlap.
    pub time_coverage: f64,
    pub near_start: bool,
}

impl Score {
    /// Human-readable summary of the signals that fired.
    pub fn reason(&self, config: &MatchConfig) -> String {
        let mut parts = Vec::new();

        if self.same_user {
            parts.push("same employee".to_string());
        }
        if self.time_coverage > 0.0 {
            parts.push(format!("{:.0} min overlap", self.overlap_mins));
        }
        if self.near_start {
            parts.push(format!(
                "departed within {:.0} m of timesheet start",
                config.proximity_radius_m
            ));
        }

        if parts.is_empty() {
            "no signals".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Score one candidate.
///
/// `trip_user` is the user the trip's employee maps to, if known;
/// `departure` the trip's approximate departure point, if known.
pub fn score_candidate(
    trip: &TripRecord,
    trip_user: Option<&UserId>,
    departure: Option<GeoPoint>,
    sheet: &TimesheetRef,
    config: &MatchConfig,
) -> Score {
    let same_user = trip_user.is_some_and(|u| u == &sheet.user_id);

    let overlap_mins = overlap_minutes(
        trip.departure_time,
        trip.arrival_time,
        sheet.start_time,
        sheet.end_time,
    );
    let trip_mins = trip.duration_minutes();
    let time_coverage = if overlap_mins >= config.min_overlap_mins && trip_mins > 0.0 {
        (overlap_mins / trip_mins).min(1.0)
    } else {
        0.0
    };

    let near_start = match (departure, sheet.location_start) {
        (Some(dep), Some(start)) => within_radius(dep, start, config.proximity_radius_m),
        _ => false,
    };

    let mut confidence = 0.0;
    if same_user {
        confidence += config.identity_weight;
    }
    confidence += config.temporal_weight * time_coverage;
    if near_start {
        confidence += config.spatial_weight;
    }

    Score {
        confidence: confidence.clamp(0.0, 1.0),
        same_user,
        overlap_mins,
        time_coverage,
        near_start,
    }
}

/// Pick the highest-scoring candidate.
///
/// Ties go to the earliest candidate in `sheets`, so the result is stable
/// for a stable candidate order.
pub fn best_candidate<'a>(
    trip: &TripRecord,
    trip_user: Option<&UserId>,
    sheets: &'a [TimesheetRef],
    config: &MatchConfig,
) -> Option<(&'a TimesheetRef, Score)> {
    let departure = trip.departure_point();
    let mut best: Option<(&TimesheetRef, Score)> = None;

    for sheet in sheets {
        let score = score_candidate(trip, trip_user, departure, sheet, config);
        if best
            .as_ref()
            .is_none_or(|(_, top)| score.confidence > top.confidence)
        {
            best = Some((sheet, score));
        }
    }

    best
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
    }

    fn arb_trip() -> impl Strategy<Value = TripRecord> {
        (0i64..1440, 0i64..240, 1000u16..9999).prop_map(|(start, len, code)| TripRecord {
            id: "t".into(),
            tenant_id: "acme".into(),
            employee_id: None,
            departure_time: base() + Duration::minutes(start),
            arrival_time: base() + Duration::minutes(start + len),
            departure_postal: Some(code.to_string()),
            arrival_postal: None,
            timesheet_id: None,
            is_private: false,
        })
    }

    fn arb_sheet() -> impl Strategy<Value = TimesheetRef> {
        (
            0i64..1440,
            0i64..720,
            prop::sample::select(vec!["u1", "u2"]),
            prop::option::of((50.75f64..53.55, 3.36f64..7.23)),
        )
            .prop_map(|(start, len, user, loc)| TimesheetRef {
                id: format!("s{start}").into(),
                user_id: user.into(),
                start_time: base() + Duration::minutes(start),
                end_time: base() + Duration::minutes(start + len),
                location_start: loc.map(|(lat, lng)| GeoPoint::new(lat, lng)),
                location_end: None,
            })
    }

    proptest! {
        #[test]
        fn confidence_is_bounded(
            trip in arb_trip(),
            sheet in arb_sheet(),
            known_user in any::<bool>(),
        ) {
            let config = MatchConfig::default();
            let user = UserId::from("u1");
            let trip_user = known_user.then_some(&user);

            let score = score_candidate(&trip, trip_user, trip.departure_point(), &sheet, &config);
            prop_assert!((0.0..=1.0).contains(&score.confidence));
            prop_assert!((0.0..=1.0).contains(&score.time_coverage));
        }

        #[test]
        fn best_is_maximal(
            trip in arb_trip(),
            sheets in prop::collection::vec(arb_sheet(), 1..8),
        ) {
            let config = MatchConfig::default();
            let user = UserId::from("u2");
            let (_, best) = best_candidate(&trip, Some(&user), &sheets, &config).unwrap();

            for sheet in &sheets {
                let s = score_candidate(&trip, Some(&user), trip.departure_point(), sheet, &config);
                prop_assert!(s.confidence <= best.confidence);
            }
        }
    }
}
