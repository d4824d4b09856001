//! Trip and timesheet records as seen by the matcher.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, PostalCode, postal};

use super::ids::{EmployeeId, TenantId, TimesheetId, TripId, UserId};

/// A journey recorded by vehicle telemetry.
///
/// Created by the ingestion side; the matcher only ever changes
/// `timesheet_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    pub id: TripId,
    pub tenant_id: TenantId,
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    /// Raw postal code reported for the departure point.
    #[serde(default)]
    pub departure_postal: Option<String>,
    #[serde(default)]
    pub arrival_postal: Option<String>,
    #[serde(default)]
    pub timesheet_id: Option<TimesheetId>,
    #[serde(default)]
    pub is_private: bool,
}

/// Where a trip stands with respect to matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TripState {
    Unmatched,
    Matched,
    /// Never scored and never linked.
    Private,
}

impl TripRecord {
    pub fn state(&self) -> TripState {
        if self.is_private {
            TripState::Private
        } else if self.timesheet_id.is_some() {
            TripState::Matched
        } else {
            TripState::Unmatched
        }
    }

    /// Trip length in minutes; zero if the timestamps are inverted.
    pub fn duration_minutes(&self) -> f64 {
        let secs = (self.arrival_time - self.departure_time).num_seconds().max(0);
        secs as f64 / 60.0
    }

    /// Calendar day (UTC) the trip departed on.
    pub fn departure_date(&self) -> NaiveDate {
        self.departure_time.date_naive()
    }

    /// Approximate departure point, derived from the departure postal code.
    ///
    /// `None` if the trip has no postal code or it doesn't parse.
    pub fn departure_point(&self) -> Option<GeoPoint> {
        let code = PostalCode::parse(self.departure_postal.as_deref()?).ok()?;
        Some(postal::approximate(&code).point())
    }
}

/// Read-only view of a timesheet entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetRef {
    pub id: TimesheetId,
    pub user_id: UserId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub location_start: Option<GeoPoint>,
    #[serde(default)]
    pub location_end: Option<GeoPoint>,
}

/// Maps an employee (as known to the telemetry side) to a user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub id: EmployeeId,
    pub tenant_id: TenantId,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Optional inclusive bounds on a timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// Unbounded on both sides.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| t >= from) && self.to.is_none_or(|to| t <= to)
    }
}
