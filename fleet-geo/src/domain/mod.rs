//! Domain types for trip/timesheet reconciliation.
//!
//! Records arrive from the persistence layer as plain data; these types give
//! them typed identifiers and the handful of derived values the matcher
//! needs.

mod ids;
mod trip;

pub use ids::{EmployeeId, TenantId, TimesheetId, TripId, UserId};
pub use trip::{DateRange, EmployeeRecord, TimesheetRef, TripRecord, TripState};
