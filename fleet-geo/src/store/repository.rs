//! The persistence seam used by the matcher.

use std::future::Future;

use chrono::NaiveDate;

use crate::domain::{
    DateRange, EmployeeId, TenantId, TimesheetId, TimesheetRef, TripId, TripRecord, UserId,
};

use super::error::StoreError;

/// Tenant-scoped access to trips, timesheets, and the employee→user mapping.
///
/// This abstraction lets the matcher run against the relational store in
/// production and against [`MemoryStore`](super::MemoryStore) in tests.
pub trait TripStore {
    /// Fetch one trip by id.
    fn trip(&self, id: &TripId) -> impl Future<Output = Result<Option<TripRecord>, StoreError>> + Send;

    /// The user an employee record maps to, if any.
    fn employee_user(
        &self,
        tenant: &TenantId,
        employee: &EmployeeId,
    ) -> impl Future<Output = Result<Option<UserId>, StoreError>> + Send;

    /// Timesheets of `tenant` starting on `date`, optionally only `user`'s.
    ///
    /// Ordered by start time, then id.
    fn timesheets_on(
        &self,
        tenant: &TenantId,
        date: NaiveDate,
        user: Option<&UserId>,
    ) -> impl Future<Output = Result<Vec<TimesheetRef>, StoreError>> + Send;

    /// All trips of `tenant` departing within `range`, oldest first.
    fn trips(
        &self,
        tenant: &TenantId,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<TripRecord>, StoreError>> + Send;

    /// Link a trip to a timesheet, or unlink it with `None`.
    fn set_trip_timesheet(
        &self,
        trip: &TripId,
        timesheet: Option<&TimesheetId>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
