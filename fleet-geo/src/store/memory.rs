//! In-memory store seeded from JSON.
//!
//! Serves trips, timesheets, and employees from a snapshot loaded at
//! startup. Useful for development and tests without a database.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::{
    DateRange, EmployeeId, EmployeeRecord, TenantId, TimesheetId, TimesheetRef, TripId,
    TripRecord, UserId,
};

use super::error::StoreError;
use super::repository::TripStore;

/// A timesheet together with the tenant that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantTimesheet {
    pub tenant_id: TenantId,
    #[serde(flatten)]
    pub timesheet: TimesheetRef,
}

/// Shape of a seed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSeed {
    #[serde(default)]
    pub trips: Vec<TripRecord>,
    #[serde(default)]
    pub timesheets: Vec<TenantTimesheet>,
    #[serde(default)]
    pub employees: Vec<EmployeeRecord>,
}

#[derive(Debug, Default)]
struct StoreData {
    trips: HashMap<TripId, TripRecord>,
    timesheets: Vec<TenantTimesheet>,
    employees: HashMap<(TenantId, EmployeeId), EmployeeRecord>,
}

/// In-memory [`TripStore`].
///
/// Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<StoreData>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from seed records.
    pub fn from_seed(seed: StoreSeed) -> Self {
        let data = StoreData {
            trips: seed.trips.into_iter().map(|t| (t.id.clone(), t)).collect(),
            timesheets: seed.timesheets,
            employees: seed
                .employees
                .into_iter()
                .map(|e| ((e.tenant_id.clone(), e.id.clone()), e))
                .collect(),
        };

        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Load a store from a JSON seed file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;

        let seed: StoreSeed = serde_json::from_str(&json).map_err(|e| StoreError::Json {
            message: format!("{}: {}", path.display(), e),
        })?;

        Ok(Self::from_seed(seed))
    }

    /// Add or replace a trip.
    pub async fn insert_trip(&self, trip: TripRecord) {
        let mut data = self.data.write().await;
        data.trips.insert(trip.id.clone(), trip);
    }

    /// Add a timesheet for a tenant.
    pub async fn insert_timesheet(&self, tenant: TenantId, timesheet: TimesheetRef) {
        let mut data = self.data.write().await;
        data.timesheets.push(TenantTimesheet {
            tenant_id: tenant,
            timesheet,
        });
    }

    /// Add or replace an employee mapping.
    pub async fn insert_employee(&self, employee: EmployeeRecord) {
        let mut data = self.data.write().await;
        data.employees
            .insert((employee.tenant_id.clone(), employee.id.clone()), employee);
    }

    /// Number of trips held.
    pub async fn trip_count(&self) -> usize {
        self.data.read().await.trips.len()
    }
}

impl TripStore for MemoryStore {
    async fn trip(&self, id: &TripId) -> Result<Option<TripRecord>, StoreError> {
        let data = self.data.read().await;
        Ok(data.trips.get(id).cloned())
    }

    async fn employee_user(
        &self,
        tenant: &TenantId,
        employee: &EmployeeId,
    ) -> Result<Option<UserId>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .employees
            .get(&(tenant.clone(), employee.clone()))
            .and_then(|e| e.user_id.clone()))
    }

    async fn timesheets_on(
        &self,
        tenant: &TenantId,
        date: NaiveDate,
        user: Option<&UserId>,
    ) -> Result<Vec<TimesheetRef>, StoreError> {
        let data = self.data.read().await;

        let mut sheets: Vec<TimesheetRef> = data
            .timesheets
            .iter()
            .filter(|t| &t.tenant_id == tenant)
            .map(|t| &t.timesheet)
            .filter(|t| t.start_time.date_naive() == date)
            .filter(|t| user.is_none_or(|u| &t.user_id == u))
            .cloned()
            .collect();

        sheets.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        Ok(sheets)
    }

    async fn trips(&self, tenant: &TenantId, range: DateRange) -> Result<Vec<TripRecord>, StoreError> {
        let data = self.data.read().await;

        let mut trips: Vec<TripRecord> = data
            .trips
            .values()
            .filter(|t| &t.tenant_id == tenant && range.contains(t.departure_time))
            .cloned()
            .collect();

        trips.sort_by(|a, b| {
            a.departure_time
                .cmp(&b.departure_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(trips)
    }

    async fn set_trip_timesheet(
        &self,
        trip: &TripId,
        timesheet: Option<&TimesheetId>,
    ) -> Result<(), StoreError> {
        let mut data = self.data.write().await;

        let record = data.trips.get_mut(trip).ok_or_else(|| StoreError::NotFound {
            kind: "trip",
            id: trip.to_string(),
        })?;
        record.timesheet_id = timesheet.cloned();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use std::io::Write;

    fn at(day: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, h, 0, 0).unwrap()
    }

    fn trip(id: &str, tenant: &str, day: u32, h: u32) -> TripRecord {
        TripRecord {
            id: id.into(),
            tenant_id: tenant.into(),
            employee_id: None,
            departure_time: at(day, h),
            arrival_time: at(day, h + 1),
            departure_postal: None,
            arrival_postal: None,
            timesheet_id: None,
            is_private: false,
        }
    }

    fn sheet(id: &str, user: &str, day: u32, h: u32) -> TimesheetRef {
        TimesheetRef {
            id: id.into(),
            user_id: user.into(),
            start_time: at(day, h),
            end_time: at(day, h + 8),
            location_start: None,
            location_end: None,
        }
    }

    #[tokio::test]
    async fn trips_are_tenant_scoped_and_chronological() {
        let store = MemoryStore::new();
        store.insert_trip(trip("b", "acme", 15, 14)).await;
        store.insert_trip(trip("a", "acme", 15, 9)).await;
        store.insert_trip(trip("c", "other", 15, 10)).await;

        let trips = store.trips(&"acme".into(), DateRange::all()).await.unwrap();
        let ids: Vec<&str> = trips.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn trips_respect_date_range() {
        let store = MemoryStore::new();
        store.insert_trip(trip("a", "acme", 14, 9)).await;
        store.insert_trip(trip("b", "acme", 15, 9)).await;
        store.insert_trip(trip("c", "acme", 16, 9)).await;

        let range = DateRange::new(Some(at(15, 0)), Some(at(15, 23)));
        let trips = store.trips(&"acme".into(), range).await.unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].id.as_str(), "b");
    }

    #[tokio::test]
    async fn timesheets_filter_by_day_tenant_and_user() {
        let store = MemoryStore::new();
        store.insert_timesheet("acme".into(), sheet("s2", "u1", 15, 13)).await;
        store.insert_timesheet("acme".into(), sheet("s1", "u1", 15, 8)).await;
        store.insert_timesheet("acme".into(), sheet("s3", "u2", 15, 8)).await;
        store.insert_timesheet("acme".into(), sheet("s4", "u1", 16, 8)).await;
        store.insert_timesheet("other".into(), sheet("s5", "u1", 15, 8)).await;

        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let all = store.timesheets_on(&"acme".into(), date, None).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["s1", "s3", "s2"]);

        let user = UserId::from("u1");
        let mine = store.timesheets_on(&"acme".into(), date, Some(&user)).await.unwrap();
        let ids: Vec<&str> = mine.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["s1", "s2"]);
    }

    #[tokio::test]
    async fn employee_mapping_is_tenant_scoped() {
        let store = MemoryStore::new();
        store
            .insert_employee(EmployeeRecord {
                id: "e1".into(),
                tenant_id: "acme".into(),
                user_id: Some("u1".into()),
            })
            .await;

        let found = store.employee_user(&"acme".into(), &"e1".into()).await.unwrap();
        assert_eq!(found, Some(UserId::from("u1")));
        assert!(store.employee_user(&"other".into(), &"e1".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_and_clear_timesheet_link() {
        let store = MemoryStore::new();
        store.insert_trip(trip("a", "acme", 15, 9)).await;

        let ts = TimesheetId::from("s1");
        store.set_trip_timesheet(&"a".into(), Some(&ts)).await.unwrap();
        let t = store.trip(&"a".into()).await.unwrap().unwrap();
        assert_eq!(t.timesheet_id, Some(ts));

        store.set_trip_timesheet(&"a".into(), None).await.unwrap();
        let t = store.trip(&"a".into()).await.unwrap().unwrap();
        assert!(t.timesheet_id.is_none());
    }

    #[tokio::test]
    async fn set_on_missing_trip_fails() {
        let store = MemoryStore::new();
        let err = store.set_trip_timesheet(&"nope".into(), None).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "trip", .. }));
    }

    #[tokio::test]
    async fn loads_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "trips": [{{
                    "id": "t1", "tenantId": "acme", "employeeId": "e1",
                    "departureTime": "2024-03-15T09:00:00Z",
                    "arrivalTime": "2024-03-15T09:30:00Z",
                    "departurePostal": "3511AX"
                }}],
                "timesheets": [{{
                    "tenantId": "acme", "id": "s1", "userId": "u1",
                    "startTime": "2024-03-15T09:00:00Z",
                    "endTime": "2024-03-15T17:00:00Z",
                    "locationStart": {{ "lat": 52.0907, "lng": 5.1214 }}
                }}],
                "employees": [{{ "id": "e1", "tenantId": "acme", "userId": "u1" }}]
            }}"#
        )
        .unwrap();

        let store = MemoryStore::from_json_file(file.path()).unwrap();
        assert_eq!(store.trip_count().await, 1);

        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let sheets = store.timesheets_on(&"acme".into(), date, None).await.unwrap();
        assert_eq!(sheets[0].location_start.unwrap().lat, 52.0907);
    }

    #[test]
    fn missing_seed_file_is_io_error() {
        let err = MemoryStore::from_json_file("/nonexistent/seed.json").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn invalid_seed_file_is_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = MemoryStore::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }
}
