//! Typed record identifiers.
//!
//! The store hands out opaque string ids for every record kind. Wrapping
//! each in its own type keeps a trip id from being passed where a
//! timesheet id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifies a telemetry trip.
    TripId
);
string_id!(
    /// Identifies a timesheet entry.
    TimesheetId
);
string_id!(
    /// Identifies a tenant (customer organisation).
    TenantId
);
string_id!(
    /// Identifies an application user.
    UserId
);
string_id!(
    /// Identifies an employee record, which may or may not map to a user.
    EmployeeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_debug() {
        let id = TripId::new("trip-1");
        assert_eq!(id.to_string(), "trip-1");
        assert_eq!(format!("{id:?}"), "TripId(trip-1)");
        assert_eq!(id.as_str(), "trip-1");
    }

    #[test]
    fn serde_is_transparent() {
        let id: TimesheetId = serde_json::from_str("\"ts-9\"").unwrap();
        assert_eq!(id, TimesheetId::from("ts-9"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ts-9\"");
    }
}
