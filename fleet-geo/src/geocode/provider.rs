//! The seam between the resolver and individual geocoding services.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::geo::GeoLocation;

/// Hard per-request timeout for provider calls.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sent with every provider request; both services ask clients to identify themselves.
pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!("fleet-geo/", env!("CARGO_PKG_VERSION"), " (trip-timesheet reconciliation)");

/// What kind of text is being geocoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// A canonical Dutch postal code (`1011AB` or `1011`).
    Postal,
    /// Free-form address or place name.
    Address,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::Postal => f.write_str("postal"),
            QueryKind::Address => f.write_str("address"),
        }
    }
}

/// A remote geocoding service.
///
/// Implementations must not fail: timeouts, error statuses, and malformed
/// payloads are logged and reported as `None` so the resolver can move on
/// to the next provider.
pub trait Geocoder {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Resolve `query` to a location, if the service knows it.
    fn geocode(
        &self,
        query: &str,
        kind: QueryKind,
    ) -> impl Future<Output = Option<GeoLocation>> + Send;
}
