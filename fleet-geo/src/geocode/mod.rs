//! Geocoding: turning postal codes and addresses into coordinates.
//!
//! This module provides the resolver that sits between callers and the
//! remote geocoding services:
//! - **PDOK locatieserver**: Dutch government geocoder, tried first
//! - **Nominatim**: public OpenStreetMap geocoder, rate limited to one
//!   request per second, used for addresses PDOK doesn't know
//! - **Prefix table**: offline approximation for postal codes
//!
//! Provider failures never surface to callers. They are logged and the
//! resolver moves on to the next source.

mod error;
mod nominatim;
mod pdok;
mod provider;
mod rate_limit;
mod resolver;
mod types;

pub use error::ProviderError;
pub use nominatim::{NominatimClient, NominatimConfig};
pub use pdok::{PdokClient, PdokConfig};
pub use provider::{Geocoder, QueryKind};
pub use rate_limit::RateLimiter;
pub use resolver::GeocodeResolver;

pub use crate::geo::{distance, within_radius};
