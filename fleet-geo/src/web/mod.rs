//! Web layer for the geocoding and matching service.
//!
//! Provides HTTP endpoints for geocoding, distance checks, cache
//! maintenance, and trip/timesheet matching.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
