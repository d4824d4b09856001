//! Geocoding and trip/timesheet reconciliation service.
//!
//! Resolves Dutch postal codes and addresses to coordinates through a
//! cached chain of providers, and links vehicle telemetry trips to the
//! timesheets they were driven under.

pub mod cache;
pub mod config;
pub mod domain;
pub mod geo;
pub mod geocode;
pub mod matcher;
pub mod store;
#[cfg(test)]
mod test_support;
pub mod web;
