//! Persistence access for trips and timesheets.
//!
//! The relational store itself is outside this crate; the matcher talks to
//! it through the [`TripStore`] trait. [`MemoryStore`] implements it over a
//! JSON snapshot for development and tests.

mod error;
mod memory;
mod repository;

pub use error::StoreError;
pub use memory::{MemoryStore, StoreSeed, TenantTimesheet};
pub use repository::TripStore;
