//! Persistence error types.

/// Errors from the trip/timesheet store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A write targeted a record that doesn't exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The backing store failed
    #[error("store backend error: {0}")]
    Backend(String),

    /// Seed data could not be read
    #[error("failed to read seed data: {message}")]
    Io { message: String },

    /// Seed data is not valid JSON for the expected shape
    #[error("invalid seed data: {message}")]
    Json { message: String },
}
