//! Trip-to-timesheet reconciliation.
//!
//! Each candidate timesheet is scored on identity, time overlap, and
//! departure proximity; the best candidate above the acceptance threshold
//! is linked to the trip.

mod config;
mod engine;
mod score;

pub use config::MatchConfig;
pub use engine::{
    BatchOptions, BatchSummary, MatchError, MatchResult, Matcher, MatchingStats,
    REASON_KEPT_EXISTING, REASON_NO_GOOD_MATCH, REASON_NO_TIMESHEETS, REASON_PRIVATE,
};
pub use score::{Score, best_candidate, score_candidate};
