//! Trip-to-timesheet matching against a store.
//!
//! For each trip: resolve the driver's user account, fetch that day's
//! candidate timesheets, score them, and link the trip to the best one if
//! it clears the acceptance threshold.
//!
//! A trip moves from unmatched to matched only here, and back only through
//! [`Matcher::clear_timesheet_matches`]. Private trips are never scored or
//! written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{DateRange, TenantId, TimesheetId, TripId, TripRecord, TripState};
use crate::store::{StoreError, TripStore};

use super::config::MatchConfig;
use super::score::best_candidate;

/// Reason given when no timesheet exists for the trip's day.
pub const REASON_NO_TIMESHEETS: &str = "no timesheets found";

/// Reason given when the best candidate scores below the threshold.
pub const REASON_NO_GOOD_MATCH: &str = "no good match found";

/// Reason given for private trips.
pub const REASON_PRIVATE: &str = "trip is private";

/// Reason given when a re-match finds nothing better and the trip keeps the
/// timesheet it already had.
pub const REASON_KEPT_EXISTING: &str = "kept existing match";

/// Outcome of matching one trip.
///
/// "No match" is a normal outcome: check `timesheet_id`, not for errors.
/// `timesheet_id` is always the trip's link after the call, so a rejected
/// re-match reports the link it kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub trip_id: TripId,
    pub timesheet_id: Option<TimesheetId>,
    /// Within `[0, 1]`.
    pub confidence: f64,
    pub match_reason: String,
}

impl MatchResult {
    fn unmatched(trip_id: TripId, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            trip_id,
            timesheet_id: None,
            confidence,
            match_reason: reason.into(),
        }
    }

    /// A result for a trip that found nothing acceptable, keeping any link
    /// it already had.
    fn rejected(trip: &TripRecord, confidence: f64, reason: &str) -> Self {
        match &trip.timesheet_id {
            Some(existing) => Self {
                trip_id: trip.id.clone(),
                timesheet_id: Some(existing.clone()),
                confidence,
                match_reason: REASON_KEPT_EXISTING.to_string(),
            },
            None => Self::unmatched(trip.id.clone(), confidence, reason),
        }
    }

    pub fn is_match(&self) -> bool {
        self.timesheet_id.is_some()
    }
}

/// Errors from matching operations.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The requested trip doesn't exist
    #[error("trip not found: {0}")]
    TripNotFound(TripId),

    /// Reading from the store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Writing the accepted match back failed
    #[error("failed to save match: {source}")]
    Persist { trip: TripId, source: StoreError },
}

/// Options for a batch run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchOptions {
    /// Re-score trips that already have a timesheet.
    pub force_rematch: bool,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl BatchOptions {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.date_from, self.date_to)
    }
}

/// Totals and per-trip results of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_trips: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub results: Vec<MatchResult>,
}

/// Match coverage for a tenant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingStats {
    /// Non-private trips.
    pub total_trips: usize,
    pub matched_trips: usize,
    pub unmatched_trips: usize,
    pub private_trips: usize,
    /// `matched / total`, or 0 with no trips.
    pub match_rate: f64,
}

/// Links trips to timesheets.
pub struct Matcher<S> {
    store: S,
    config: MatchConfig,
}

impl<S: TripStore> Matcher<S> {
    /// Create a matcher over a store.
    pub fn new(store: S, config: MatchConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Match one trip by id and persist an accepted match.
    ///
    /// A trip that already has a timesheet is re-scored; if nothing clears
    /// the threshold its existing link is left alone and reported with
    /// [`REASON_KEPT_EXISTING`].
    pub async fn match_single_trip(&self, trip_id: &TripId) -> Result<MatchResult, MatchError> {
        let trip = self
            .store
            .trip(trip_id)
            .await?
            .ok_or_else(|| MatchError::TripNotFound(trip_id.clone()))?;

        self.match_trip(&trip).await
    }

    /// Match every eligible trip of a tenant, oldest first.
    ///
    /// Eligible means not private and, unless `force_rematch`, not already
    /// matched. Trips are processed one at a time; a failure on one trip is
    /// logged and recorded as unmatched, and the run carries on.
    pub async fn match_trips_to_timesheets(
        &self,
        tenant: &TenantId,
        options: &BatchOptions,
    ) -> Result<BatchSummary, MatchError> {
        let trips = self.store.trips(tenant, options.range()).await?;

        let eligible: Vec<TripRecord> = trips
            .into_iter()
            .filter(|t| match t.state() {
                TripState::Private => false,
                TripState::Matched => options.force_rematch,
                TripState::Unmatched => true,
            })
            .collect();

        let mut summary = BatchSummary {
            total_trips: eligible.len(),
            ..BatchSummary::default()
        };

        for trip in &eligible {
            let result = match self.match_trip(trip).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(trip = %trip.id, error = %e, "matching failed, continuing batch");
                    MatchResult::unmatched(trip.id.clone(), 0.0, e.to_string())
                }
            };

            if result.is_match() {
                summary.matched += 1;
            } else {
                summary.unmatched += 1;
            }
            summary.results.push(result);
        }

        info!(
            tenant = %tenant,
            total = summary.total_trips,
            matched = summary.matched,
            unmatched = summary.unmatched,
            force_rematch = options.force_rematch,
            "batch matching complete"
        );

        Ok(summary)
    }

    /// Unlink every matched trip of a tenant within `range`.
    ///
    /// Private trips are left untouched even if they carry a link. A failed
    /// write is logged and skipped like in a batch run; the returned count
    /// covers only the trips actually unlinked.
    pub async fn clear_timesheet_matches(
        &self,
        tenant: &TenantId,
        range: DateRange,
    ) -> Result<usize, MatchError> {
        let trips = self.store.trips(tenant, range).await?;
        let (mut cleared, mut failed) = (0, 0);

        for trip in trips.iter().filter(|t| t.state() == TripState::Matched) {
            match self.store.set_trip_timesheet(&trip.id, None).await {
                Ok(()) => cleared += 1,
                Err(e) => {
                    warn!(trip = %trip.id, error = %e, "failed to clear match, continuing");
                    failed += 1;
                }
            }
        }

        info!(tenant = %tenant, cleared, failed, "cleared timesheet matches");
        Ok(cleared)
    }

    /// Match coverage of a tenant's trips within `range`.
    pub async fn get_matching_stats(
        &self,
        tenant: &TenantId,
        range: DateRange,
    ) -> Result<MatchingStats, MatchError> {
        let trips = self.store.trips(tenant, range).await?;

        let (mut matched, mut unmatched, mut private) = (0, 0, 0);
        for trip in &trips {
            match trip.state() {
                TripState::Matched => matched += 1,
                TripState::Unmatched => unmatched += 1,
                TripState::Private => private += 1,
            }
        }

        let total = matched + unmatched;
        let match_rate = if total == 0 {
            0.0
        } else {
            matched as f64 / total as f64
        };

        Ok(MatchingStats {
            total_trips: total,
            matched_trips: matched,
            unmatched_trips: unmatched,
            private_trips: private,
            match_rate,
        })
    }

    /// Score one trip and persist an accepted match.
    async fn match_trip(&self, trip: &TripRecord) -> Result<MatchResult, MatchError> {
        if trip.is_private {
            return Ok(MatchResult::unmatched(trip.id.clone(), 0.0, REASON_PRIVATE));
        }

        let user = match &trip.employee_id {
            Some(employee) => {
                let user = self.store.employee_user(&trip.tenant_id, employee).await?;
                if user.is_none() {
                    debug!(trip = %trip.id, employee = %employee, "no user for employee, matching without identity");
                }
                user
            }
            None => None,
        };

        let candidates = self
            .store
            .timesheets_on(&trip.tenant_id, trip.departure_date(), user.as_ref())
            .await?;

        let Some((sheet, score)) = best_candidate(trip, user.as_ref(), &candidates, &self.config)
        else {
            debug!(trip = %trip.id, "no candidate timesheets");
            return Ok(MatchResult::rejected(trip, 0.0, REASON_NO_TIMESHEETS));
        };

        if score.confidence < self.config.accept_threshold {
            debug!(
                trip = %trip.id,
                best = %sheet.id,
                confidence = score.confidence,
                "best candidate below threshold"
            );
            return Ok(MatchResult::rejected(trip, score.confidence, REASON_NO_GOOD_MATCH));
        }

        self.store
            .set_trip_timesheet(&trip.id, Some(&sheet.id))
            .await
            .map_err(|source| MatchError::Persist {
                trip: trip.id.clone(),
                source,
            })?;

        debug!(
            trip = %trip.id,
            timesheet = %sheet.id,
            confidence = score.confidence,
            "matched trip to timesheet"
        );

        Ok(MatchResult {
            trip_id: trip.id.clone(),
            timesheet_id: Some(sheet.id.clone()),
            confidence: score.confidence,
            match_reason: score.reason(&self.config),
        })
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
