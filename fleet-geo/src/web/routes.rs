//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{debug, error};

use crate::cache::CacheStats;
use crate::domain::{TenantId, TripId};
use crate::geo::{GeoLocation, distance, within_radius};
use crate::matcher::{BatchOptions, BatchSummary, MatchError, MatchResult, MatchingStats};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/geocode", get(geocode))
        .route("/geocode/postal", get(geocode_postal))
        .route("/geocode/address", get(geocode_address))
        .route("/distance", get(distance_between))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/cleanup", post(cache_cleanup))
        .route("/cache/clear", post(cache_clear))
        .route("/trips/:trip_id/match", post(match_trip))
        .route(
            "/tenants/:tenant_id/matches",
            post(match_tenant).delete(clear_matches),
        )
        .route("/tenants/:tenant_id/matches/stats", get(matching_stats))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Resolve a postal code or address.
async fn geocode(
    State(state): State<AppState>,
    Query(req): Query<GeocodeQuery>,
) -> Result<Json<GeoLocation>, AppError> {
    state.geocoder.geocode(&req.q).await.map(Json).ok_or_else(AppError::no_location)
}

/// Resolve a postal code.
async fn geocode_postal(
    State(state): State<AppState>,
    Query(req): Query<PostalQuery>,
) -> Result<Json<GeoLocation>, AppError> {
    state
        .geocoder
        .geocode_postal_code(&req.code)
        .await
        .map(Json)
        .ok_or_else(AppError::no_location)
}

/// Resolve an address.
async fn geocode_address(
    State(state): State<AppState>,
    Query(req): Query<GeocodeQuery>,
) -> Result<Json<GeoLocation>, AppError> {
    state
        .geocoder
        .geocode_address(&req.q)
        .await
        .map(Json)
        .ok_or_else(AppError::no_location)
}

/// Distance between two points, optionally checked against a radius.
async fn distance_between(Query(req): Query<DistanceQuery>) -> Result<Json<DistanceResponse>, AppError> {
    let (from, to) = req.points().map_err(|message| AppError::BadRequest { message })?;

    Ok(Json(DistanceResponse {
        distance_m: distance(from, to),
        within_radius: req.radius.map(|r| within_radius(from, to, r)),
    }))
}

async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache().stats())
}

async fn cache_cleanup(State(state): State<AppState>) -> Json<CleanupResponse> {
    Json(CleanupResponse {
        removed: state.cache().cleanup(),
    })
}

async fn cache_clear(State(state): State<AppState>) -> StatusCode {
    state.cache().clear();
    StatusCode::NO_CONTENT
}

/// Match one trip to its best timesheet.
async fn match_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<MatchResult>, AppError> {
    let result = state.matcher.match_single_trip(&trip_id).await?;
    Ok(Json(result))
}

/// Batch-match a tenant's trips.
///
/// The body is an optional JSON [`BatchOptions`]; an empty body means
/// defaults.
async fn match_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    body: Bytes,
) -> Result<Json<BatchSummary>, AppError> {
    let options: BatchOptions = if body.iter().all(u8::is_ascii_whitespace) {
        BatchOptions::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest {
            message: format!("Invalid batch options: {e}"),
        })?
    };

    let summary = state
        .matcher
        .match_trips_to_timesheets(&tenant_id, &options)
        .await?;
    Ok(Json(summary))
}

/// Unlink a tenant's matched trips within the range.
async fn clear_matches(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(req): Query<RangeQuery>,
) -> Result<Json<ClearMatchesResponse>, AppError> {
    let cleared = state
        .matcher
        .clear_timesheet_matches(&tenant_id, req.range())
        .await?;
    Ok(Json(ClearMatchesResponse { cleared }))
}

async fn matching_stats(
    State(state): State<AppState>,
    Path(tenant_id): Path<TenantId>,
    Query(req): Query<RangeQuery>,
) -> Result<Json<MatchingStats>, AppError> {
    let stats = state
        .matcher
        .get_matching_stats(&tenant_id, req.range())
        .await?;
    Ok(Json(stats))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl AppError {
    fn no_location() -> Self {
        AppError::NotFound {
            message: "no location found".to_string(),
        }
    }
}

impl From<MatchError> for AppError {
    fn from(e: MatchError) -> Self {
        match e {
            MatchError::TripNotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            debug!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, GeoCache};
    use crate::domain::{EmployeeRecord, TimesheetRef, TripRecord};
    use crate::geo::GeoPoint;
    use crate::geocode::{GeocodeResolver, NominatimClient, NominatimConfig, PdokClient, PdokConfig};
    use crate::matcher::{MatchConfig, Matcher};
    use crate::store::{MemoryStore, TripStore};
    use crate::test_support;
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;

    const DOMPLEIN: &str = r#"{"response":{"numFound":1,"docs":[
        {"type":"adres","weergavenaam":"Domplein 1, Utrecht","centroide_ll":"POINT(5.1214 52.0907)"}
    ]}}"#;

    /// PDOK stand-in that knows one address and nothing else.
    async fn pdok_stub() -> String {
        let router = Router::new().route(
            "/free",
            get(|Query(params): Query<std::collections::HashMap<String, String>>| async move {
                if params.get("q").map(String::as_str) == Some("Domplein 1, Utrecht") {
                    DOMPLEIN
                } else {
                    r#"{"response":{"numFound":0,"docs":[]}}"#
                }
            }),
        );
        test_support::serve(router).await
    }

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        let at = |h, m| Utc.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap();

        store
            .insert_employee(EmployeeRecord {
                id: "e1".into(),
                tenant_id: "acme".into(),
                user_id: Some("u1".into()),
            })
            .await;
        store
            .insert_timesheet(
                "acme".into(),
                TimesheetRef {
                    id: "s1".into(),
                    user_id: "u1".into(),
                    start_time: at(9, 0),
                    end_time: at(17, 0),
                    location_start: Some(GeoPoint::new(52.0907, 5.1214)),
                    location_end: None,
                },
            )
            .await;
        for (id, private) in [("t1", false), ("t2", false), ("p1", true)] {
            store
                .insert_trip(TripRecord {
                    id: id.into(),
                    tenant_id: "acme".into(),
                    employee_id: Some("e1".into()),
                    departure_time: at(9, 0),
                    arrival_time: at(9, 30),
                    departure_postal: Some("3511AX".into()),
                    arrival_postal: None,
                    timesheet_id: None,
                    is_private: private,
                })
                .await;
        }
        store
    }

    /// Start the app with stubbed providers; returns its base URL and store.
    async fn app() -> (String, MemoryStore) {
        let pdok = PdokClient::new(
            PdokConfig::default()
                .with_base_url(pdok_stub().await)
                .with_timeout(Duration::from_millis(500)),
        )
        .unwrap();
        let nominatim = NominatimClient::new(
            NominatimConfig::default()
                .with_base_url(test_support::unreachable_url().await)
                .with_timeout(Duration::from_millis(300))
                .with_min_interval(Duration::from_millis(1)),
        )
        .unwrap();

        let cache = Arc::new(GeoCache::new(&CacheConfig::default()));
        let store = seeded_store().await;
        let state = AppState::new(
            GeocodeResolver::new(cache, pdok, nominatim),
            Matcher::new(store.clone(), MatchConfig::default()),
        );

        (test_support::serve(create_router(state)).await, store)
    }

    async fn get_json(url: &str) -> (StatusCode, Value) {
        let response = reqwest::get(url).await.unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap())
    }

    async fn post(url: &str, body: &str) -> (StatusCode, Value) {
        let response = reqwest::Client::new()
            .post(url)
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (base, _) = app().await;
        let body = reqwest::get(format!("{base}/health")).await.unwrap().text().await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn geocode_address_via_pdok_then_cache() {
        let (base, _) = app().await;

        let (status, body) = get_json(&format!("{base}/geocode?q=Domplein%201,%20Utrecht")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "pdok");
        assert_eq!(body["accuracy"], "exact");

        let (_, again) = get_json(&format!("{base}/geocode/address?q=domplein%201,%20utrecht")).await;
        assert_eq!(again["source"], "cache");

        let (_, stats) = get_json(&format!("{base}/cache/stats")).await;
        assert_eq!(stats["size"], 1);
        assert_eq!(stats["hits"], 1);
    }

    #[tokio::test]
    async fn unknown_address_is_404() {
        let (base, _) = app().await;
        let (status, body) = get_json(&format!("{base}/geocode/address?q=Nergensstraat%2099")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "no location found" }));
    }

    #[tokio::test]
    async fn postal_code_falls_back_to_prefix_table() {
        let (base, _) = app().await;

        let (status, body) = get_json(&format!("{base}/geocode/postal?code=1011%20AB")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "lookup_table");
        assert_eq!(body["accuracy"], "approximate");

        let (status, _) = get_json(&format!("{base}/geocode/postal?code=Utrecht")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn distance_with_and_without_radius() {
        let (base, _) = app().await;

        let (status, body) = get_json(&format!(
            "{base}/distance?from_lat=52.3676&from_lng=4.9041&to_lat=51.9244&to_lng=4.4777"
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        let km = body["distance_m"].as_f64().unwrap() / 1000.0;
        assert!((km - 57.0).abs() < 2.0, "got {km} km");
        assert!(body.get("within_radius").is_none());

        let (_, body) = get_json(&format!(
            "{base}/distance?from_lat=52.0&from_lng=5.0&to_lat=52.0&to_lng=5.0&radius=10"
        ))
        .await;
        assert_eq!(body["within_radius"], true);
    }

    #[tokio::test]
    async fn bad_distance_input_is_400() {
        let (base, _) = app().await;

        let (status, body) = get_json(&format!(
            "{base}/distance?from_lat=95&from_lng=5&to_lat=52&to_lng=5"
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("from"));

        let response = reqwest::get(format!("{base}/distance?from_lat=north")).await.unwrap();
        assert_eq!(response.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn cache_cleanup_and_clear() {
        let (base, _) = app().await;
        get_json(&format!("{base}/geocode?q=3511AX")).await;

        let (status, body) = post(&format!("{base}/cache/cleanup"), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["removed"], 0);

        let response = reqwest::Client::new()
            .post(format!("{base}/cache/clear"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 204);

        let (_, stats) = get_json(&format!("{base}/cache/stats")).await;
        assert_eq!(stats["size"], 0);
    }

    #[tokio::test]
    async fn match_single_trip_endpoint() {
        let (base, store) = app().await;

        let (status, body) = post(&format!("{base}/trips/t1/match"), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tripId"], "t1");
        assert_eq!(body["timesheetId"], "s1");
        assert_eq!(body["confidence"], 1.0);

        let trip = store.trip(&"t1".into()).await.unwrap().unwrap();
        assert_eq!(trip.timesheet_id.unwrap().as_str(), "s1");
    }

    #[tokio::test]
    async fn unknown_trip_is_404() {
        let (base, _) = app().await;
        let (status, body) = post(&format!("{base}/trips/nope/match"), "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "trip not found: nope");
    }

    #[tokio::test]
    async fn batch_clear_and_stats_endpoints() {
        let (base, _) = app().await;

        let (status, summary) = post(&format!("{base}/tenants/acme/matches"), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["totalTrips"], 2);
        assert_eq!(summary["matched"], 2);

        let (_, stats) = get_json(&format!("{base}/tenants/acme/matches/stats")).await;
        assert_eq!(stats["matchedTrips"], 2);
        assert_eq!(stats["privateTrips"], 1);
        assert_eq!(stats["matchRate"], 1.0);

        let (_, forced) = post(
            &format!("{base}/tenants/acme/matches"),
            r#"{"forceRematch": true, "dateFrom": "2024-03-15T00:00:00Z"}"#,
        )
        .await;
        assert_eq!(forced["totalTrips"], 2);

        let response = reqwest::Client::new()
            .delete(format!(
                "{base}/tenants/acme/matches?date_from=2024-03-15T00:00:00Z&date_to=2024-03-15T23:59:59Z"
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let cleared: Value = response.json().await.unwrap();
        assert_eq!(cleared["cleared"], 2);

        let (_, stats) = get_json(&format!("{base}/tenants/acme/matches/stats")).await;
        assert_eq!(stats["matchedTrips"], 0);
        assert_eq!(stats["matchRate"], 0.0);
    }

    #[tokio::test]
    async fn malformed_batch_options_are_400() {
        let (base, _) = app().await;
        let (status, body) = post(&format!("{base}/tenants/acme/matches"), "{ nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid batch options"));
    }
}
