//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    CombinedTimesQuery, CombinedTimesResponse, HealthResponse, HourlyQuery, HourlyProfile,
    MeanWaitEntry, OfficeDto,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{Coordinate, TravelEstimate, Weekday, LOCAL_TZ, OFFICES};
use crate::services::{aggregation, ranking};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Verifies the service is running and the store is reachable.
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.repository.health_check().await {
        Ok(true) => (StatusCode::OK, Json(HealthResponse::ok())),
        Ok(false) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse::error("store check failed")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse::error(e.to_string())),
        ),
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// GET /mean_wait_times
///
/// Mean wait per location over the full history, as legacy
/// `[location_id, display_name, mean]` triples.
pub async fn mean_wait_times(
    State(state): State<AppState>,
) -> HandlerResult<Vec<MeanWaitEntry>> {
    let means = aggregation::mean_waits(state.repository.as_ref()).await?;
    Ok(Json(means))
}

/// GET /hourly_data?day=0..6
///
/// Hourly average chart data for one weekday (0=Sunday). Without the
/// parameter the current Amsterdam weekday is used.
pub async fn hourly_data(
    State(state): State<AppState>,
    Query(query): Query<HourlyQuery>,
) -> HandlerResult<HourlyProfile> {
    let day = match query.day {
        Some(raw) => Weekday::new(raw).map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => Weekday::from_date(&chrono::Utc::now().with_timezone(&LOCAL_TZ)),
    };

    let profile = aggregation::hourly_profile(state.repository.as_ref(), day).await?;
    Ok(Json(profile))
}

// =============================================================================
// Offices & travel-aware ranking
// =============================================================================

/// GET /api/offices
///
/// The static office catalog keyed by office id.
pub async fn offices() -> Json<BTreeMap<i32, OfficeDto>> {
    let map = OFFICES
        .iter()
        .map(|office| {
            (
                office.office_id,
                OfficeDto {
                    lat: office.lat,
                    lon: office.lon,
                    address: office.address.to_string(),
                },
            )
        })
        .collect();
    Json(map)
}

/// GET /api/combined-times?lat=&lon= or ?postcode=
///
/// Locations ranked by current wait plus cycling travel time from the
/// user's position. Rejects requests with neither a coordinate pair nor
/// a resolvable postcode.
pub async fn combined_times(
    State(state): State<AppState>,
    Query(query): Query<CombinedTimesQuery>,
) -> HandlerResult<CombinedTimesResponse> {
    let user_location = resolve_user_location(&state, &query).await?;

    let current = aggregation::current_waits(state.repository.as_ref()).await?;

    let mut estimates: HashMap<i32, TravelEstimate> = HashMap::new();
    for office in OFFICES {
        let destination = Coordinate::new(office.lat, office.lon);
        let estimate = state.travel.estimate(user_location, destination).await;
        estimates.insert(office.office_id, estimate);
    }

    let locations = ranking::rank_combined(&current, &estimates);

    Ok(Json(CombinedTimesResponse {
        user_location,
        locations,
    }))
}

/// Resolve the user position from explicit coordinates or a postcode.
async fn resolve_user_location(
    state: &AppState,
    query: &CombinedTimesQuery,
) -> Result<Coordinate, AppError> {
    if let (Some(lat), Some(lon)) = (&query.lat, &query.lon) {
        let lat: f64 = lat
            .parse()
            .map_err(|_| AppError::BadRequest("lat must be numeric".to_string()))?;
        let lon: f64 = lon
            .parse()
            .map_err(|_| AppError::BadRequest("lon must be numeric".to_string()))?;
        return Ok(Coordinate::new(lat, lon));
    }

    if let Some(postcode) = &query.postcode {
        return match state.geocoder.resolve(postcode).await {
            Ok(Some(coordinate)) => Ok(coordinate),
            Ok(None) => Err(AppError::BadRequest(format!(
                "postcode {:?} could not be resolved",
                postcode
            ))),
            Err(e) => Err(AppError::BadRequest(e.to_string())),
        };
    }

    Err(AppError::BadRequest(
        "provide either lat and lon, or postcode".to_string(),
    ))
}
