use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::discovery::Discovery;
use crate::location::{self, AddressDetails, Location, RegionDefault};

use super::state::AppState;

const DEFAULT_RADIUS_KM: f64 = 10.0;
const DEFAULT_MAX_RESULTS: usize = 20;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

fn check_tz_hint(hint: Option<&str>) -> Result<(), Response> {
    if let Some(hint) = hint {
        if !location::is_known_timezone(hint) {
            return Err(
                api_error(StatusCode::BAD_REQUEST, format!("Unknown timezone '{}'", hint))
                    .into_response(),
            );
        }
    }
    Ok(())
}

// ─── GET / ───────────────────────────────────────────────────────

pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "care-compass",
        "endpoints": ["/api/discover", "/api/facilities", "/api/location", "/api/defaults"],
    }))
}

// ─── GET /api/discover ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct DiscoverQuery {
    pub radius_km: Option<f64>,
    pub max_results: Option<usize>,
    pub tz_hint: Option<String>,
}

pub async fn discover(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DiscoverQuery>,
) -> Result<Json<Discovery>, Response> {
    let start = Instant::now();
    check_tz_hint(params.tz_hint.as_deref())?;

    let radius_km = params.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    let max_results = params.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    let result =
        state
            .orchestrator
            .discover_with_hint(params.tz_hint.as_deref(), radius_km, max_results);

    let elapsed = start.elapsed();
    eprintln!(
        "[{}] GET /api/discover radius={}km -> {} facilities via {} ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        radius_km,
        result.facilities.len(),
        result.location_source,
        elapsed.as_secs_f64() * 1000.0,
    );

    Ok(Json(result))
}

// ─── GET /api/facilities ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct FacilitiesQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub max_results: Option<usize>,
}

pub async fn facilities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FacilitiesQuery>,
) -> Result<Json<Discovery>, Response> {
    let start = Instant::now();

    let (lat, lng) = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Provide 'lat'+'lng' parameters",
            )
            .into_response())
        }
    };
    let origin = Location::manual(lat, lng).map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "Invalid coordinates. Lat: -90..90, Lng: -180..180",
        )
        .into_response()
    })?;
    let radius_km = params.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    let max_results = params.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    let result = state.orchestrator.discover_from(origin, radius_km, max_results);

    let elapsed = start.elapsed();
    eprintln!(
        "[{}] GET /api/facilities lat={} lng={} radius={}km -> {} facilities ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        lat,
        lng,
        radius_km,
        result.facilities.len(),
        elapsed.as_secs_f64() * 1000.0,
    );

    Ok(Json(result))
}

// ─── GET /api/location ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct LocationQuery {
    pub details: Option<bool>,
    pub tz_hint: Option<String>,
}

#[derive(Serialize)]
pub struct LocationResponse {
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressDetails>,
}

pub async fn current_location(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocationQuery>,
) -> Result<Json<LocationResponse>, Response> {
    let start = Instant::now();
    check_tz_hint(params.tz_hint.as_deref())?;

    let location = state
        .orchestrator
        .resolve_location_with_hint(params.tz_hint.as_deref());
    let address = if params.details.unwrap_or(false) {
        state.orchestrator.address_details(&location)
    } else {
        None
    };

    let elapsed = start.elapsed();
    eprintln!(
        "[{}] GET /api/location -> {} ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        location.display_line(),
        elapsed.as_secs_f64() * 1000.0,
    );

    Ok(Json(LocationResponse { location, address }))
}

// ─── GET /api/defaults ───────────────────────────────────────────

pub async fn defaults() -> Json<Vec<RegionDefault>> {
    Json(location::region_defaults().to_vec())
}
