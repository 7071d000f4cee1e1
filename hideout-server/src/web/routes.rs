//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{error, warn};

use crate::domain::ModeSet;
use crate::search::{ReachError, find_reachable};
use crate::timetable::Timetable;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/feed", get(feed_info))
        .route("/stops/hiding", get(hiding_stops))
        .route("/reach", post(reach))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Service period and size of the loaded feed.
async fn feed_info(State(state): State<AppState>) -> Json<FeedInfo> {
    let period = state.feed.service_period();
    Json(FeedInfo {
        start_date: period.start,
        end_date: period.end,
        stop_count: state.feed.stops().count(),
    })
}

/// Stops served by at least one of the given modes, sorted by name.
async fn hiding_stops(
    State(state): State<AppState>,
    Query(req): Query<HidingStopsQuery>,
) -> Result<Json<Vec<StopSummary>>, AppError> {
    let modes = match req.modes.as_deref() {
        Some(list) => ModeSet::parse_list(list).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?,
        None => state.defaults.hiding_modes,
    };
    if modes.is_empty() {
        return Err(AppError::BadRequest {
            message: "no modes given".to_string(),
        });
    }
    let stops = state
        .feed
        .stops_served_by(modes)
        .into_iter()
        .map(StopSummary::from)
        .collect();
    Ok(Json(stops))
}

/// Every stop reachable from the start before the deadline.
async fn reach(
    State(state): State<AppState>,
    Json(req): Json<ReachQuery>,
) -> Result<Json<ReachResponse>, AppError> {
    let request = req
        .into_request(&state.defaults)
        .map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?;

    // The search is CPU bound and synchronous.
    let response = tokio::task::spawn_blocking(move || {
        let result = find_reachable(
            state.feed.as_ref(),
            state.stops.as_ref(),
            &state.cache,
            &request,
        )?;
        Ok::<_, ReachError>(ReachResponse::from_result(&result, &state.feed))
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("search task failed: {e}"),
    })??;

    Ok(Json(response))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<ReachError> for AppError {
    fn from(e: ReachError) -> Self {
        let message = e.to_string();
        match e {
            ReachError::Config(_) => AppError::BadRequest { message },
            ReachError::UnknownStartStop(_) => AppError::NotFound { message },
            ReachError::Timetable(_) | ReachError::Geometry(_) => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
