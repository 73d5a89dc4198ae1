//! REST API routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::analysis;
use crate::state::AppState;
use crate::workflow::{RunError, RunRequest};
use stride_core::Coordinate;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/recommendations", post(create_recommendation))
        .route("/v1/safety/score", get(point_score))
}

async fn health() -> &'static str {
    "OK"
}

/// Run the full recommendation workflow for one request.
async fn create_recommendation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Response {
    match state.workflow.run(request).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(RunError::Validation(message)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": message })),
        )
            .into_response(),
        Err(RunError::System {
            message,
            recommendation,
        }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message, "recommendation": recommendation })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct ScoreQuery {
    lat: f64,
    lng: f64,
}

/// Diagnostic surface for the scorer: score a single point directly.
async fn point_score(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScoreQuery>,
) -> Response {
    let point = Coordinate::new(query.lat, query.lng);
    if !point.is_valid() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "coordinates out of range" })),
        )
            .into_response();
    }

    let radius_km = state.config.safety_radius_km;
    let days_back = state.config.safety_days_back;

    match analysis::safety::score_point(state.incidents.as_ref(), point, radius_km, days_back)
        .await
    {
        Ok((counts, score)) => (
            StatusCode::OK,
            Json(json!({
                "search_location": { "lat": point.lat, "lng": point.lng },
                "search_radius_km": radius_km,
                "days_searched": days_back,
                "summary": counts,
                "safety_score": score,
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
