//! REST API endpoints.
//!
//! Axum-based JSON API exposing the analyzers. Analysis failures map to 404,
//! invalid input to 400; every error body is `{"error": "<message>"}`.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::analysis::{AnalysisError, ErrorPayload};
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let ApiError::Internal(message) = &self {
            tracing::error!("Internal error: {}", message);
        }

        (status, Json(ErrorPayload::new(self.to_string()))).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/card_usage", get(routes::cards::card_usage))
        .route("/api/popular_decks", get(routes::cards::popular_decks))
        .route("/api/card_win_rates", get(routes::cards::card_win_rates))
        .route("/api/cards", get(routes::cards::card_catalog))
        .route("/api/battle_replay", post(routes::battles::battle_replay))
        .route("/api/battle_stats", post(routes::battles::battle_stats))
        .route("/api/most_used_cards", post(routes::battles::most_used_cards))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer for the configured origin; `*` allows any origin.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, ApiError> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return Ok(layer.allow_origin(Any));
    }

    let origin = HeaderValue::from_str(origin)
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin {}: {}", origin, e)))?;
    Ok(layer.allow_origin(origin))
}
