//! REST API endpoints.
//!
//! Axum-based HTTP API for analyzing match batches, either posted
//! directly or collected from the match service for a player.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::calculate::AnalysisError;
use crate::fetch::FetchError;

use self::state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unprocessable: {0}")]
    UnprocessableEntity(String),

    #[error("Upstream error: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::UnprocessableEntity(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_DATA")
            }
            ApiError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            error!("{}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InsufficientData(msg) => ApiError::UnprocessableEntity(msg),
            AnalysisError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InsufficientMatches { .. } => {
                ApiError::UnprocessableEntity(err.to_string())
            }
            FetchError::InvalidUrl(msg) => ApiError::Internal(msg),
            FetchError::HttpStatus { status: 404, .. } => ApiError::NotFound(err.to_string()),
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

/// CORS layer for the configured origin; `*` allows any origin.
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Ignoring invalid CORS origin {:?}", origin);
            layer
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origin);

    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/analyze", post(routes::analyze::analyze_batch))
        .route(
            "/api/players/:player/report",
            get(routes::analyze::player_report),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_mapping() {
        let err: ApiError = AnalysisError::InsufficientData("empty".to_string()).into();
        assert!(matches!(err, ApiError::UnprocessableEntity(_)));

        let err: ApiError = AnalysisError::Internal("boom".to_string()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_fetch_error_mapping() {
        let err: ApiError = FetchError::InsufficientMatches {
            found: 3,
            required: 12,
        }
        .into();
        assert!(matches!(err, ApiError::UnprocessableEntity(_)));

        let err: ApiError = FetchError::HttpStatus {
            status: 404,
            message: "Not Found".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = FetchError::Exhausted {
            url: "https://fallback.test".to_string(),
            attempts: 5,
        }
        .into();
        assert!(matches!(err, ApiError::BadGateway(_)));
    }

    #[test]
    fn test_error_status_codes() {
        let resp = ApiError::UnprocessableEntity("x".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = ApiError::BadGateway("x".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
