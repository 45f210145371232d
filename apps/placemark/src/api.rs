//! # HTTP API
//!
//! axum router exposing the hybrid geocoder.
//!
//! | Method | Path                   | Auth     |
//! |--------|------------------------|----------|
//! | GET    | `/health`              | never    |
//! | GET    | `/map/reverse-geocode` | API key* |
//!
//! *Only when an API key is configured. Keys are compared in constant time.

use crate::geocoder::HybridGeocoder;
use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use placemark_core::{Error, GeoPoint, ReverseGeocodeResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

// =============================================================================
// STATE
// =============================================================================

/// Shared server state.
pub struct AppState {
    pub geocoder: HybridGeocoder,
    pub api_key: Option<String>,
}

impl AppState {
    #[must_use]
    pub fn new(geocoder: HybridGeocoder, api_key: Option<String>) -> Self {
        // Blank keys (e.g. an empty env var) mean no auth.
        let api_key = api_key.filter(|k| !k.is_empty());
        Self { geocoder, api_key }
    }
}

// =============================================================================
// REQUEST / RESPONSE TYPES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReverseGeocodeParams {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Handler failures, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidCoordinate { .. } => Self::BadRequest(e.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid API key".to_string(),
            ),
            Self::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/map/reverse-geocode", get(reverse_geocode_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Serve the API on `addr` until Ctrl-C.
pub async fn serve(state: Arc<AppState>, addr: &str) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Placemark listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let authorized =
        provided.is_some_and(|key| bool::from(key.as_bytes().ct_eq(expected.as_bytes())));

    if authorized {
        next.run(request).await
    } else {
        warn!(path = %request.uri().path(), "Rejected request with missing or invalid API key");
        ApiError::Unauthorized.into_response()
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Zero or one place for the given coordinate.
async fn reverse_geocode_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReverseGeocodeParams>,
) -> Result<Json<Vec<ReverseGeocodeResult>>, ApiError> {
    let point = GeoPoint::new(params.lat, params.lon)?;
    let result = state.geocoder.reverse_geocode(&point).await?;
    Ok(Json(result.into_iter().collect()))
}
