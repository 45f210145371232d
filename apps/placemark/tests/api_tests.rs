//! Integration tests for the HTTP API.
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use placemark::api::{AppState, HealthResponse, create_router};
use placemark::config::NominatimConfig;
use placemark::geocoder::HybridGeocoder;
use placemark::nominatim::NominatimClient;
use placemark_core::storage::PlaceRecord;
use placemark_core::{MemoryPlaces, PlaceRepository, ReverseGeocodeResult};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MONACO_XML: &str = include_str!("fixtures/monaco.xml");

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn local_places() -> Arc<dyn PlaceRepository> {
    let mut places = MemoryPlaces::new();
    places
        .insert(&PlaceRecord {
            latitude: 43.73,
            longitude: 7.42,
            country: Some("Monaco".to_string()),
            state: Some("Monaco".to_string()),
            city: Some("Monte Carlo".to_string()),
        })
        .unwrap();
    Arc::new(places)
}

fn app(nominatim: NominatimConfig, api_key: Option<&str>) -> Router {
    let remote = NominatimClient::new(nominatim).unwrap();
    let geocoder = HybridGeocoder::new(remote, Some(local_places()));
    create_router(Arc::new(AppState::new(
        geocoder,
        api_key.map(str::to_string),
    )))
}

fn local_app(api_key: Option<&str>) -> Router {
    app(NominatimConfig::default(), api_key)
}

async fn get(app: Router, uri: &str, bearer: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: Router, uri: &str, bearer: Option<&str>) -> (StatusCode, Value) {
    let (status, body) = get(app, uri, bearer).await;
    (status, serde_json::from_slice(&body).unwrap())
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = get(local_app(None), "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_needs_no_api_key() {
    let (status, _) = get(local_app(Some("secret")), "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// REVERSE GEOCODE
// =============================================================================

#[tokio::test]
async fn test_reverse_geocode_local_fallback() {
    let (status, body) = get_json(
        local_app(None),
        "/map/reverse-geocode?lat=43.7384&lon=7.4246",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"country": "Monaco", "state": "Monaco", "city": "Monte Carlo"}])
    );
}

#[tokio::test]
async fn test_reverse_geocode_miss_is_empty_array() {
    let (status, body) =
        get_json(local_app(None), "/map/reverse-geocode?lat=0&lon=0", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_reverse_geocode_prefers_remote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(MONACO_XML, "application/xml"))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get_json(
        app(NominatimConfig::with_url(server.uri()), None),
        "/map/reverse-geocode?lat=43.7270892&lon=7.4188845",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results: Vec<ReverseGeocodeResult> = serde_json::from_value(body).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].state.as_deref(), Some("Fontvieille"));
    assert_eq!(
        results[0].city.as_deref(),
        Some("Princesse Grace, Tunnel Pont Cadre, Fontvieille, 98020")
    );
}

#[tokio::test]
async fn test_reverse_geocode_remote_failure_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get_json(
        app(NominatimConfig::with_url(server.uri()), None),
        "/map/reverse-geocode?lat=43.7270892&lon=7.4188845",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["city"], "Monte Carlo");
}

#[tokio::test]
async fn test_reverse_geocode_out_of_range() {
    let (status, body) = get_json(
        local_app(None),
        "/map/reverse-geocode?lat=91&lon=0",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid coordinate"));
}

#[tokio::test]
async fn test_reverse_geocode_missing_param() {
    let (status, _) = get(local_app(None), "/map/reverse-geocode?lat=43.7", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reverse_geocode_non_numeric_param() {
    let (status, _) = get(
        local_app(None),
        "/map/reverse-geocode?lat=north&lon=7.4",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

#[tokio::test]
async fn test_missing_api_key_rejected() {
    let (status, body) = get_json(
        local_app(Some("secret")),
        "/map/reverse-geocode?lat=43.73&lon=7.42",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing or invalid API key");
}

#[tokio::test]
async fn test_wrong_api_key_rejected() {
    let (status, _) = get(
        local_app(Some("secret")),
        "/map/reverse-geocode?lat=43.73&lon=7.42",
        Some("guess"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_api_key_accepted() {
    let (status, body) = get_json(
        local_app(Some("secret")),
        "/map/reverse-geocode?lat=43.73&lon=7.42",
        Some("secret"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["country"], "Monaco");
}

#[tokio::test]
async fn test_blank_api_key_disables_auth() {
    let (status, _) = get(
        local_app(Some("")),
        "/map/reverse-geocode?lat=43.73&lon=7.42",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
