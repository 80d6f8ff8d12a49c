// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/indicators
// - GET /api/economic-data (success, validation, configuration, parse)

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use peso_pulse::api::{self, AppState};
use peso_pulse::relay::provider::ScriptedProvider;
use peso_pulse::relay::{RelayService, CONFIG_ERROR_MARKER};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn router_with(relay: RelayService) -> Router {
    api::router(AppState {
        relay: Arc::new(relay),
    })
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let value = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, value)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = router_with(RelayService::new(Arc::new(ScriptedProvider::with_text(
        "{\"data\": []}",
    ))));

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn api_indicators_lists_the_full_catalog() {
    let app = router_with(RelayService::new(Arc::new(ScriptedProvider::with_text(
        "{\"data\": []}",
    ))));

    let (status, v) = get_json(app, "/api/indicators").await;
    assert_eq!(status, StatusCode::OK);

    let indicators = v["indicators"].as_array().expect("indicators array");
    assert_eq!(indicators.len(), 8);
    assert!(indicators
        .iter()
        .any(|e| e["key"] == "gdpGrowth" && e["name"] == "GDP Growth"));
    assert!(v["primary_sources"]
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s == "bsp.gov.ph"));
}

#[tokio::test]
async fn api_economic_data_returns_data_and_sources_arrays() {
    let app = router_with(RelayService::new(Arc::new(ScriptedProvider::with_text(
        "{\"data\":[{\"month\":\"2025-01\",\"gdpGrowth\":5.7}]}",
    ))));

    let (status, v) = get_json(app, "/api/economic-data?indicators=gdpGrowth").await;
    assert_eq!(status, StatusCode::OK);
    assert!(v["data"].is_array(), "contract requires a data array");
    assert!(v["sources"].is_array(), "contract requires a sources array");
    assert_eq!(v["data"][0]["month"], "2025-01");
    assert_eq!(v["data"][0]["gdpGrowth"], 5.7);
}

#[tokio::test]
async fn unknown_indicator_yields_400_with_error_body() {
    let app = router_with(RelayService::new(Arc::new(ScriptedProvider::with_text(
        "{\"data\": []}",
    ))));

    let (status, v) = get_json(app, "/api/economic-data?indicators=stockIndex").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["message"].as_str().unwrap().contains("invalid"));
    assert!(v["details"].as_str().unwrap().contains("stockIndex"));
}

#[tokio::test]
async fn missing_selection_yields_400() {
    let app = router_with(RelayService::new(Arc::new(ScriptedProvider::with_text(
        "{\"data\": []}",
    ))));

    let (status, _) = get_json(app, "/api/economic-data").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unconfigured_relay_yields_500_with_marker_in_details() {
    let provider = Arc::new(ScriptedProvider::with_text("{\"data\": []}"));
    let app = router_with(RelayService::unconfigured(provider.clone()));

    let (status, v) = get_json(app, "/api/economic-data?indicators=gdpGrowth").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(v["details"].as_str().unwrap().contains(CONFIG_ERROR_MARKER));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn unparseable_model_reply_yields_502() {
    let app = router_with(RelayService::new(Arc::new(ScriptedProvider::with_text(
        "no data today, sorry",
    ))));

    let (status, v) = get_json(app, "/api/economic-data?indicators=gdpGrowth").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!v["details"].as_str().unwrap().is_empty());
}
