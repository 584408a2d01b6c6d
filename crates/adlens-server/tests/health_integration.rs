use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use adlens_core::{config::Config, Dataset};
use adlens_server::app::build_app;
use adlens_server::source::{FileDatasetSource, StaticDatasetSource};
use adlens_server::state::AppState;

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

fn health_request() -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build request")
}

// ============================================================
// BDD: Health check returns 200 when the dataset loads
// ============================================================
#[tokio::test]
async fn test_health_returns_200_when_dataset_loads() {
    let state = Arc::new(AppState::new(
        StaticDatasetSource::new(Dataset::default()),
        Config::default(),
    ));
    let app = build_app(state);

    let response = app.oneshot(health_request()).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

// ============================================================
// BDD: Health check degrades when the dataset file is missing
// ============================================================
#[tokio::test]
async fn test_health_returns_503_when_dataset_missing() {
    let state = Arc::new(AppState::new(
        FileDatasetSource::new("/nonexistent/adlens/marketing_data.json"),
        Config::default(),
    ));
    let app = build_app(state);

    let response = app.oneshot(health_request()).await.expect("request");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = json_body(response).await;
    assert_eq!(json["status"], "degraded");
}
