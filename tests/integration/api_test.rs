use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use healthmon::server::{router, AppState};
use tower::ServiceExt;

use super::support::monitor;

async fn app(ticks: usize) -> Router {
    let monitor = monitor(40, None);
    for _ in 0..ticks {
        monitor.collect_now().await;
    }
    router(AppState::new(Arc::new(monitor), 2))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|value| value.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

#[tokio::test]
async fn test_system_health_json() {
    let (status, _, body) = get(app(3).await, "/api/system-health").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["health"]["status"], "healthy");
    assert_eq!(json["history"].as_array().unwrap().len(), 2);
    assert!(json["timestamp"].is_string());
    assert!(json["help_text"].as_str().unwrap().contains("format=html"));
}

#[tokio::test]
async fn test_system_health_before_first_tick() {
    let (status, _, body) = get(app(0).await, "/api/system-health").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["health"]["status"], "unknown");
    assert_eq!(json["health"]["message"], "No health data available");
    assert!(json["history"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_system_health_html() {
    let (status, content_type, body) =
        get(app(1).await, "/api/system-health?format=html").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(String::from_utf8(body).unwrap().contains("System Health Dashboard"));

    let (_, content_type, _) = get(app(1).await, "/api/system-health?format=xml").await;
    assert!(content_type.unwrap().starts_with("application/json"));
}

#[tokio::test]
async fn test_embed_endpoint() {
    let (_, _, body) = get(app(0).await, "/_system-health").await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["data"].is_null());

    let (status, _, body) = get(app(3).await, "/_system-health").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let history = json["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(json["data"], history[1]);
}

#[tokio::test]
async fn test_dashboard_routes() {
    for uri in ["/ui", "/dashboard"] {
        let (status, content_type, _) = get(app(0).await, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/html"));
    }

    let (status, _, _) = get(app(0).await, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
