//! HTTP adapter over [`HealthMonitor`].
//!
//! Handlers only read `current_health()` and `health_history(n)`; they never
//! trigger a collection.

mod dashboard;

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::core::health_monitor::HealthMonitor;
use crate::error::{MonitorError, Result};

pub use dashboard::{dashboard_handler, DASHBOARD_HTML};

const HELP_TEXT: &str = "Add ?format=html for web dashboard view";

#[derive(Clone)]
pub struct AppState {
    monitor: Arc<HealthMonitor>,
    page_size: i64,
}

impl AppState {
    pub fn new(monitor: Arc<HealthMonitor>, page_size: usize) -> Self {
        Self {
            monitor,
            page_size: i64::try_from(page_size).unwrap_or(i64::MAX),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HealthQuery {
    format: Option<String>,
}

/// Handler failure rendered as `500 {status: "error", error, timestamp}`
#[derive(Debug)]
pub struct ApiError(String);

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("API request failed: {}", self.0);
        let body = json!({
            "status": "error",
            "error": self.0,
            "timestamp": Utc::now(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/system-health", get(system_health))
        .route("/_system-health", get(embed_health))
        .route("/ui", get(dashboard_handler))
        .route("/dashboard", get(dashboard_handler))
        .with_state(state)
}

async fn system_health(
    State(state): State<AppState>,
    Query(query): Query<HealthQuery>,
) -> std::result::Result<Response, ApiError> {
    if query.format.as_deref() == Some("html") {
        return Ok(Html(DASHBOARD_HTML).into_response());
    }

    let health = serde_json::to_value(state.monitor.current_health())?;
    let history = serde_json::to_value(state.monitor.health_history(state.page_size))?;

    Ok(Json(json!({
        "status": "success",
        "timestamp": Utc::now(),
        "health": health,
        "history": history,
        "help_text": HELP_TEXT,
    }))
    .into_response())
}

/// Latest sample and recent history, for embedding clients
async fn embed_health(State(state): State<AppState>) -> std::result::Result<Response, ApiError> {
    let history = state.monitor.health_history(state.page_size);
    let data = serde_json::to_value(history.last())?;
    let history = serde_json::to_value(&history)?;

    Ok(Json(json!({ "data": data, "history": history })).into_response())
}

/// Bind `addr` and serve until `shutdown` resolves
pub async fn serve<F>(state: AppState, addr: &str, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| MonitorError::server(format!("Cannot bind {}: {}", addr, e)))?;
    let local = listener.local_addr()?;
    info!("Server started on http://{}/ui", local);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| MonitorError::server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}
