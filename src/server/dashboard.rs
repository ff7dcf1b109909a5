use axum::response::{Html, IntoResponse};

/// Single-page dashboard; polls `/api/system-health` from the browser
pub const DASHBOARD_HTML: &str = include_str!("dashboard.html");

pub async fn dashboard_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}
