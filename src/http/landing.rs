//! Locally answered endpoints: landing page and liveness probe.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

use crate::http::server::AppState;

/// `GET /`: serve the configured HTML file, or list the available endpoints.
pub async fn landing_handler(State(state): State<AppState>) -> Response {
    if let Some(path) = state.landing_page.as_deref() {
        match tokio::fs::read_to_string(path).await {
            Ok(html) => {
                return ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response();
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Landing page not readable");
            }
        }
    }

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "message": "API Gateway is running but frontend not found",
            "available_endpoints": available_endpoints(&state),
        })),
    )
        .into_response()
}

fn available_endpoints(state: &AppState) -> Value {
    let mut endpoints = Map::new();
    endpoints.insert("gateway_health".to_string(), json!("/health"));
    for name in state.registry.names() {
        endpoints.insert(
            format!("{name}_service"),
            json!(format!("/{}/{}", state.prefix, name)),
        );
    }
    Value::Object(endpoints)
}

/// `GET /health`: liveness only, never touches a backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "api-gateway",
        "port": state.port,
    }))
}
