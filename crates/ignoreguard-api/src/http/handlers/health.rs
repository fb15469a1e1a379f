//! Health and liveness routes. No authentication.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "app": "ignoreguard",
        "app_id": state.github.app_id(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /test
pub async fn liveness() -> &'static str {
    tracing::info!("liveness route hit");
    "ignoreguard is running"
}
