//! Axum router configuration with middleware.
//!
//! The webhook receiver sits at `/` so the App's webhook URL can point at
//! the bare host.

use std::time::Duration;

use axum::body::Body;
use axum::http::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{Level, Span};

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::webhook::receive_webhook))
        .route("/health", get(handlers::health::health_check))
        .route("/test", get(handlers::health::liveness))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(log_response),
        )
        .with_state(state)
}

/// One line per request. Rejections are logged at error so they show up
/// under the default filter.
fn log_response(response: &Response<Body>, latency: Duration, _span: &Span) {
    let status = response.status().as_u16();
    let latency_ms = latency.as_millis() as u64;
    if response.status().is_client_error() || response.status().is_server_error() {
        tracing::error!(status, latency_ms, "request failed");
    } else {
        tracing::info!(status, latency_ms, "request finished");
    }
}
