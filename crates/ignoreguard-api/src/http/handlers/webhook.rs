//! Webhook receiver.
//!
//! Runs the admission gate over the raw body, then hands admitted
//! `pull_request.opened` / `pull_request.reopened` deliveries to the
//! provisioner in a background task. Everything else is acknowledged and
//! dropped.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use ignoreguard_infra::admission::{
    DeliveryHeaders, DELIVERY_HEADER, EVENT_HEADER, SIGNATURE_256_HEADER, SIGNATURE_SHA1_HEADER,
    USER_AGENT_HEADER,
};
use ignoreguard_types::event::{PullRequestAction, PullRequestPayload};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

const PULL_REQUEST_EVENT: &str = "pull_request";

/// A header's value, lossily decoded. Undecodable bytes keep the header present.
fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

fn delivery_headers(headers: &HeaderMap) -> DeliveryHeaders {
    DeliveryHeaders {
        event: header(headers, EVENT_HEADER),
        delivery: header(headers, DELIVERY_HEADER),
        signature_256: header(headers, SIGNATURE_256_HEADER),
        signature_sha1: header(headers, SIGNATURE_SHA1_HEADER),
        user_agent: header(headers, USER_AGENT_HEADER),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// POST / - Receive a GitHub webhook delivery.
///
/// - 400 when the gate rejects the delivery or an admitted pull-request body
///   is not valid JSON.
/// - 200 `ignored` for any other event type or action.
/// - 202 `submitted` once the provisioning run has been spawned on the
///   state's task tracker.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse<Value>, AppError> {
    let start = Instant::now();
    let delivery = delivery_headers(&headers);
    let admitted = state
        .gate
        .admit(&delivery, &body)
        .map_err(|error| AppError::Admission {
            error,
            delivery_id: delivery.delivery.clone(),
        })?;
    let delivery_id = admitted.delivery_id;

    if admitted.event != PULL_REQUEST_EVENT {
        info!(event = %admitted.event, delivery_id = %delivery_id, "ignoring unsupported event");
        return Ok(ApiResponse::success(
            json!({ "status": "ignored", "event": admitted.event }),
            delivery_id,
            elapsed_ms(start),
        ));
    }

    let invalid = |e: serde_json::Error| {
        error!(delivery_id = %delivery_id, error = %e, "rejected webhook payload");
        AppError::InvalidPayload {
            delivery_id: delivery_id.clone(),
            message: e.to_string(),
        }
    };

    let raw: Value = serde_json::from_slice(&body).map_err(invalid)?;
    let action = raw.get("action").and_then(Value::as_str).unwrap_or_default().to_string();

    if PullRequestAction::from_action(&action).is_none() {
        info!(event = PULL_REQUEST_EVENT, action = %action, delivery_id = %delivery_id, "ignoring unsubscribed action");
        return Ok(ApiResponse::success(
            json!({ "status": "ignored", "event": format!("{PULL_REQUEST_EVENT}.{action}") }),
            delivery_id,
            elapsed_ms(start),
        ));
    }

    let payload: PullRequestPayload = serde_json::from_value(raw).map_err(invalid)?;
    let Some(event) = payload.into_event(&delivery_id) else {
        error!(delivery_id = %delivery_id, action = %action, "rejected webhook payload");
        return Err(AppError::InvalidPayload {
            delivery_id,
            message: format!("unsupported pull_request action '{action}'"),
        });
    };

    info!(
        delivery_id = %event.delivery_id,
        event = %event.action,
        repo = %event.repo,
        pr = event.number,
        "Webhook triggering provisioning"
    );

    let data = json!({
        "status": "submitted",
        "event": event.action.to_string(),
        "repo": event.repo.to_string(),
        "pr": event.number,
    });

    let provisioner = Arc::clone(&state.provisioner);
    let github = Arc::clone(&state.github);
    state.tasks.spawn(async move {
        let client = github.client_for(event.installation_id);
        let outcome = provisioner.run(&client, &event).await;
        debug!(delivery_id = %event.delivery_id, outcome = outcome.as_str(), "provisioning task finished");
    });

    Ok(ApiResponse::success(data, delivery_id, elapsed_ms(start)).with_status(StatusCode::ACCEPTED))
}
