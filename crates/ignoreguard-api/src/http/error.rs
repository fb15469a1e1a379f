//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use ignoreguard_infra::admission::AdmissionError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
///
/// Both variants carry the delivery id when the request had one, so the
/// envelope's `request_id` matches GitHub's delivery log.
#[derive(Debug)]
pub enum AppError {
    /// The admission gate rejected the delivery.
    Admission {
        error: AdmissionError,
        delivery_id: Option<String>,
    },
    /// An admitted pull-request delivery whose body does not parse.
    InvalidPayload { delivery_id: String, message: String },
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Admission { error, .. } => (StatusCode::BAD_REQUEST, error.code(), error.to_string()),
            AppError::InvalidPayload { message, .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_PAYLOAD", message.clone())
            }
        }
    }

    fn request_id(self) -> String {
        let delivery_id = match self {
            AppError::Admission { delivery_id, .. } => delivery_id,
            AppError::InvalidPayload { delivery_id, .. } => Some(delivery_id),
        };
        delivery_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::now_v7().to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        ApiResponse::error(status, code, &message, self.request_id(), 0).into_response()
    }
}
