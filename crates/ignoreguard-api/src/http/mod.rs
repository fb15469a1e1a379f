//! HTTP layer: the webhook receiver plus health and liveness routes.
//!
//! JSON responses use the envelope format from [`response`].

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
