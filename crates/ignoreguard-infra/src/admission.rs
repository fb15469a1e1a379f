//! Webhook admission gate with HMAC-SHA256 signature verification.
//!
//! Provides:
//! - `verify_hmac_sha256()` -- constant-time HMAC-SHA256 signature verification
//! - `compute_hmac_sha256_hex()` -- signature generation for the `sign` command and tests
//! - `AdmissionGate` -- the accept/reject decision for one inbound delivery

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::{error, info, warn};

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

pub const EVENT_HEADER: &str = "x-github-event";
pub const DELIVERY_HEADER: &str = "x-github-delivery";
pub const SIGNATURE_256_HEADER: &str = "x-hub-signature-256";
pub const SIGNATURE_SHA1_HEADER: &str = "x-hub-signature";
pub const USER_AGENT_HEADER: &str = "user-agent";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Reasons a delivery is rejected. All map to HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    /// One or both identifying headers are absent.
    #[error("missing required webhook headers: {}", .0.join(", "))]
    MissingHeaders(Vec<&'static str>),

    /// A secret is configured but the delivery carries no signature.
    #[error("missing signature header (x-hub-signature-256)")]
    MissingSignature,

    /// Only the legacy SHA-1 signature was sent.
    #[error("only x-hub-signature-256 signatures are supported")]
    UnsupportedSignature,

    /// HMAC signature verification failed.
    #[error("HMAC signature verification failed")]
    InvalidSignature,

    /// Invalid HMAC key.
    #[error("invalid HMAC key: {0}")]
    InvalidKey(String),
}

impl AdmissionError {
    /// Machine-readable code returned in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionError::MissingHeaders(_) => "MISSING_HEADERS",
            AdmissionError::MissingSignature => "MISSING_SIGNATURE",
            AdmissionError::UnsupportedSignature => "UNSUPPORTED_SIGNATURE",
            AdmissionError::InvalidSignature | AdmissionError::InvalidKey(_) => "INVALID_SIGNATURE",
        }
    }
}

// ---------------------------------------------------------------------------
// HMAC-SHA256 verification
// ---------------------------------------------------------------------------

/// Verify an HMAC-SHA256 signature against a request body.
///
/// Uses constant-time comparison (via the hmac crate's `verify_slice`).
pub fn verify_hmac_sha256(secret: &[u8], body: &[u8], signature_hex: &str) -> Result<(), AdmissionError> {
    let expected_bytes = hex::decode(signature_hex).map_err(|_| AdmissionError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AdmissionError::InvalidKey(e.to_string()))?;
    mac.update(body);

    mac.verify_slice(&expected_bytes)
        .map_err(|_| AdmissionError::InvalidSignature)
}

/// Verify an HMAC-SHA256 signature with an optional `sha256=` prefix.
///
/// GitHub sends signatures as `sha256=<hex>`; plain hex is accepted too.
pub fn verify_hmac_sha256_with_prefix(
    secret: &[u8],
    body: &[u8],
    signature: &str,
) -> Result<(), AdmissionError> {
    let hex_sig = signature.strip_prefix("sha256=").unwrap_or(signature);
    verify_hmac_sha256(secret, body, hex_sig)
}

/// Compute HMAC-SHA256 and return the hex-encoded signature.
pub fn compute_hmac_sha256_hex(secret: &[u8], body: &[u8]) -> Result<String, AdmissionError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AdmissionError::InvalidKey(e.to_string()))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

// ---------------------------------------------------------------------------
// AdmissionGate
// ---------------------------------------------------------------------------

/// The webhook headers the gate inspects. Empty values count as absent.
#[derive(Debug, Clone, Default)]
pub struct DeliveryHeaders {
    pub event: Option<String>,
    pub delivery: Option<String>,
    pub signature_256: Option<String>,
    pub signature_sha1: Option<String>,
    pub user_agent: Option<String>,
}

/// How an accepted delivery was authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Signature checked against the configured secret.
    Verified,
    /// No secret is configured, so nothing was checked.
    Unverified,
    /// Unsigned delivery from a trusted relay; signature check skipped.
    RelayBypass { relay: String },
}

/// An accepted delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedDelivery {
    pub event: String,
    pub delivery_id: String,
    pub admission: Admission,
}

/// Decides whether an inbound delivery may reach the workflow.
///
/// Read-only after construction and shared across concurrent deliveries.
pub struct AdmissionGate {
    secret: Option<SecretString>,
    trusted_relays: Vec<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl AdmissionGate {
    pub fn new(secret: Option<SecretString>, trusted_relays: Vec<String>) -> Self {
        Self {
            secret,
            trusted_relays,
        }
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Accept or reject one delivery.
    ///
    /// Order of checks:
    /// 1. `x-github-event` and `x-github-delivery` must both be present.
    /// 2. Without a configured secret the delivery is accepted unverified.
    /// 3. With no signature header at all, a user agent matching a trusted
    ///    relay is let through with a warning; anything else is rejected.
    /// 4. Otherwise `x-hub-signature-256` must verify against the raw body.
    pub fn admit(&self, headers: &DeliveryHeaders, body: &[u8]) -> Result<AdmittedDelivery, AdmissionError> {
        let event = present(&headers.event);
        let delivery = present(&headers.delivery);

        let (event, delivery_id) = match (event, delivery) {
            (Some(e), Some(d)) => (e.to_string(), d.to_string()),
            _ => {
                let mut missing = Vec::new();
                if event.is_none() {
                    missing.push(EVENT_HEADER);
                }
                if delivery.is_none() {
                    missing.push(DELIVERY_HEADER);
                }
                let err = AdmissionError::MissingHeaders(missing);
                error!(error = %err, "rejected webhook delivery");
                return Err(err);
            }
        };

        let Some(secret) = &self.secret else {
            info!(event = %event, delivery_id = %delivery_id, "accepted webhook delivery (no secret configured)");
            return Ok(AdmittedDelivery {
                event,
                delivery_id,
                admission: Admission::Unverified,
            });
        };

        let signature_256 = present(&headers.signature_256);
        let signature_sha1 = present(&headers.signature_sha1);

        if signature_256.is_none() && signature_sha1.is_none() {
            if let Some(relay) = self.trusted_relay(present(&headers.user_agent)) {
                warn!(
                    event = %event,
                    delivery_id = %delivery_id,
                    relay,
                    "accepted unsigned delivery from trusted relay, signature check bypassed"
                );
                let relay = relay.to_string();
                return Ok(AdmittedDelivery {
                    event,
                    delivery_id,
                    admission: Admission::RelayBypass { relay },
                });
            }
            let err = AdmissionError::MissingSignature;
            error!(event = %event, delivery_id = %delivery_id, error = %err, "rejected webhook delivery");
            return Err(err);
        }

        let Some(signature) = signature_256 else {
            let err = AdmissionError::UnsupportedSignature;
            error!(event = %event, delivery_id = %delivery_id, error = %err, "rejected webhook delivery");
            return Err(err);
        };

        if let Err(err) = verify_hmac_sha256_with_prefix(secret.expose_secret().as_bytes(), body, signature) {
            error!(event = %event, delivery_id = %delivery_id, error = %err, "rejected webhook delivery");
            return Err(err);
        }

        info!(event = %event, delivery_id = %delivery_id, "accepted webhook delivery (signature verified)");
        Ok(AdmittedDelivery {
            event,
            delivery_id,
            admission: Admission::Verified,
        })
    }

    /// The trusted relay whose literal substring appears in `user_agent`, if any.
    fn trusted_relay(&self, user_agent: Option<&str>) -> Option<&str> {
        let user_agent = user_agent?;
        self.trusted_relays
            .iter()
            .find(|relay| user_agent.contains(relay.as_str()))
            .map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
