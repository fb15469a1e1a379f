use thiserror::Error;

/// Errors from calls to the version-control service.
///
/// "File not found" is not an error; lookups report it as a normal result so
/// it can never be confused with a failed call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VcsError {
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{endpoint} returned HTTP {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limit exceeded on {endpoint}")]
    RateLimited { endpoint: String },

    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl VcsError {
    /// HTTP status of the failed call, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            VcsError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors loading the default compliance-file body.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors loading the policy file.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid policy: {0}")]
    Invalid(String),
}
