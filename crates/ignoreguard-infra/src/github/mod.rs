//! GitHub REST adapter.
//!
//! [`GitHubApp`] is built once at startup and owns the HTTP client and the
//! credentials. [`GitHubApp::client_for`] hands out a [`GitHubClient`] per
//! delivery; that client implements the core `VcsClient` port and mints its
//! installation token lazily on the first remote call.

pub mod auth;
pub mod client;
mod types;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};

use ignoreguard_types::error::VcsError;

pub use auth::{AuthError, GitHubCredentials};
pub use client::GitHubClient;

/// Default public GitHub API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("ignoreguard/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";

/// Per-request timeout; the workflow has no timeout of its own.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared GitHub connection settings and credentials.
pub struct GitHubApp {
    http: reqwest::Client,
    api_base: String,
    signer: auth::Signer,
}

impl GitHubApp {
    /// Build the shared client.
    ///
    /// # Errors
    ///
    /// Fails if the App private key is not a valid RSA PEM or the HTTP
    /// client cannot be constructed.
    pub fn new(api_base: impl Into<String>, credentials: GitHubCredentials) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AuthError::HttpClient(e.to_string()))?;

        let api_base = api_base.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            api_base,
            signer: auth::Signer::from_credentials(credentials)?,
        })
    }

    /// GitHub App id, when authenticating as an App.
    pub fn app_id(&self) -> Option<u64> {
        self.signer.app_id()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// A client scoped to one delivery's installation.
    pub fn client_for(self: &Arc<Self>, installation_id: Option<u64>) -> GitHubClient {
        GitHubClient::new(Arc::clone(self), installation_id)
    }

    /// Resolve the bearer token for an installation.
    pub(crate) async fn access_token(&self, installation_id: Option<u64>) -> Result<SecretString, VcsError> {
        match &self.signer {
            auth::Signer::Token(token) => Ok(SecretString::from(token.expose_secret().to_string())),
            auth::Signer::App { app_id, key } => {
                let installation_id = installation_id.ok_or_else(|| {
                    VcsError::Auth("delivery carries no installation id".to_string())
                })?;
                auth::mint_installation_token(self, *app_id, key, installation_id).await
            }
        }
    }

    /// A request to `path` (relative to the API base) with GitHub's headers set.
    pub(crate) fn request(&self, method: Method, path: &str, bearer: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_base, path))
            .bearer_auth(bearer)
            .header(ACCEPT, MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

/// Map a transport-level reqwest failure.
pub(crate) fn transport_error(endpoint: &str, err: reqwest::Error) -> VcsError {
    VcsError::Transport {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    }
}

/// Map a non-success response, reading GitHub's `{"message": ...}` body when present.
pub(crate) async fn response_error(endpoint: &str, response: reqwest::Response) -> VcsError {
    let status = response.status();
    let rate_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        == Some("0");

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<types::ApiErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());

    match status.as_u16() {
        429 => VcsError::RateLimited {
            endpoint: endpoint.to_string(),
        },
        403 if rate_exhausted => VcsError::RateLimited {
            endpoint: endpoint.to_string(),
        },
        401 => VcsError::Auth(message),
        code => VcsError::Status {
            endpoint: endpoint.to_string(),
            status: code,
            message,
        },
    }
}
