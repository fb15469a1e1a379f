//! GitHub App and token authentication.
//!
//! An App authenticates each delivery by signing a short-lived RS256 JWT and
//! exchanging it for an installation access token. A static token skips the
//! exchange entirely.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use ignoreguard_types::error::VcsError;

use super::types::{AppClaims, InstallationToken};
use super::{response_error, transport_error, GitHubApp};

/// GitHub accepts App JWTs valid for at most ten minutes.
const JWT_TTL_SECS: i64 = 9 * 60;

/// Backdating of `iat` to tolerate clock drift against GitHub.
const JWT_BACKDATE_SECS: i64 = 60;

/// Credentials used for outbound GitHub calls.
#[derive(Debug)]
pub enum GitHubCredentials {
    /// GitHub App id plus its RSA private key in PEM form.
    App { app_id: u64, private_key: SecretString },
    /// A personal or installation access token used as-is.
    Token(SecretString),
}

/// Errors building credentials at startup.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no GitHub credentials configured (set APP_ID and PRIVATE_KEY or PRIVATE_KEY_PATH, or GITHUB_TOKEN)")]
    MissingCredentials,

    #[error("invalid GitHub App private key: {0}")]
    InvalidPrivateKey(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl GitHubCredentials {
    /// Pick credentials from the configured values. App credentials win over a token.
    ///
    /// A literal `\n` in `private_key` is turned into a newline so the PEM
    /// can be passed through a single-line environment variable.
    pub fn from_parts(
        app_id: Option<u64>,
        private_key: Option<String>,
        token: Option<String>,
    ) -> Result<Self, AuthError> {
        match (app_id, private_key, token) {
            (Some(app_id), Some(key), _) => Ok(GitHubCredentials::App {
                app_id,
                private_key: SecretString::from(key.replace("\\n", "\n")),
            }),
            (_, _, Some(token)) if !token.is_empty() => {
                Ok(GitHubCredentials::Token(SecretString::from(token)))
            }
            _ => Err(AuthError::MissingCredentials),
        }
    }
}

/// Parsed credentials ready to sign requests.
pub(crate) enum Signer {
    App { app_id: u64, key: EncodingKey },
    Token(SecretString),
}

impl Signer {
    pub(crate) fn from_credentials(credentials: GitHubCredentials) -> Result<Self, AuthError> {
        match credentials {
            GitHubCredentials::App { app_id, private_key } => {
                let key = EncodingKey::from_rsa_pem(private_key.expose_secret().as_bytes())
                    .map_err(|e| AuthError::InvalidPrivateKey(e.to_string()))?;
                Ok(Signer::App { app_id, key })
            }
            GitHubCredentials::Token(token) => Ok(Signer::Token(token)),
        }
    }

    pub(crate) fn app_id(&self) -> Option<u64> {
        match self {
            Signer::App { app_id, .. } => Some(*app_id),
            Signer::Token(_) => None,
        }
    }
}

/// Sign the App JWT used to request installation tokens.
pub(crate) fn app_jwt(app_id: u64, key: &EncodingKey) -> Result<String, VcsError> {
    let now = chrono::Utc::now().timestamp();
    let claims = AppClaims {
        iat: now - JWT_BACKDATE_SECS,
        exp: now + JWT_TTL_SECS,
        iss: app_id.to_string(),
    };
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, key)
        .map_err(|e| VcsError::Auth(format!("failed to sign app JWT: {e}")))
}

/// Exchange an App JWT for an installation access token.
pub(crate) async fn mint_installation_token(
    app: &GitHubApp,
    app_id: u64,
    key: &EncodingKey,
    installation_id: u64,
) -> Result<SecretString, VcsError> {
    let endpoint = format!("POST /app/installations/{installation_id}/access_tokens");
    let jwt = app_jwt(app_id, key)?;

    let response = app
        .request(
            Method::POST,
            &format!("/app/installations/{installation_id}/access_tokens"),
            &jwt,
        )
        .send()
        .await
        .map_err(|e| transport_error(&endpoint, e))?;

    if !response.status().is_success() {
        let err = response_error(&endpoint, response).await;
        return Err(VcsError::Auth(format!("installation token exchange failed: {err}")));
    }

    let token: InstallationToken = response.json().await.map_err(|e| VcsError::Decode {
        endpoint: endpoint.clone(),
        message: e.to_string(),
    })?;

    debug!(installation_id, "minted installation access token");
    Ok(SecretString::from(token.token))
}
