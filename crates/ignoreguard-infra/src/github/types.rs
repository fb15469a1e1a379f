//! Wire shapes for the GitHub REST endpoints the bot calls.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}

/// One entry of `GET /repos/{owner}/{repo}/pulls/{number}/files`.
#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestFile {
    pub filename: String,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub(crate) struct PutContentsRequest<'a> {
    pub message: &'a str,
    /// Base64 of the full file content.
    pub content: String,
    pub branch: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PutContentsResponse {
    #[serde(default)]
    pub commit: Option<CommitBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitBody {
    pub sha: String,
}

/// Response of `POST /app/installations/{id}/access_tokens`.
#[derive(Debug, Deserialize)]
pub(crate) struct InstallationToken {
    pub token: String,
}

/// Claims of the App JWT.
#[derive(Debug, Serialize)]
pub(crate) struct AppClaims {
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}
