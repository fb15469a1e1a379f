//! GitHubClient -- concrete [`VcsClient`] implementation for the GitHub REST API.
//!
//! One client serves one delivery. The installation token is minted on the
//! first remote call and reused for the remaining calls of that delivery only.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::OnceCell;
use tracing::debug;

use ignoreguard_core::repository::vcs::{CommitReceipt, FileLookup, FileWrite, VcsClient};
use ignoreguard_types::error::VcsError;
use ignoreguard_types::event::RepoRef;

use super::types::{PullRequestFile, PutContentsRequest, PutContentsResponse};
use super::{response_error, transport_error, GitHubApp};

/// Page size for the pull-request files listing (GitHub's maximum).
const FILES_PER_PAGE: usize = 100;

/// GitHub stops listing pull-request files after 3000 entries.
const MAX_FILE_PAGES: u32 = 30;

pub struct GitHubClient {
    app: Arc<GitHubApp>,
    installation_id: Option<u64>,
    token: OnceCell<SecretString>,
}

impl GitHubClient {
    pub(crate) fn new(app: Arc<GitHubApp>, installation_id: Option<u64>) -> Self {
        Self {
            app,
            installation_id,
            token: OnceCell::new(),
        }
    }

    async fn token(&self) -> Result<&str, VcsError> {
        let token = self
            .token
            .get_or_try_init(|| self.app.access_token(self.installation_id))
            .await?;
        Ok(token.expose_secret())
    }
}

impl VcsClient for GitHubClient {
    async fn get_file(&self, repo: &RepoRef, path: &str, git_ref: &str) -> Result<FileLookup, VcsError> {
        let route = format!("/repos/{}/{}/contents/{}", repo.owner, repo.name, path);
        let endpoint = format!("GET {route}");
        let token = self.token().await?;

        let response = self
            .app
            .request(Method::GET, &route, token)
            .query(&[("ref", git_ref)])
            .send()
            .await
            .map_err(|e| transport_error(&endpoint, e))?;

        match response.status() {
            status if status.is_success() => Ok(FileLookup::Found),
            StatusCode::NOT_FOUND => {
                debug!(%endpoint, git_ref, "file not found");
                Ok(FileLookup::NotFound)
            }
            _ => Err(response_error(&endpoint, response).await),
        }
    }

    async fn list_pull_request_files(&self, repo: &RepoRef, number: u64) -> Result<Vec<String>, VcsError> {
        let route = format!("/repos/{}/{}/pulls/{}/files", repo.owner, repo.name, number);
        let endpoint = format!("GET {route}");
        let token = self.token().await?;

        let mut files = Vec::new();
        for page in 1..=MAX_FILE_PAGES {
            let response = self
                .app
                .request(Method::GET, &route, token)
                .query(&[("per_page", FILES_PER_PAGE.to_string()), ("page", page.to_string())])
                .send()
                .await
                .map_err(|e| transport_error(&endpoint, e))?;

            if !response.status().is_success() {
                return Err(response_error(&endpoint, response).await);
            }

            let batch: Vec<PullRequestFile> = response.json().await.map_err(|e| VcsError::Decode {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

            let count = batch.len();
            files.extend(batch.into_iter().map(|f| f.filename));
            if count < FILES_PER_PAGE {
                break;
            }
        }

        debug!(%endpoint, files = files.len(), "listed pull request files");
        Ok(files)
    }

    async fn put_file(&self, repo: &RepoRef, write: &FileWrite) -> Result<CommitReceipt, VcsError> {
        let route = format!("/repos/{}/{}/contents/{}", repo.owner, repo.name, write.path);
        let endpoint = format!("PUT {route}");
        let token = self.token().await?;

        let body = PutContentsRequest {
            message: &write.message,
            content: STANDARD.encode(write.content.as_bytes()),
            branch: &write.branch,
        };

        let response = self
            .app
            .request(Method::PUT, &route, token)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&endpoint, e))?;

        if !response.status().is_success() {
            return Err(response_error(&endpoint, response).await);
        }

        // The write already happened; an unreadable body only loses the sha.
        let commit_sha = response
            .json::<PutContentsResponse>()
            .await
            .ok()
            .and_then(|r| r.commit)
            .map(|c| c.sha);

        Ok(CommitReceipt { commit_sha })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode as HttpStatus};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::github::GitHubCredentials;

    const TEST_KEY: &str = include_str!("fixtures/test_app_key.pem");

    // -------------------------------------------------------------------
    // In-process fake of the GitHub REST API
    // -------------------------------------------------------------------

    #[derive(Clone, Default)]
    struct Fake {
        auth: Arc<Mutex<Vec<String>>>,
        pages: Arc<Mutex<Vec<String>>>,
        puts: Arc<Mutex<Vec<Value>>>,
        token_requests: Arc<Mutex<Vec<String>>>,
    }

    fn bearer(headers: &HeaderMap) -> String {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn contents(
        State(fake): State<Fake>,
        Path((_owner, repo, _path)): Path<(String, String, String)>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Response {
        fake.auth.lock().unwrap().push(bearer(&headers));

        if repo == "limited" {
            return (
                HttpStatus::FORBIDDEN,
                [("x-ratelimit-remaining", "0")],
                Json(json!({ "message": "API rate limit exceeded" })),
            )
                .into_response();
        }

        match query.get("ref").map(String::as_str) {
            Some("master") => Json(json!({ "type": "file", "path": ".cursorignore" })).into_response(),
            Some("broken") => (
                HttpStatus::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Server Error" })),
            )
                .into_response(),
            _ => (HttpStatus::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response(),
        }
    }

    async fn put_contents(
        State(fake): State<Fake>,
        Path((_owner, repo, _path)): Path<(String, String, String)>,
        Json(body): Json<Value>,
    ) -> Response {
        if repo == "protected" {
            return (
                HttpStatus::CONFLICT,
                Json(json!({ "message": "feature-x is at 000 but expected 111" })),
            )
                .into_response();
        }
        fake.puts.lock().unwrap().push(body);
        (
            HttpStatus::CREATED,
            Json(json!({ "content": { "sha": "blob1" }, "commit": { "sha": "abc123" } })),
        )
            .into_response()
    }

    async fn pull_files(
        State(fake): State<Fake>,
        Path((_owner, _repo, _number)): Path<(String, String, u64)>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        let page = query.get("page").cloned().unwrap_or_default();
        fake.pages.lock().unwrap().push(page.clone());

        let files: Vec<Value> = if page == "1" {
            (0..100).map(|i| json!({ "filename": format!("src/file{i}.rs") })).collect()
        } else {
            vec![json!({ "filename": ".cursorignore" })]
        };
        Json(Value::Array(files))
    }

    async fn access_tokens(
        State(fake): State<Fake>,
        Path(id): Path<u64>,
        headers: HeaderMap,
    ) -> Response {
        fake.token_requests.lock().unwrap().push(bearer(&headers));
        if id == 404 {
            return (HttpStatus::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response();
        }
        (
            HttpStatus::CREATED,
            Json(json!({ "token": "ghs_installation", "expires_at": "2030-01-01T00:00:00Z" })),
        )
            .into_response()
    }

    async fn spawn_fake() -> (String, Fake) {
        let fake = Fake::default();
        let router = Router::new()
            .route(
                "/repos/{owner}/{repo}/contents/{*path}",
                get(contents).put(put_contents),
            )
            .route("/repos/{owner}/{repo}/pulls/{number}/files", get(pull_files))
            .route("/app/installations/{id}/access_tokens", post(access_tokens))
            .with_state(fake.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{addr}"), fake)
    }

    fn token_app(base: &str) -> Arc<GitHubApp> {
        Arc::new(
            GitHubApp::new(
                base,
                GitHubCredentials::Token(SecretString::from("ghp_static".to_string())),
            )
            .unwrap(),
        )
    }

    fn repo(name: &str) -> RepoRef {
        RepoRef::new("acme", name)
    }

    // -------------------------------------------------------------------
    // get_file
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_get_file_found() {
        let (base, fake) = spawn_fake().await;
        let client = token_app(&base).client_for(None);

        let lookup = client.get_file(&repo("widgets"), ".cursorignore", "master").await.unwrap();

        assert_eq!(lookup, FileLookup::Found);
        assert_eq!(fake.auth.lock().unwrap().as_slice(), ["Bearer ghp_static"]);
    }

    #[tokio::test]
    async fn test_get_file_not_found_is_not_an_error() {
        let (base, _fake) = spawn_fake().await;
        let client = token_app(&base).client_for(None);

        let lookup = client.get_file(&repo("widgets"), ".cursorignore", "duet").await.unwrap();

        assert_eq!(lookup, FileLookup::NotFound);
    }

    #[tokio::test]
    async fn test_get_file_server_error_propagates() {
        let (base, _fake) = spawn_fake().await;
        let client = token_app(&base).client_for(None);

        let err = client
            .get_file(&repo("widgets"), ".cursorignore", "broken")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("Server Error"));
    }

    #[tokio::test]
    async fn test_get_file_rate_limited() {
        let (base, _fake) = spawn_fake().await;
        let client = token_app(&base).client_for(None);

        let err = client
            .get_file(&repo("limited"), ".cursorignore", "master")
            .await
            .unwrap_err();

        assert!(matches!(err, VcsError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = token_app(&format!("http://{addr}")).client_for(None);
        let err = client
            .get_file(&repo("widgets"), ".cursorignore", "master")
            .await
            .unwrap_err();

        assert!(matches!(err, VcsError::Transport { .. }));
    }

    // -------------------------------------------------------------------
    // list_pull_request_files
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_list_files_follows_pages() {
        let (base, fake) = spawn_fake().await;
        let client = token_app(&base).client_for(None);

        let files = client.list_pull_request_files(&repo("widgets"), 9).await.unwrap();

        assert_eq!(files.len(), 101);
        assert_eq!(files.last().map(String::as_str), Some(".cursorignore"));
        assert_eq!(fake.pages.lock().unwrap().as_slice(), ["1", "2"]);
    }

    // -------------------------------------------------------------------
    // put_file
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_put_file_sends_base64_to_branch() {
        let (base, fake) = spawn_fake().await;
        let client = token_app(&base).client_for(None);

        let write = FileWrite {
            path: ".cursorignore".to_string(),
            content: "conf/\nbuild/\n".to_string(),
            message: "Add .cursorignore for the master branch".to_string(),
            branch: "feature-x".to_string(),
        };
        let receipt = client.put_file(&repo("widgets"), &write).await.unwrap();

        assert_eq!(receipt.commit_sha.as_deref(), Some("abc123"));

        let puts = fake.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0]["branch"], "feature-x");
        assert_eq!(puts[0]["message"], "Add .cursorignore for the master branch");
        let decoded = STANDARD.decode(puts[0]["content"].as_str().unwrap()).unwrap();
        assert_eq!(decoded, b"conf/\nbuild/\n");
    }

    #[tokio::test]
    async fn test_put_file_conflict_is_error() {
        let (base, _fake) = spawn_fake().await;
        let client = token_app(&base).client_for(None);

        let write = FileWrite {
            path: ".cursorignore".to_string(),
            content: "x".to_string(),
            message: "m".to_string(),
            branch: "feature-x".to_string(),
        };
        let err = client.put_file(&repo("protected"), &write).await.unwrap_err();

        assert_eq!(err.status(), Some(409));
    }

    // -------------------------------------------------------------------
    // GitHub App installation tokens
    // -------------------------------------------------------------------

    fn app_credentials() -> GitHubCredentials {
        GitHubCredentials::App {
            app_id: 4242,
            private_key: SecretString::from(TEST_KEY.to_string()),
        }
    }

    #[tokio::test]
    async fn test_app_mints_token_once_per_client() {
        let (base, fake) = spawn_fake().await;
        let app = Arc::new(GitHubApp::new(&base, app_credentials()).unwrap());
        assert_eq!(app.app_id(), Some(4242));

        let client = app.client_for(Some(77));
        client.get_file(&repo("widgets"), ".cursorignore", "duet").await.unwrap();
        client.list_pull_request_files(&repo("widgets"), 3).await.unwrap();

        let token_requests = fake.token_requests.lock().unwrap().clone();
        assert_eq!(token_requests.len(), 1);
        assert!(token_requests[0].starts_with("Bearer "));
        assert_eq!(token_requests[0].split('.').count(), 3);
        assert_eq!(fake.auth.lock().unwrap().as_slice(), ["Bearer ghs_installation"]);
    }

    #[tokio::test]
    async fn test_app_mints_fresh_token_per_delivery() {
        let (base, fake) = spawn_fake().await;
        let app = Arc::new(GitHubApp::new(&base, app_credentials()).unwrap());

        app.client_for(Some(77))
            .get_file(&repo("widgets"), ".cursorignore", "master")
            .await
            .unwrap();
        app.client_for(Some(77))
            .get_file(&repo("widgets"), ".cursorignore", "master")
            .await
            .unwrap();

        assert_eq!(fake.token_requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_app_without_installation_id_fails() {
        let (base, fake) = spawn_fake().await;
        let app = Arc::new(GitHubApp::new(&base, app_credentials()).unwrap());

        let err = app
            .client_for(None)
            .get_file(&repo("widgets"), ".cursorignore", "master")
            .await
            .unwrap_err();

        assert!(matches!(err, VcsError::Auth(_)));
        assert!(fake.auth.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_app_token_exchange_failure_is_auth_error() {
        let (base, fake) = spawn_fake().await;
        let app = Arc::new(GitHubApp::new(&base, app_credentials()).unwrap());

        let err = app
            .client_for(Some(404))
            .get_file(&repo("widgets"), ".cursorignore", "master")
            .await
            .unwrap_err();

        assert!(matches!(err, VcsError::Auth(_)));
        assert!(fake.auth.lock().unwrap().is_empty());
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let app = token_app("https://ghe.example.com/api/v3/");
        assert_eq!(app.api_base(), "https://ghe.example.com/api/v3");
        assert_eq!(app.app_id(), None);
    }
}
