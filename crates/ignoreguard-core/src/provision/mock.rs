//! Recording test doubles for the workflow ports.

use std::sync::Mutex;

use ignoreguard_types::error::{TemplateError, VcsError};
use ignoreguard_types::event::{PullRequestAction, PullRequestEvent, RepoRef};

use crate::repository::template::TemplateSource;
use crate::repository::vcs::{CommitReceipt, FileLookup, FileWrite, VcsClient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetFile { path: String, git_ref: String },
    ListFiles { number: u64 },
    PutFile(FileWrite),
}

/// A `VcsClient` with scripted answers that records every call.
///
/// Successful writes are remembered: later `list_pull_request_files` calls
/// include the written path, modelling the file now being part of the PR.
pub struct MockVcs {
    target: Result<FileLookup, VcsError>,
    pr_files: Result<Vec<String>, VcsError>,
    put: Result<CommitReceipt, VcsError>,
    calls: Mutex<Vec<Call>>,
    written: Mutex<Vec<String>>,
}

impl MockVcs {
    pub fn new() -> Self {
        Self {
            target: Ok(FileLookup::NotFound),
            pr_files: Ok(Vec::new()),
            put: Ok(CommitReceipt {
                commit_sha: Some("c0ffee".to_string()),
            }),
            calls: Mutex::new(Vec::new()),
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn with_target(mut self, target: Result<FileLookup, VcsError>) -> Self {
        self.target = target;
        self
    }

    pub fn with_pr_files(mut self, files: Result<Vec<String>, VcsError>) -> Self {
        self.pr_files = files;
        self
    }

    pub fn with_put(mut self, put: Result<CommitReceipt, VcsError>) -> Self {
        self.put = put;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn puts(&self) -> Vec<FileWrite> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::PutFile(w) => Some(w),
                _ => None,
            })
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::ListFiles { .. }))
            .count()
    }
}

impl VcsClient for MockVcs {
    async fn get_file(
        &self,
        _repo: &RepoRef,
        path: &str,
        git_ref: &str,
    ) -> Result<FileLookup, VcsError> {
        self.calls.lock().unwrap().push(Call::GetFile {
            path: path.to_string(),
            git_ref: git_ref.to_string(),
        });
        self.target.clone()
    }

    async fn list_pull_request_files(
        &self,
        _repo: &RepoRef,
        number: u64,
    ) -> Result<Vec<String>, VcsError> {
        self.calls.lock().unwrap().push(Call::ListFiles { number });
        let mut files = self.pr_files.clone()?;
        files.extend(self.written.lock().unwrap().iter().cloned());
        Ok(files)
    }

    async fn put_file(
        &self,
        _repo: &RepoRef,
        write: &FileWrite,
    ) -> Result<CommitReceipt, VcsError> {
        self.calls.lock().unwrap().push(Call::PutFile(write.clone()));
        let receipt = self.put.clone()?;
        self.written.lock().unwrap().push(write.path.clone());
        Ok(receipt)
    }
}

/// A `TemplateSource` returning fixed content, or failing when `None`.
pub struct StaticTemplate(pub Option<String>);

impl TemplateSource for StaticTemplate {
    async fn load(&self) -> Result<String, TemplateError> {
        self.0.clone().ok_or_else(|| TemplateError::Read {
            path: "templates/.cursorignore".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        })
    }
}

pub fn event(target_branch: &str) -> PullRequestEvent {
    PullRequestEvent {
        delivery_id: "delivery-1".to_string(),
        action: PullRequestAction::Opened,
        number: 17,
        target_branch: target_branch.to_string(),
        source_branch: "feature-x".to_string(),
        repo: RepoRef::new("acme", "widgets"),
        installation_id: Some(4),
    }
}

pub fn server_error() -> VcsError {
    VcsError::Status {
        endpoint: "GET /repos/acme/widgets/contents/.cursorignore".to_string(),
        status: 500,
        message: "Internal Server Error".to_string(),
    }
}
