//! Version-control service trait definition.

use ignoreguard_types::error::VcsError;
use ignoreguard_types::event::RepoRef;

/// Result of looking a file up on a ref.
///
/// Not-found is a normal answer here; only failed calls return `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLookup {
    Found,
    NotFound,
}

/// A full-content create-or-update write of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    pub path: String,
    /// Plain file content; transport encoding is the adapter's concern.
    pub content: String,
    pub message: String,
    pub branch: String,
}

/// What the service reports back after a successful write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    pub commit_sha: Option<String>,
}

/// The three remote operations the provisioning workflow needs.
///
/// One client instance serves exactly one delivery, so implementations may
/// hold per-delivery state such as an installation token.
pub trait VcsClient: Send + Sync {
    /// Look up `path` at the tip of `git_ref`.
    fn get_file(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: &str,
    ) -> impl std::future::Future<Output = Result<FileLookup, VcsError>> + Send;

    /// List the paths of every file changed by pull request `number`.
    fn list_pull_request_files(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> impl std::future::Future<Output = Result<Vec<String>, VcsError>> + Send;

    /// Create or update a file on a branch.
    fn put_file(
        &self,
        repo: &RepoRef,
        write: &FileWrite,
    ) -> impl std::future::Future<Output = Result<CommitReceipt, VcsError>> + Send;
}
