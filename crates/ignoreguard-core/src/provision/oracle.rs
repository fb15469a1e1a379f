//! Existence checks against the version-control service.

use tracing::{debug, error};

use ignoreguard_types::error::VcsError;
use ignoreguard_types::event::RepoRef;
use ignoreguard_types::outcome::{ExistenceResult, PrPresence};

use crate::repository::vcs::{FileLookup, VcsClient};

/// Determine whether `path` exists on the target branch or in the pull request.
///
/// Performs at most two remote calls:
/// 1. Look the file up at the tip of `target_branch`. Not-found means
///    absent; any other failure is returned as `Err` and is never read as
///    "absent".
/// 2. Only when (1) found nothing, list the pull request's changed files and
///    compare paths exactly. A failure here is reported as
///    [`PrPresence::CheckFailed`].
pub async fn check_existence<V: VcsClient>(
    vcs: &V,
    repo: &RepoRef,
    path: &str,
    target_branch: &str,
    pr_number: u64,
) -> Result<ExistenceResult, VcsError> {
    match vcs.get_file(repo, path, target_branch).await? {
        FileLookup::Found => {
            debug!(path, "compliance file present on target branch");
            return Ok(ExistenceResult::PresentInTarget);
        }
        FileLookup::NotFound => {
            debug!(path, "compliance file absent on target branch");
        }
    }

    let presence = match vcs.list_pull_request_files(repo, pr_number).await {
        Ok(files) if files.iter().any(|f| f == path) => PrPresence::Present,
        Ok(files) => {
            debug!(changed_files = files.len(), "compliance file not among changed files");
            PrPresence::Absent
        }
        Err(e) => {
            error!(error = %e, "failed to list pull request files");
            PrPresence::CheckFailed(e.to_string())
        }
    };

    Ok(ExistenceResult::AbsentInTarget(presence))
}
