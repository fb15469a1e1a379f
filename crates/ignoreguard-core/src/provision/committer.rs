//! The single write action of the workflow.

use tracing::{error, info, warn};

use ignoreguard_types::event::RepoRef;
use ignoreguard_types::outcome::ProvisioningOutcome;
use ignoreguard_types::policy::ComplianceFileSpec;

use crate::repository::template::TemplateSource;
use crate::repository::vcs::{FileWrite, VcsClient};

/// Load the default body, substituting the fallback when the template is unreadable.
pub async fn resolve_content<T: TemplateSource>(templates: &T, file: &ComplianceFileSpec) -> String {
    match templates.load().await {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, "template unavailable, using fallback content");
            file.fallback_content().to_string()
        }
    }
}

/// Create or update the file once on the write's branch.
///
/// Failures are logged and returned as [`ProvisioningOutcome::Failed`]; there
/// is no retry.
pub async fn commit_file<V: VcsClient>(vcs: &V, repo: &RepoRef, write: &FileWrite) -> ProvisioningOutcome {
    match vcs.put_file(repo, write).await {
        Ok(receipt) => {
            info!(
                path = %write.path,
                branch = %write.branch,
                commit_sha = receipt.commit_sha.as_deref().unwrap_or("unknown"),
                "compliance file committed"
            );
            ProvisioningOutcome::Committed
        }
        Err(e) => {
            error!(
                path = %write.path,
                branch = %write.branch,
                status = e.status(),
                error = %e,
                "failed to commit compliance file"
            );
            ProvisioningOutcome::Failed(format!("commit failed: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::mock::{MockVcs, StaticTemplate};
    use ignoreguard_types::error::VcsError;

    fn write() -> FileWrite {
        FileWrite {
            path: ".cursorignore".to_string(),
            content: "build/\n".to_string(),
            message: "Add .cursorignore for the master branch".to_string(),
            branch: "feature-x".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolve_content_uses_template() {
        let templates = StaticTemplate(Some("node_modules/\n".to_string()));
        let content = resolve_content(&templates, &ComplianceFileSpec::default()).await;
        assert_eq!(content, "node_modules/\n");
    }

    #[tokio::test]
    async fn test_resolve_content_falls_back() {
        let templates = StaticTemplate(None);
        let content = resolve_content(&templates, &ComplianceFileSpec::default()).await;
        assert_eq!(content, "conf/\nbuild/\ntools/\nscripts/\ndeploy/");
    }

    #[tokio::test]
    async fn test_commit_file_success() {
        let vcs = MockVcs::new();
        let outcome = commit_file(&vcs, &RepoRef::new("acme", "widgets"), &write()).await;
        assert_eq!(outcome, ProvisioningOutcome::Committed);
        assert_eq!(vcs.puts(), vec![write()]);
    }

    #[tokio::test]
    async fn test_commit_file_failure_is_reported() {
        let vcs = MockVcs::new().with_put(Err(VcsError::Status {
            endpoint: "PUT /repos/acme/widgets/contents/.cursorignore".to_string(),
            status: 409,
            message: "branch head moved".to_string(),
        }));

        let outcome = commit_file(&vcs, &RepoRef::new("acme", "widgets"), &write()).await;

        match outcome {
            ProvisioningOutcome::Failed(reason) => assert!(reason.contains("409")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(vcs.puts().len(), 1);
    }
}
