//! Workflow orchestrator for one pull-request event.
//!
//! ```text
//! Received -> Filtered{skip|continue} -> RepoChecked{skip|continue}
//!          -> PrChecked{skip|continue} -> Committing -> Done
//! ```
//!
//! `Error` is reachable from every state after `Received`. Every path
//! terminates and at most one write is issued per run.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, info_span, Instrument};

use ignoreguard_types::event::PullRequestEvent;
use ignoreguard_types::outcome::{ExistenceResult, ProvisioningOutcome};
use ignoreguard_types::policy::ProvisioningPolicy;

use super::committer::{commit_file, resolve_content};
use super::decision::{decide, Decision};
use super::filter::should_process;
use super::oracle::check_existence;
use crate::repository::template::TemplateSource;
use crate::repository::vcs::{FileWrite, VcsClient};

/// States of the provisioning state machine, used as the `stage` log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Received,
    Filtered,
    RepoChecked,
    PrChecked,
    Committing,
    Done,
    Error,
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowStage::Received => "received",
            WorkflowStage::Filtered => "filtered",
            WorkflowStage::RepoChecked => "repo_checked",
            WorkflowStage::PrChecked => "pr_checked",
            WorkflowStage::Committing => "committing",
            WorkflowStage::Done => "done",
            WorkflowStage::Error => "error",
        };
        f.write_str(s)
    }
}

/// Runs the provisioning workflow against an injected policy and template source.
///
/// Holds no mutable state; one instance is shared by all concurrent deliveries.
pub struct Provisioner<T> {
    policy: Arc<ProvisioningPolicy>,
    templates: T,
}

impl<T: TemplateSource> Provisioner<T> {
    pub fn new(policy: Arc<ProvisioningPolicy>, templates: T) -> Self {
        Self { policy, templates }
    }

    pub fn policy(&self) -> &ProvisioningPolicy {
        &self.policy
    }

    /// Handle one event end to end and return its terminal outcome.
    ///
    /// Never panics or propagates errors; failures become
    /// [`ProvisioningOutcome::Failed`] after being logged.
    pub async fn run<V: VcsClient>(&self, vcs: &V, event: &PullRequestEvent) -> ProvisioningOutcome {
        let span = info_span!(
            "provision",
            delivery_id = %event.delivery_id,
            repo = %event.repo,
            pr = event.number,
            target_branch = %event.target_branch,
        );

        let outcome = self.drive(vcs, event).instrument(span.clone()).await;

        span.in_scope(|| match &outcome {
            ProvisioningOutcome::Failed(reason) => {
                error!(stage = %WorkflowStage::Error, outcome = outcome.as_str(), reason = %reason, "provisioning failed");
            }
            _ => {
                info!(stage = %WorkflowStage::Done, outcome = outcome.as_str(), "provisioning finished");
            }
        });

        outcome
    }

    async fn drive<V: VcsClient>(&self, vcs: &V, event: &PullRequestEvent) -> ProvisioningOutcome {
        info!(
            stage = %WorkflowStage::Received,
            action = event.action.as_str(),
            "handling pull request"
        );

        if !should_process(&self.policy.allowlist, &event.target_branch) {
            info!(
                stage = %WorkflowStage::Filtered,
                policed = %self.policy.allowlist,
                "target branch is not policed, skipping"
            );
            return ProvisioningOutcome::SkippedWrongBranch;
        }

        let file = &self.policy.file;
        let existence = match check_existence(
            vcs,
            &event.repo,
            file.path(),
            &event.target_branch,
            event.number,
        )
        .await
        {
            Ok(existence) => existence,
            Err(e) => {
                error!(stage = %WorkflowStage::Error, status = e.status(), error = %e, "target branch lookup failed");
                return ProvisioningOutcome::Failed(format!("target branch lookup failed: {e}"));
            }
        };

        let stage = match existence {
            ExistenceResult::PresentInTarget => WorkflowStage::RepoChecked,
            ExistenceResult::AbsentInTarget(_) => WorkflowStage::PrChecked,
        };

        match decide(&existence) {
            Decision::Skip(outcome) => {
                info!(stage = %stage, outcome = outcome.as_str(), "no commit needed");
                return outcome;
            }
            Decision::Commit => {}
        }

        info!(
            stage = %WorkflowStage::Committing,
            source_branch = %event.source_branch,
            path = file.path(),
            "compliance file missing from branch and pull request, committing default"
        );

        let write = FileWrite {
            path: file.path().to_string(),
            content: resolve_content(&self.templates, file).await,
            message: file.commit_message(&event.target_branch),
            branch: event.source_branch.clone(),
        };

        commit_file(vcs, &event.repo, &write).await
    }
}
