//! Transient values produced by one provisioning run.

use std::fmt;

/// Whether the compliance file is among the pull request's changed files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrPresence {
    Present,
    Absent,
    /// Listing the pull request's files failed; the reason is kept for logging.
    CheckFailed(String),
}

/// Combined result of the two existence checks.
///
/// The PR-files check only runs when the target branch lacks the file, so
/// there is no "present in target" variant carrying a [`PrPresence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistenceResult {
    PresentInTarget,
    AbsentInTarget(PrPresence),
}

/// Terminal value of one workflow run. Logged, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningOutcome {
    SkippedWrongBranch,
    SkippedAlreadyInRepo,
    SkippedAlreadyInPr,
    Committed,
    Failed(String),
}

impl ProvisioningOutcome {
    /// Stable snake_case label used as the `outcome` log field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisioningOutcome::SkippedWrongBranch => "skipped_wrong_branch",
            ProvisioningOutcome::SkippedAlreadyInRepo => "skipped_already_in_repo",
            ProvisioningOutcome::SkippedAlreadyInPr => "skipped_already_in_pr",
            ProvisioningOutcome::Committed => "committed",
            ProvisioningOutcome::Failed(_) => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ProvisioningOutcome::Failed(_))
    }
}

impl fmt::Display for ProvisioningOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisioningOutcome::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.as_str()),
        }
    }
}
