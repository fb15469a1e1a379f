use ignoreguard_types::outcome::{ExistenceResult, PrPresence, ProvisioningOutcome};

/// What the workflow should do after the existence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Stop with this outcome; no write is performed.
    Skip(ProvisioningOutcome),
    /// The file is missing in both places and must be committed.
    Commit,
}

/// Fold the existence facts into a decision. Pure.
pub fn decide(existence: &ExistenceResult) -> Decision {
    match existence {
        ExistenceResult::PresentInTarget => Decision::Skip(ProvisioningOutcome::SkippedAlreadyInRepo),
        ExistenceResult::AbsentInTarget(PrPresence::Present) => {
            Decision::Skip(ProvisioningOutcome::SkippedAlreadyInPr)
        }
        ExistenceResult::AbsentInTarget(PrPresence::Absent) => Decision::Commit,
        ExistenceResult::AbsentInTarget(PrPresence::CheckFailed(reason)) => Decision::Skip(
            ProvisioningOutcome::Failed(format!("pull request file check failed: {reason}")),
        ),
    }
}
