//! The branch-scoped provisioning workflow.
//!
//! Leaves first: [`filter`] decides whether a target branch is policed,
//! [`oracle`] runs the two existence checks, [`decision`] folds them into an
//! intent, [`committer`] performs the single write, and [`workflow`] wires
//! them together for one pull-request event.

pub mod committer;
pub mod decision;
pub mod filter;
pub mod oracle;
pub mod workflow;

#[cfg(test)]
pub(crate) mod mock;

pub use workflow::{Provisioner, WorkflowStage};
