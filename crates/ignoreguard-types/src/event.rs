//! Pull-request events and the webhook payload they are built from.
//!
//! Only the fields the provisioning workflow reads are deserialized; the rest
//! of GitHub's `pull_request` payload is ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The pull-request actions the bot subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestAction {
    Opened,
    Reopened,
}

impl PullRequestAction {
    /// Map a payload `action` string to a subscribed action.
    ///
    /// Returns `None` for every action the bot does not handle
    /// (`closed`, `synchronize`, `edited`, ...).
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "opened" => Some(PullRequestAction::Opened),
            "reopened" => Some(PullRequestAction::Reopened),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestAction::Opened => "opened",
            PullRequestAction::Reopened => "reopened",
        }
    }
}

impl fmt::Display for PullRequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pull_request.{}", self.as_str())
    }
}

/// Owner/name pair identifying a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A subscribed pull-request event, immutable for one workflow execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestEvent {
    /// `X-GitHub-Delivery` of the webhook that carried the event.
    pub delivery_id: String,
    pub action: PullRequestAction,
    pub number: u64,
    /// Branch the pull request merges into (`base.ref`).
    pub target_branch: String,
    /// Branch the pull request is opened from (`head.ref`).
    pub source_branch: String,
    pub repo: RepoRef,
    /// GitHub App installation the delivery belongs to, if any.
    pub installation_id: Option<u64>,
}

// ---------------------------------------------------------------------------
// Webhook payload
// ---------------------------------------------------------------------------

/// The subset of a GitHub `pull_request` webhook payload the bot consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub action: String,
    pub pull_request: PullRequestBody,
    pub repository: RepositoryBody,
    #[serde(default)]
    pub installation: Option<InstallationBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestBody {
    pub number: u64,
    pub base: BranchRef,
    pub head: BranchRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub git_ref: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryBody {
    pub name: String,
    pub owner: OwnerBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerBody {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallationBody {
    pub id: u64,
}

impl PullRequestPayload {
    /// Convert the payload into a [`PullRequestEvent`].
    ///
    /// Returns `None` when the payload's action is not one the bot subscribes to.
    pub fn into_event(self, delivery_id: &str) -> Option<PullRequestEvent> {
        let action = PullRequestAction::from_action(&self.action)?;
        Some(PullRequestEvent {
            delivery_id: delivery_id.to_string(),
            action,
            number: self.pull_request.number,
            target_branch: self.pull_request.base.git_ref,
            source_branch: self.pull_request.head.git_ref,
            repo: RepoRef::new(self.repository.owner.login, self.repository.name),
            installation_id: self.installation.map(|i| i.id),
        })
    }
}
