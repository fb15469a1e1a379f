//! Branch and compliance-file policy.
//!
//! Both values are built once at startup and shared read-only across all
//! concurrent deliveries.

use std::collections::BTreeSet;
use std::fmt;

/// Branches policed when no policy file overrides them.
pub const DEFAULT_BRANCHES: [&str; 3] = ["master", "duet", "cocome"];

/// Repository path of the compliance file.
pub const COMPLIANCE_FILE_PATH: &str = ".cursorignore";

/// Body committed when the bundled template cannot be read.
pub const FALLBACK_CONTENT: &str = "conf/\nbuild/\ntools/\nscripts/\ndeploy/";

/// User-agent substrings of relays allowed to forward unsigned deliveries.
pub const DEFAULT_TRUSTED_RELAYS: [&str; 1] = ["smee"];

/// Set of target branches eligible for policing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchAllowlist {
    branches: BTreeSet<String>,
}

impl BranchAllowlist {
    pub fn new<I, S>(branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            branches: branches.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, branch: &str) -> bool {
        self.branches.contains(branch)
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.branches.iter().map(String::as_str)
    }
}

impl Default for BranchAllowlist {
    fn default() -> Self {
        Self::new(DEFAULT_BRANCHES)
    }
}

impl fmt::Display for BranchAllowlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join("/"))
    }
}

/// The compliance file the workflow provisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceFileSpec {
    path: String,
}

impl ComplianceFileSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Repository path, identical for the target-branch and PR-files checks.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn fallback_content(&self) -> &'static str {
        FALLBACK_CONTENT
    }

    /// Commit message naming the target branch the policy applies to.
    pub fn commit_message(&self, target_branch: &str) -> String {
        format!("Add {} for the {target_branch} branch", self.path)
    }
}

impl Default for ComplianceFileSpec {
    fn default() -> Self {
        Self::new(COMPLIANCE_FILE_PATH)
    }
}

/// Read-only context injected into the provisioning workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisioningPolicy {
    pub allowlist: BranchAllowlist,
    pub file: ComplianceFileSpec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowlist() {
        let allowlist = BranchAllowlist::default();
        assert_eq!(allowlist.len(), 3);
        assert!(allowlist.contains("master"));
        assert!(allowlist.contains("duet"));
        assert!(allowlist.contains("cocome"));
        assert!(!allowlist.contains("develop"));
    }

    #[test]
    fn test_allowlist_is_case_sensitive() {
        let allowlist = BranchAllowlist::default();
        assert!(!allowlist.contains("Master"));
        assert!(!allowlist.contains("master "));
    }

    #[test]
    fn test_allowlist_display() {
        let allowlist = BranchAllowlist::new(["main", "release"]);
        assert_eq!(allowlist.to_string(), "main/release");
    }

    #[test]
    fn test_commit_message_names_target_branch() {
        let file = ComplianceFileSpec::default();
        assert_eq!(file.path(), ".cursorignore");
        assert_eq!(
            file.commit_message("duet"),
            "Add .cursorignore for the duet branch"
        );
    }

    #[test]
    fn test_fallback_content() {
        let file = ComplianceFileSpec::default();
        assert_eq!(file.fallback_content(), "conf/\nbuild/\ntools/\nscripts/\ndeploy/");
    }
}
