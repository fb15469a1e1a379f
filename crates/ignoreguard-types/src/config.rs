//! Policy file types for ignoreguard.
//!
//! `PolicyConfig` is the optional TOML file (`POLICY_FILE`) that overrides
//! the policed branches, the compliance-file path, and the trusted relay
//! user agents. Every field has a default, so an empty file is valid.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::policy::{
    BranchAllowlist, ComplianceFileSpec, ProvisioningPolicy, COMPLIANCE_FILE_PATH,
    DEFAULT_BRANCHES, DEFAULT_TRUSTED_RELAYS,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Target branches whose pull requests are policed.
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,

    /// Repository path of the compliance file.
    #[serde(default = "default_file_path")]
    pub file_path: String,

    /// User-agent substrings allowed to skip signature checks on unsigned deliveries.
    #[serde(default = "default_trusted_relays")]
    pub trusted_relays: Vec<String>,
}

fn default_branches() -> Vec<String> {
    DEFAULT_BRANCHES.iter().map(|b| b.to_string()).collect()
}

fn default_file_path() -> String {
    COMPLIANCE_FILE_PATH.to_string()
}

fn default_trusted_relays() -> Vec<String> {
    DEFAULT_TRUSTED_RELAYS.iter().map(|r| r.to_string()).collect()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            branches: default_branches(),
            file_path: default_file_path(),
            trusted_relays: default_trusted_relays(),
        }
    }
}

impl PolicyConfig {
    /// Reject values the workflow cannot act on.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.branches.is_empty() {
            return Err(PolicyError::Invalid("branches must not be empty".to_string()));
        }
        if self.file_path.trim().is_empty() || self.file_path.starts_with('/') {
            return Err(PolicyError::Invalid(format!(
                "file_path must be a relative repository path, got '{}'",
                self.file_path
            )));
        }
        if self.trusted_relays.iter().any(|r| r.is_empty()) {
            return Err(PolicyError::Invalid(
                "trusted_relays entries must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_policy(&self) -> ProvisioningPolicy {
        ProvisioningPolicy {
            allowlist: BranchAllowlist::new(self.branches.iter().cloned()),
            file: ComplianceFileSpec::new(self.file_path.clone()),
        }
    }
}
