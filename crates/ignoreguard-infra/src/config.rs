//! Policy file loader for ignoreguard.
//!
//! Reads the optional TOML policy file and deserializes it into
//! [`PolicyConfig`]. Without a path the defaults apply; a named file that is
//! missing, malformed or invalid is a startup error.

use std::path::Path;

use ignoreguard_types::config::PolicyConfig;
use ignoreguard_types::error::PolicyError;

/// Load the policy from `path`, or return [`PolicyConfig::default()`] when
/// no path was configured.
pub async fn load_policy_config(path: Option<&Path>) -> Result<PolicyConfig, PolicyError> {
    let Some(path) = path else {
        tracing::debug!("No policy file configured, using defaults");
        return Ok(PolicyConfig::default());
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PolicyError::Read {
            path: path.display().to_string(),
            source,
        })?;

    let config = toml::from_str::<PolicyConfig>(&content).map_err(|e| PolicyError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    config.validate()?;

    tracing::info!(
        path = %path.display(),
        branches = ?config.branches,
        file_path = %config.file_path,
        "Loaded policy file"
    );
    Ok(config)
}
