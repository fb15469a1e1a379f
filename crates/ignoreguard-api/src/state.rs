//! Application state wiring the gate, the provisioner and the GitHub client.
//!
//! The workflow is generic over its template source; AppState pins it to the
//! filesystem implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use secrecy::SecretString;
use tokio_util::task::TaskTracker;

use ignoreguard_core::provision::Provisioner;
use ignoreguard_infra::admission::AdmissionGate;
use ignoreguard_infra::config::load_policy_config;
use ignoreguard_infra::github::{GitHubApp, GitHubCredentials};
use ignoreguard_infra::template::FileTemplateSource;

use crate::cli::ServeArgs;

pub type ConcreteProvisioner = Provisioner<FileTemplateSource>;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AdmissionGate>,
    pub provisioner: Arc<ConcreteProvisioner>,
    pub github: Arc<GitHubApp>,
    /// Background provisioning runs spawned by the webhook handler.
    pub tasks: TaskTracker,
}

impl AppState {
    /// Load the policy and credentials and build the shared services.
    ///
    /// # Errors
    ///
    /// Fails when the policy file is unreadable or invalid, when no GitHub
    /// credentials are configured, or when the App private key is malformed.
    pub async fn init(args: &ServeArgs) -> anyhow::Result<Self> {
        let policy_config = load_policy_config(args.policy_file.as_deref()).await?;

        let private_key = match (&args.private_key, &args.private_key_path) {
            (Some(key), _) if !key.is_empty() => Some(key.clone()),
            (_, Some(path)) => Some(
                tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read private key {}", path.display()))?,
            ),
            _ => None,
        };

        let credentials =
            GitHubCredentials::from_parts(args.app_id, private_key, args.github_token.clone())?;
        let github = Arc::new(GitHubApp::new(args.github_api_url.clone(), credentials)?);

        let secret = args
            .webhook_secret
            .clone()
            .filter(|s| !s.is_empty())
            .map(SecretString::from);
        if secret.is_none() {
            tracing::warn!("WEBHOOK_SECRET is not set, deliveries will not be verified");
        }
        let gate = Arc::new(AdmissionGate::new(secret, policy_config.trusted_relays.clone()));

        let policy = policy_config.to_policy();
        tracing::info!(
            branches = %policy.allowlist,
            file_path = %policy.file.path(),
            template = %args.template_path.display(),
            app_id = ?github.app_id(),
            "Policy loaded"
        );

        let provisioner = Arc::new(Provisioner::new(
            Arc::new(policy),
            FileTemplateSource::new(args.template_path.clone()),
        ));

        Ok(Self {
            gate,
            provisioner,
            github,
            tasks: TaskTracker::new(),
        })
    }

    /// Stop accepting background runs and wait up to `timeout` for the ones
    /// in flight. Returns `false` if some were still running at the deadline.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tasks.close();
        let pending = self.tasks.len();
        if pending > 0 {
            tracing::info!(pending, "Waiting for in-flight provisioning runs");
        }

        if tokio::time::timeout(timeout, self.tasks.wait()).await.is_err() {
            tracing::warn!(
                abandoned = self.tasks.len(),
                "Provisioning runs still in flight at shutdown, abandoning them"
            );
            return false;
        }
        true
    }
}
