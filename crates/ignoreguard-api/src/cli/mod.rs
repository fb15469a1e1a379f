//! CLI command definitions for the `ignoreguard` binary.
//!
//! Every serve option can come from a flag or the matching environment
//! variable; `.env` is loaded before parsing.

pub mod sign;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use ignoreguard_infra::github::GITHUB_API_BASE;

/// Keep a `.cursorignore` in every pull request that targets a policed branch.
#[derive(Parser)]
#[command(name = "ignoreguard", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log filter (`trace`..`error` or directives). `RUST_LOG` takes precedence.
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the webhook server.
    Serve(ServeArgs),

    /// Sign a payload file and deliver it to a running server.
    Sign(SignArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// GitHub App id.
    #[arg(long, env = "APP_ID")]
    pub app_id: Option<u64>,

    /// GitHub App private key (PEM; literal `\n` accepted).
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// File holding the GitHub App private key.
    #[arg(long, env = "PRIVATE_KEY_PATH")]
    pub private_key_path: Option<PathBuf>,

    /// Static access token used instead of App authentication.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Shared secret for webhook signatures.
    #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// Webhook relay channel URL (informational).
    #[arg(long, env = "WEBHOOK_PROXY_URL")]
    pub webhook_proxy_url: Option<String>,

    /// GitHub REST API base URL.
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_BASE)]
    pub github_api_url: String,

    /// Template used as the body of a provisioned file.
    #[arg(long, env = "TEMPLATE_PATH", default_value = "templates/.cursorignore")]
    pub template_path: PathBuf,

    /// Optional TOML policy file (branches, file path, trusted relays).
    #[arg(long, env = "POLICY_FILE")]
    pub policy_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SignArgs {
    /// JSON payload file, signed byte for byte.
    #[arg(long)]
    pub payload: PathBuf,

    /// Value for the X-GitHub-Event header.
    #[arg(long, default_value = "pull_request")]
    pub event: String,

    /// Shared webhook secret.
    #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Server the signed delivery is posted to.
    #[arg(long, default_value = "http://localhost:3000")]
    pub url: String,

    /// Print the headers without sending anything.
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_serve_flags_parse() {
        let cli = Cli::try_parse_from([
            "ignoreguard",
            "serve",
            "--port",
            "8080",
            "--app-id",
            "12",
            "--policy-file",
            "policy.toml",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, 8080);
                assert_eq!(args.app_id, Some(12));
                assert_eq!(args.policy_file, Some(PathBuf::from("policy.toml")));
            }
            Commands::Sign(_) => panic!("expected serve"),
        }
    }

    #[test]
    fn test_sign_defaults_event() {
        let cli = Cli::try_parse_from([
            "ignoreguard",
            "sign",
            "--payload",
            "pr.json",
            "--secret",
            "s",
        ])
        .unwrap();
        match cli.command {
            Commands::Sign(args) => {
                assert_eq!(args.event, "pull_request");
                assert_eq!(args.secret.as_deref(), Some("s"));
                assert_eq!(args.url, "http://localhost:3000");
                assert!(!args.dry_run);
            }
            Commands::Serve(_) => panic!("expected sign"),
        }
    }
}
