//! ignoreguard entry point.
//!
//! Binary name: `ignoreguard`
//!
//! Loads `.env`, parses CLI arguments, initializes tracing, then either
//! starts the webhook server or runs the signing utility.

mod cli;
mod http;
mod state;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use cli::{Cli, Commands, ServeArgs};
use state::AppState;

/// How long shutdown waits for in-flight provisioning runs (one GitHub request timeout).
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = ignoreguard_observe::tracing_setup::init_tracing(&cli.log_level, cli.otel) {
        eprintln!("failed to initialize tracing: {e}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Sign(args) => cli::sign::run(args).await,
    };

    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "ignoreguard failed");
            ExitCode::FAILURE
        }
    };

    ignoreguard_observe::tracing_setup::shutdown_tracing();
    code
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let state = AppState::init(&args).await?;

    if let Some(proxy) = &args.webhook_proxy_url {
        tracing::info!(webhook_proxy_url = %proxy, "Expecting deliveries through a webhook relay");
    }

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, version = env!("CARGO_PKG_VERSION"), "ignoreguard listening");

    let router = http::router::build_router(state.clone());
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.drain(DRAIN_TIMEOUT).await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
