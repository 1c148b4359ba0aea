//! confsync agent - keeps a host service's configuration in sync.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Fetch and persist the configuration before the host starts.
//! - Launch the host, serve `POST /refresh`, and restart the host on change.
//!
//! Does NOT handle:
//! - The refresh protocol itself (see `confsync_sync`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing to allow `confsync.env` to provide clap defaults.
//! - The persisted env file is never loaded into the agent's environment, so a
//!   relaunched host only inherits what the agent itself was started with.
//! - The host is launched only after the initial configuration is on disk.
//! - The HTTP listener binds only after bootstrap has completed.

mod args;
mod broker;
mod error;
mod supervisor;

use std::sync::Arc;

use anyhow::Context;
use args::{Cli, LogFormat};
use clap::Parser;
use confsync_config::ConfigLoader;
use confsync_sync::http::router;
use confsync_sync::{ProcessSupervisor, RestartGate, bootstrap};
use error::{ExitCode, ExitCodeExt};
use supervisor::ChildProcessSupervisor;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    // Load confsync.env BEFORE CLI parsing so clap env defaults can read its values
    if let Err(e) = ConfigLoader::new().load_dotenv() {
        eprintln!("Failed to load environment: {}", e);
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            e.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        let _ = shutdown_tx.send(());
    });

    let mode = ConfigLoader::new().from_env().build()?;

    let supervisor = Arc::new(ChildProcessSupervisor::new());
    let restart = RestartGate::new(supervisor.clone(), cli.command.clone());

    let handle = bootstrap(
        mode,
        |settings| broker::connect(settings.broker.clone(), settings.service_id.clone()),
        Arc::clone(&restart),
    )
    .await
    .context("Failed to start config sync")?;

    supervisor
        .relaunch(restart.launch_args())
        .await
        .context("Failed to launch host")?;

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("Failed to bind refresh endpoint on {}", cli.bind))?;
    tracing::info!(
        addr = %cli.bind,
        sync_enabled = handle.is_enabled(),
        "Refresh endpoint listening"
    );

    axum::serve(listener, router(Arc::clone(&handle.sync)))
        .with_graceful_shutdown(async move {
            // A dropped sender means no signal listener; keep serving.
            if shutdown_rx.await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Refresh endpoint failed")?;

    tracing::info!(pid = supervisor.pid().await, "Shutting down host");
    supervisor.teardown().await?;
    Ok(ExitCode::Interrupted)
}
