//! credo-agent - Runs the belief → desire → intention cycle until stopped.

use std::sync::Arc;

use anyhow::Context;
use credo_core::{AgentConfig, GoalRegistry, SqliteStore};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
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

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("credo_core=debug".parse()?)
                .add_directive("credo_agent=debug".parse()?),
        )
        .init();
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let config = AgentConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    let store = Arc::new(
        SqliteStore::new(&config.db_path)
            .with_context(|| format!("failed to open store at {}", config.db_path.display()))?,
    );
    let seeded = GoalRegistry::new(store.clone())
        .seed_defaults()
        .context("failed to seed default goals")?;
    if seeded > 0 {
        info!(goals = seeded, "Seeded default goals");
    }

    let mut coordinator = credo_agent::build_coordinator(&config, store)?;

    info!(
        db_path = %config.db_path.display(),
        interval_secs = config.cycle_interval_secs,
        solver = %config.solver,
        "Starting credo agent"
    );

    let token = CancellationToken::new();
    let stop = token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, finishing current cycle...");
        stop.cancel();
    });

    let stats = coordinator.run(token).await;
    info!(
        completed = stats.completed,
        successful = stats.successful,
        aborted = stats.aborted,
        triggered = stats.triggered,
        "Agent stopped"
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    if let Err(e) = init_tracing() {
        eprintln!("failed to initialise logging: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %format!("{e:#}"), "Startup failed");
        std::process::exit(1);
    }
}
