use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use coffeeshop_auth::AuthGate;
use coffeeshop_server::observability::{DEFAULT_LOG_LEVEL, ObservabilityConfig};
use coffeeshop_server::{AppState, InMemoryDrinkStore, ServerArgs, router};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    ObservabilityConfig::default()
        .with_log_level(args.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))
        .with_format(args.log_format)
        .init()?;

    let auth_config = args
        .auth
        .to_config()
        .context("invalid authorization configuration")?;
    info!(
        issuer = %auth_config.issuer,
        audience = %auth_config.audience,
        jwks_uri = %auth_config.jwks_uri,
        algorithms = ?auth_config.algorithms,
        "Token verification configured"
    );
    let gate = AuthGate::from_config(auth_config).context("failed to build authorization gate")?;

    let store = if args.seed {
        InMemoryDrinkStore::seeded()
    } else {
        InMemoryDrinkStore::new()
    };
    let app = router(AppState::new(gate, Arc::new(store)));

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(addr = %args.bind, "Coffee shop API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
