//! Serve command - runs the admin HTTP API

use std::net::SocketAddr;

use clap::Args;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::AppConfig;
use crate::infrastructure::in_memory::InMemoryQuerier;
use crate::infrastructure::postgres::{run_migrations, PostgresQuerier};

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Keep all data in process memory instead of PostgreSQL
    #[arg(long)]
    pub in_memory: bool,
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = build_state(&config, args.in_memory).await?;
    let app = create_router(state);

    let addr = build_socket_addr(&config)?;
    info!(%addr, "Starting server");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

async fn build_state(config: &AppConfig, in_memory: bool) -> anyhow::Result<AppState> {
    let timeout = config.database.statement_timeout();

    if in_memory {
        warn!("Using in-memory store; data is lost on shutdown");
        return Ok(AppState::in_memory(InMemoryQuerier::new(), timeout));
    }

    let querier = PostgresQuerier::connect(&config.database).await?;

    if config.database.run_migrations {
        let applied = run_migrations(querier.pool()).await?;
        info!(applied, "Startup migrations complete");
    }

    Ok(AppState::postgres(querier, timeout))
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_socket_addr() {
        let config = AppConfig::default();
        let addr = build_socket_addr(&config).unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[tokio::test]
    async fn test_in_memory_state_skips_database() {
        let state = build_state(&AppConfig::default(), true).await.unwrap();
        assert_eq!(state.store_name(), "in_memory");
    }
}
