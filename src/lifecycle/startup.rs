//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize logging and metrics from the loaded configuration
//! - Build the gateway and bind its listeners
//! - Run until the shutdown signal fires
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::LoadedConfig;
use crate::http::GatewayServer;
use crate::lifecycle::{shutdown, signals, Shutdown};
use crate::observability::{logging, metrics};

pub async fn run(loaded: LoadedConfig) -> anyhow::Result<()> {
    let LoadedConfig { config, warnings } = loaded;

    logging::init_logging(&config.observability).context("installing tracing subscriber")?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dashboard-gateway starting");
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    if config.observability.metrics_enabled {
        let addr: std::net::SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .context("parsing metrics address")?;
        metrics::init_metrics(addr).context("installing Prometheus exporter")?;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = GatewayServer::new(config.clone())?;

    if config.admin.enabled {
        let admin_listener = TcpListener::bind(&config.admin.bind_address)
            .await
            .with_context(|| format!("binding admin API on {}", config.admin.bind_address))?;
        let admin_router = server.admin_router();
        let admin_shutdown = shutdown.subscribe();
        tracing::info!(address = %config.admin.bind_address, "Admin API listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(admin_listener, admin_router)
                .with_graceful_shutdown(shutdown::wait(admin_shutdown))
                .await
            {
                tracing::error!(error = %e, "Admin API failed");
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .with_context(|| format!("binding {}", config.listener.bind_address))?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
