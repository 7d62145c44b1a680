//! REST backend server.
//!
//! Reads `QUARRY_*` settings from the environment, wires the backend through
//! the container and serves it until Ctrl-C.

use std::error::Error;
use std::sync::Arc;

use quarry::app::{self, names};
use quarry::config::AppConfig;
use quarry::{global, logging, TracingObserver};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::from_env()?;
    logging::init_logging(&config.logging)?;

    let mut registry = app::bootstrap(&config)?;
    registry.add_observer(Arc::new(TracingObserver));
    let container = global::install(registry.seal()?)?;

    for descriptor in container.descriptors() {
        tracing::debug!(
            name = %descriptor.name,
            lifetime = ?descriptor.lifetime,
            kind = ?descriptor.kind,
            dependencies = ?descriptor.dependencies,
            "registered component"
        );
    }

    let store = container.resolve_as::<String>(names::CONNECTION_STRING).await?;
    tracing::info!(store = %store, "using in-memory document store");

    if config.seed_games > 0 {
        app::seed::seed(container, config.seed_games).await?;
    }

    let router = app::http::router(container.clone(), &config.base_path);
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        base_path = %config.base_path,
        "server listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
