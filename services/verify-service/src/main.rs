mod backend;
mod config;
mod routes;

use backend::StructuralGroth16Backend;
use config::Config;
use routes::{AppState, app_router};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    info!(
        scope = %config.policy.scope,
        minimum_age = config.policy.minimum_age,
        excluded = ?config.policy.excluded_countries,
        "disclosure policy loaded"
    );

    let state = AppState {
        backend: Arc::new(StructuralGroth16Backend::new(config.policy.clone())),
    };
    let app = app_router(state);

    info!("verify-service listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
