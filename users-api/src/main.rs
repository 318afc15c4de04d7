use anyhow::Context;
use tracing_subscriber::{fmt::time::LocalTime, EnvFilter};

mod adapters;
mod app_state;
mod config;
mod domain;
mod router;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "users_api=debug,tower_http=debug".into()),
        )
        .with_timer(LocalTime::rfc_3339())
        .init();

    let config = config::read_config().context("Failed to read configuration")?;
    let address = config.application.address();
    let app = router::create(config);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
