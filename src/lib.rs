pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod scheduling;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] core_state::CoreError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialise logging, open storage and serve the API until Ctrl+C.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let settings = config::Settings::from_env()?;
    let bind_addr = settings.bind_addr;
    let core = Arc::new(core_state::CoreState::new(settings));
    core.prepare_storage()?;

    let mut server = api::start_api_server(core, bind_addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl+C: {e}");
    }
    server.shutdown();
    server.stopped().await;
    Ok(())
}
