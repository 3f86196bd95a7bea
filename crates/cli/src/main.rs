mod app;

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};

use tracing_subscriber::{prelude::*, EnvFilter};
use vgo_core::{
    config::{self, AppConfig},
    CatalogClient, JsonFileStorage, ListStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    if config.api_key.is_none() {
        tracing::warn!("No API key configured; set VGO_API_KEY or api_key in the config file");
    }

    let storage = JsonFileStorage::new(&config.data_dir);
    tracing::info!(path = %storage.path().display(), "Using list storage");
    let store = ListStore::new(storage);
    let catalog = CatalogClient::from_config(&config).context("failed to build catalog client")?;

    let mut app = app::VgoApp::new(store, catalog, config.search_debounce());
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("vgo.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
