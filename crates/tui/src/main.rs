mod app;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use quartet_core::{
    config::{self, AppConfig},
    EditorError, ItemCatalog,
};
use tracing::{error, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

const LOG_FILE_NAME: &str = "quartet-save-editor.log";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let written = config::ensure_default_config();
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    init_logging(&config)?;
    info!("Quartet save editor starting");
    if let Err(err) = written {
        warn!("Could not write default config: {err:#}");
    }

    let mut startup_errors = Vec::new();
    if let Some(err) = config_error {
        error!("Configuration error: {err}");
        startup_errors.push(err);
    }

    let catalog = match load_catalog(&config) {
        Ok(catalog) => catalog,
        Err(err) => {
            error!("Item catalog unavailable: {err}");
            startup_errors.push(err);
            ItemCatalog::default()
        }
    };

    let mut app = app::EditorApp::new(config, catalog);
    for err in startup_errors {
        app.report(err);
    }
    app.run().await
}

fn load_catalog(config: &AppConfig) -> Result<ItemCatalog, EditorError> {
    match &config.item_catalog {
        Some(path) => ItemCatalog::from_path(path),
        None => ItemCatalog::bundled(),
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let log_dir = &config.log_dir;
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal belongs to the UI, so only the file layer is installed.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
