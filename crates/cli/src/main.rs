mod menu;

use std::fs::{self, OpenOptions};

use anyhow::Result;
use realty_core::{
    config::{self, AppConfig},
    Catalog, JsonFileStore,
};
use tracing_subscriber::{prelude::*, EnvFilter};

fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    tracing::info!(data_dir = %config.data_dir.display(), "starting realty catalog");

    let store = JsonFileStore::new(&config.data_dir);
    let catalog = Catalog::load_or_seed(store)?;
    menu::run(catalog)
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("realty.log");

    let env_filter = EnvFilter::from_default_env();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
