use crate::app_config::AppConfig;
use crate::domain::events::Event;
use crate::domain::sensor_key::validate_descriptors;
use crate::integration::Integration;
use crate::miner::HttpSystemInfoSource;
use crate::store::Store;
use crate::store_listener::store_listener;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task;
use tracing::{info, warn};

mod app_config;
mod coordinator;
mod device_entry_deserializer;
mod domain;
mod integration;
mod miner;
mod projector;
mod scheduler;
mod store;
mod store_listener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    validate_descriptors()?;
    let config = AppConfig::load()?;
    info!("✅  Loaded configuration");

    let client = miner::new_client(&config)?;

    let (tx, rx) = mpsc::channel::<Event>(config.core().store_buffer_size());
    let mut store = Store::new(rx);
    let notifier_rx = store.notifier();

    task::spawn(async move {
        store_listener(notifier_rx).await;
    });
    info!("✅  Initialized store listener");

    task::spawn(async move {
        store.listen().await;
    });
    info!("✅  Initialized store");

    let mut integration = Integration::new(Arc::new(HttpSystemInfoSource::new(client)), tx);
    for entry in config.devices() {
        integration.setup_entry(entry.clone())?;
    }

    if integration.is_empty() {
        warn!("⚠️ No devices configured, nothing to poll");
    }

    info!("✅  Set up {} device(s)", integration.len());
    info!("🔥 {} is up and running", env!("CARGO_PKG_NAME"));

    tokio::signal::ctrl_c().await?;
    info!("🛑 Shutting down...");
    integration.unload_all().await;

    Ok(())
}
