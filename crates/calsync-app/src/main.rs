use std::sync::Arc;

use calsync_app::app::api::routes;
use calsync_app::config::ConfigHandler;
use calsync_app::middleware::calendar::CalendarHandler;
use calsync_app::observer::log_change;
use calsync_app::seed::{load_seed_events, seed_calendar};
use calsync_core::config::load_config;
use calsync_service::sync::CalendarSync;
use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tokio::sync::RwLock;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting calsync calendar server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let mut sync = CalendarSync::from_config(&config.calendar);
    sync.subscribe(log_change);

    if let Some(path) = &config.calendar.seed_file {
        let events = load_seed_events(path).await?;
        seed_calendar(&mut sync, &events)?;
    }

    let store = Arc::new(RwLock::new(sync));

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(ConfigHandler {
            settings: config.clone(),
        })
        .hoop(CalendarHandler { store })
        .push(routes(&config));

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
