use openslot_app::app::{ServiceHandles, router};
use openslot_core::config::load_config;
use salvo::conn::TcpListener;
use salvo::logging::Logger;
use salvo::{Listener, Router};
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

    tracing::info!("Starting openslot availability server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let handles = ServiceHandles::from_settings(&config)?;
    if handles.source.is_none() {
        tracing::warn!("Calendar credentials missing, availability requests will fail");
    }
    if config.auth.credentials().is_none() {
        tracing::warn!("Admin credentials missing, selection routes are disabled");
    }

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let app = Router::new()
        .hoop(Logger::new())
        .push(router(config, handles));

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(app).await;

    Ok(())
}
