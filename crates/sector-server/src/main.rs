//! Sector Server - always-on airspace sector occupancy service

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sector_core::MonitorSession;
use sector_feed::{load_groups, FeedClient, Source};
use sector_server::{api, config::Config, loops, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sector_server=debug".parse()?),
        )
        .init();

    tracing::info!("Starting Sector Server...");

    let config = Config::from_env();
    let port = config.server_port;

    let feed = FeedClient::new(
        Source::parse(&config.traffic_feed_url).context("TRAFFIC_FEED_URL")?,
        Source::parse(&config.sector_source).context("SECTOR_SOURCE")?,
        config.fetch_timeout(),
    )?;

    let mut session = MonitorSession::new();
    if let Some(path) = &config.groups_path {
        let groups = load_groups(path).await?;
        tracing::info!(
            "Loaded {} custom group(s) from {}",
            groups.groups().len(),
            path.display()
        );
        session.replace_groups(groups);
    }
    let state = Arc::new(AppState::with_session(session));

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Start background loops
    let cycle_task = tokio::spawn(loops::cycle_loop::run_cycle_loop(
        state.clone(),
        feed,
        config,
        shutdown_tx.subscribe(),
    ));

    // Build the app
    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(());
    if let Err(err) = cycle_task.await {
        tracing::warn!("Refresh loop ended abnormally: {}", err);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
