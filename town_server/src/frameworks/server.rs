// Framework bootstrap for the town server runtime.

use crate::frameworks::config;
use crate::interface_adapters::net::{
    create_area_handler, list_areas_handler, spawn_town_serializer, ws_handler,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::entropy_source;
use crate::use_cases::{TownRegistry, TownSettings};

use axum::{
    Router,
    extract::ws::Utf8Bytes,
    routing::get,
};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::broadcast;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves the town on an already bound listener until the server fails.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state().await?;

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/areas", get(list_areas_handler).post(create_area_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

async fn build_state() -> Result<Arc<AppState>> {
    let town = Arc::new(TownRegistry::new(TownSettings {
        request_channel_capacity: config::REQUEST_CHANNEL_CAPACITY,
        snapshot_broadcast_capacity: config::SNAPSHOT_BROADCAST_CAPACITY,
        physics_interval: config::PHYSICS_TICK_INTERVAL,
        random_source: entropy_source,
    }));

    for (area_id, kind) in config::default_areas() {
        town.create_area(area_id.clone(), kind)
            .await
            .map_err(|e| std::io::Error::other(format!("failed to create area {area_id}: {e}")))?;
    }

    let (town_bytes_tx, _town_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::SNAPSHOT_BROADCAST_CAPACITY);
    let state = Arc::new(AppState {
        town,
        town_bytes_tx,
    });

    // Serialize area updates once in the adapter layer; every socket shares the bytes.
    spawn_town_serializer(&state);

    Ok(state)
}
