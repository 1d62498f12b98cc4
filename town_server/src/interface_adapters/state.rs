use crate::use_cases::TownRegistry;
use axum::extract::ws::Utf8Bytes;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    // Areas, players and the town-wide snapshot stream.
    pub town: Arc<TownRegistry>,
    // Serialized area updates, shared across all connections.
    pub town_bytes_tx: broadcast::Sender<Utf8Bytes>,
}
