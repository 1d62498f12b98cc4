// Town orchestration: spawning areas and routing players to them.

use super::area::{TownArea, area_task};
use super::game_area::GameArea;
use super::players::PlayerDirectory;
use super::ticket_booth::TicketBoothArea;
use super::types::{AreaRequest, DispatchError};
use crate::domain::tuning::economy::default_catalog;
use crate::domain::{AreaEmitter, PlayerRecord, PlayerRegistry, RandomSource};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, mpsc, oneshot, watch};
use town_protocol::{AreaKind, AreaSnapshot, CommandPayload, InteractableCommand};
use tracing::{debug, info, warn};

/// Shared configuration for spawning areas.
#[derive(Debug, Clone)]
pub struct TownSettings {
    /// Capacity for inbound requests per area.
    pub request_channel_capacity: usize,
    /// Capacity for the town-wide snapshot broadcast.
    pub snapshot_broadcast_capacity: usize,
    /// Fixed interval between physics steps.
    pub physics_interval: Duration,
    /// Builds the random source handed to each new area.
    pub random_source: fn() -> Box<dyn RandomSource>,
}

/// Errors returned by town registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TownError {
    /// Area already exists and cannot be re-created.
    AlreadyExists,
}

impl fmt::Display for TownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TownError::AlreadyExists => write!(f, "area already exists"),
        }
    }
}

impl std::error::Error for TownError {}

/// Channels for talking to one running area.
#[derive(Clone)]
pub struct AreaHandle {
    pub area_id: Arc<str>,
    pub kind: AreaKind,
    request_tx: mpsc::Sender<AreaRequest>,
    latest_rx: watch::Receiver<AreaSnapshot>,
}

impl AreaHandle {
    pub async fn enter(&self, player_id: &str) -> Result<(), DispatchError> {
        self.request_tx
            .send(AreaRequest::Enter {
                player_id: player_id.to_string(),
            })
            .await
            .map_err(|_| DispatchError::AreaClosed)
    }

    /// Resolves after the area has applied the exit.
    pub async fn exit(&self, player_id: &str) -> Result<(), DispatchError> {
        let (done, done_rx) = oneshot::channel();
        self.request_tx
            .send(AreaRequest::Exit {
                player_id: player_id.to_string(),
                done,
            })
            .await
            .map_err(|_| DispatchError::AreaClosed)?;
        done_rx.await.map_err(|_| DispatchError::AreaClosed)
    }

    /// Sends a command and waits for the area's verdict.
    pub async fn command(
        &self,
        player_id: &str,
        command: InteractableCommand,
    ) -> Result<Option<CommandPayload>, DispatchError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request_tx
            .send(AreaRequest::Command {
                player_id: player_id.to_string(),
                command,
                reply,
            })
            .await
            .map_err(|_| DispatchError::AreaClosed)?;

        let result = reply_rx.await.map_err(|_| DispatchError::AreaClosed)?;
        Ok(result?)
    }

    /// Latest snapshot the area published.
    pub fn latest(&self) -> AreaSnapshot {
        self.latest_rx.borrow().clone()
    }
}

// Publishes every area change to the area's watch and the town-wide broadcast.
struct BroadcastEmitter {
    latest_tx: watch::Sender<AreaSnapshot>,
    snapshots_tx: broadcast::Sender<AreaSnapshot>,
}

impl AreaEmitter for BroadcastEmitter {
    fn area_changed(&self, snapshot: AreaSnapshot) {
        self.latest_tx.send_replace(snapshot.clone());
        // No subscribers is fine; the watch keeps the latest state.
        let _ = self.snapshots_tx.send(snapshot);
    }
}

/// Thread-safe registry for the areas of one town.
pub struct TownRegistry {
    settings: TownSettings,
    areas: RwLock<HashMap<String, AreaHandle>>,
    players: Arc<PlayerDirectory>,
    snapshots_tx: broadcast::Sender<AreaSnapshot>,
}

impl TownRegistry {
    pub fn new(settings: TownSettings) -> Self {
        let (snapshots_tx, _snapshots_rx) =
            broadcast::channel(settings.snapshot_broadcast_capacity);
        Self {
            settings,
            areas: RwLock::new(HashMap::new()),
            players: Arc::new(PlayerDirectory::new()),
            snapshots_tx,
        }
    }

    pub fn players(&self) -> &PlayerDirectory {
        &self.players
    }

    /// Subscribes to snapshots of every area change in the town.
    pub fn subscribe(&self) -> broadcast::Receiver<AreaSnapshot> {
        self.snapshots_tx.subscribe()
    }

    pub fn register_player(&self, display_name: &str) -> PlayerRecord {
        self.players.register(display_name)
    }

    /// Creates a new area and spawns its task.
    pub async fn create_area(&self, area_id: String, kind: AreaKind) -> Result<AreaHandle, TownError> {
        let mut areas = self.areas.write().await;
        if areas.contains_key(&area_id) {
            return Err(TownError::AlreadyExists);
        }

        let (request_tx, request_rx) =
            mpsc::channel::<AreaRequest>(self.settings.request_channel_capacity);
        let (latest_tx, latest_rx) = watch::channel(AreaSnapshot::empty(area_id.clone(), kind));
        let emitter = Arc::new(BroadcastEmitter {
            latest_tx,
            snapshots_tx: self.snapshots_tx.clone(),
        });
        let players: Arc<dyn PlayerRegistry> = self.players.clone();
        let rng = (self.settings.random_source)();

        let area = match kind {
            AreaKind::Pong => TownArea::Pong(GameArea::new(area_id.clone(), rng, players, emitter)),
            AreaKind::TargetShooter => {
                TownArea::TargetShooter(GameArea::new(area_id.clone(), rng, players, emitter))
            }
            AreaKind::TicketBooth => TownArea::TicketBooth(TicketBoothArea::new(
                area_id.clone(),
                default_catalog(),
                players,
                emitter,
            )),
        };

        tokio::spawn(area_task(area, request_rx, self.settings.physics_interval));

        let handle = AreaHandle {
            area_id: Arc::from(area_id.as_str()),
            kind,
            request_tx,
            latest_rx,
        };
        areas.insert(area_id.clone(), handle.clone());
        info!(area_id = %area_id, ?kind, "area created");
        Ok(handle)
    }

    /// Returns an area handle for the provided id, if it exists.
    pub async fn get_area(&self, area_id: &str) -> Option<AreaHandle> {
        let areas = self.areas.read().await;
        areas.get(area_id).cloned()
    }

    /// Latest snapshot of every area, ordered by id.
    pub async fn snapshots(&self) -> Vec<AreaSnapshot> {
        let areas = self.areas.read().await;
        let mut snapshots: Vec<AreaSnapshot> = areas.values().map(AreaHandle::latest).collect();
        snapshots.sort_by(|a, b| a.id.cmp(&b.id));
        snapshots
    }

    /// Removes the player from every area and forgets them.
    ///
    /// The directory entry outlives every exit so forfeits still resolve display names.
    pub async fn player_disconnected(&self, player_id: &str) {
        let handles: Vec<AreaHandle> = self.areas.read().await.values().cloned().collect();
        for handle in handles {
            if let Err(err) = handle.exit(player_id).await {
                warn!(area_id = %handle.area_id, player_id, error = %err, "failed to remove player from area");
            }
        }
        if self.players.remove(player_id).is_some() {
            debug!(player_id, "player removed from directory");
        }
    }
}
