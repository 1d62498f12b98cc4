// Headless client: joins one game area and logs what its controller reports.

use crate::domain::{CommandSender, ControllerError};
use crate::frameworks::config;
use crate::interface_adapters::{TownConnection, TownUpdate};
use crate::use_cases::{
    AreaEvent, PongAreaController, PongEvent, TargetShooterAreaController, TargetShooterEvent,
};

use std::{error::Error, sync::Arc};
use tokio::sync::mpsc;
use town_protocol::{AreaKind, AreaSnapshot};
use tracing::{debug, info, warn};

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
}

enum ActiveArea {
    Pong(PongAreaController),
    TargetShooter(TargetShooterAreaController),
}

impl ActiveArea {
    fn for_kind(
        kind: AreaKind,
        area_id: &str,
        player_id: &str,
        sender: Arc<dyn CommandSender>,
    ) -> Option<Self> {
        match kind {
            AreaKind::Pong => {
                let mut pong = PongAreaController::new(area_id, player_id, sender);
                pong.on(|event| match event {
                    PongEvent::Area(area) => log_area_event(area),
                    other => debug!(?other, "pong update"),
                });
                Some(ActiveArea::Pong(pong))
            }
            AreaKind::TargetShooter => {
                let mut shooter = TargetShooterAreaController::new(area_id, player_id, sender);
                shooter.on(|event| match event {
                    TargetShooterEvent::Area(area) => log_area_event(area),
                    other => debug!(?other, "target shooter update"),
                });
                Some(ActiveArea::TargetShooter(shooter))
            }
            AreaKind::TicketBooth => None,
        }
    }

    fn apply_snapshot(&mut self, snapshot: &AreaSnapshot) {
        match self {
            ActiveArea::Pong(pong) => pong.apply_snapshot(snapshot),
            ActiveArea::TargetShooter(shooter) => shooter.apply_snapshot(snapshot),
        }
    }

    async fn join_game(&self) -> Result<String, ControllerError> {
        match self {
            ActiveArea::Pong(pong) => pong.join_game().await,
            ActiveArea::TargetShooter(shooter) => shooter.join_game().await,
        }
    }

    async fn leave_game(&self) -> Result<(), ControllerError> {
        match self {
            ActiveArea::Pong(pong) => pong.leave_game().await,
            ActiveArea::TargetShooter(shooter) => shooter.leave_game().await,
        }
    }
}

fn log_area_event(event: &AreaEvent) {
    match event {
        AreaEvent::OccupantsChanged(occupants) => info!(count = occupants.len(), "occupants changed"),
        AreaEvent::HistoryUpdated(history) => info!(games = history.len(), "history updated"),
        AreaEvent::GameUpdated(game_id) => info!(?game_id, "game instance changed"),
        AreaEvent::GameEnd { winner } => info!(?winner, "game over"),
    }
}

// The first update after joining lists every area.
async fn await_area_kind(
    updates_rx: &mut mpsc::Receiver<TownUpdate>,
    area_id: &str,
) -> Option<(AreaKind, AreaSnapshot)> {
    while let Some(update) = updates_rx.recv().await {
        if let Some(snapshot) = update
            .into_snapshots()
            .into_iter()
            .find(|snapshot| snapshot.id == area_id)
        {
            return Some((snapshot.kind, snapshot));
        }
    }
    None
}

pub async fn run_with_config() -> Result<(), Box<dyn Error>> {
    init_runtime();

    let url = config::server_url();
    let area_id = config::area_id();
    let (connection, mut updates_rx) =
        TownConnection::connect(&url, &config::display_name(), config::command_timeout()).await?;
    let connection = Arc::new(connection);

    let Some((kind, first)) = await_area_kind(&mut updates_rx, &area_id).await else {
        return Err(format!("area {area_id} not found").into());
    };
    let sender: Arc<dyn CommandSender> = connection.clone();
    let Some(mut area) = ActiveArea::for_kind(kind, &area_id, connection.player_id(), sender)
    else {
        return Err(format!("area {area_id} does not host a game").into());
    };
    area.apply_snapshot(&first);

    connection.enter_area(&area_id).await?;
    match area.join_game().await {
        Ok(game_id) => info!(%area_id, %game_id, "joined game"),
        Err(err) => warn!(%area_id, error = %err, "could not join game"),
    }

    loop {
        tokio::select! {
            update = updates_rx.recv() => {
                let Some(update) = update else {
                    info!("connection closed");
                    break;
                };
                for snapshot in update.into_snapshots() {
                    area.apply_snapshot(&snapshot);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                if let Err(err) = area.leave_game().await {
                    debug!(error = %err, "leave on shutdown failed");
                }
                connection.exit_area(&area_id).await?;
                break;
            }
        }
    }

    Ok(())
}
