// Area variants hosted by the town and the task that owns each one.

use super::game_area::GameArea;
use super::ticket_booth::TicketBoothArea;
use super::types::{AreaRequest, CommandResult};
use crate::domain::{PongGame, TargetShooterGame};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use town_protocol::{AreaKind, AreaSnapshot, InteractableCommand};
use tracing::{debug, info};

pub enum TownArea {
    Pong(GameArea<PongGame>),
    TargetShooter(GameArea<TargetShooterGame>),
    TicketBooth(TicketBoothArea),
}

impl TownArea {
    pub fn id(&self) -> &str {
        match self {
            TownArea::Pong(area) => area.id(),
            TownArea::TargetShooter(area) => area.id(),
            TownArea::TicketBooth(area) => area.id(),
        }
    }

    pub fn kind(&self) -> AreaKind {
        match self {
            TownArea::Pong(_) => AreaKind::Pong,
            TownArea::TargetShooter(_) => AreaKind::TargetShooter,
            TownArea::TicketBooth(_) => AreaKind::TicketBooth,
        }
    }

    pub fn handle_command(&mut self, player: &str, command: InteractableCommand) -> CommandResult {
        match self {
            TownArea::Pong(area) => area.handle_command(player, command),
            TownArea::TargetShooter(area) => area.handle_command(player, command),
            TownArea::TicketBooth(area) => area.handle_command(player, command),
        }
    }

    pub fn add_occupant(&mut self, player: &str) -> bool {
        match self {
            TownArea::Pong(area) => area.add_occupant(player),
            TownArea::TargetShooter(area) => area.add_occupant(player),
            TownArea::TicketBooth(area) => area.add_occupant(player),
        }
    }

    pub fn remove_occupant(&mut self, player: &str) -> bool {
        match self {
            TownArea::Pong(area) => area.remove_occupant(player),
            TownArea::TargetShooter(area) => area.remove_occupant(player),
            TownArea::TicketBooth(area) => area.remove_occupant(player),
        }
    }

    pub fn physics_running(&self) -> bool {
        match self {
            TownArea::Pong(area) => area.physics_running(),
            TownArea::TargetShooter(area) => area.physics_running(),
            TownArea::TicketBooth(_) => false,
        }
    }

    pub fn tick(&mut self) -> bool {
        match self {
            TownArea::Pong(area) => area.tick(),
            TownArea::TargetShooter(area) => area.tick(),
            TownArea::TicketBooth(_) => false,
        }
    }

    pub fn to_snapshot(&self) -> AreaSnapshot {
        match self {
            TownArea::Pong(area) => area.to_snapshot(),
            TownArea::TargetShooter(area) => area.to_snapshot(),
            TownArea::TicketBooth(area) => area.to_snapshot(),
        }
    }
}

/// Single writer for one area: requests and physics steps are applied one at a time.
///
/// Exits once every request sender has been dropped.
pub async fn area_task(
    mut area: TownArea,
    mut request_rx: mpsc::Receiver<AreaRequest>,
    physics_interval: Duration,
) {
    let mut interval = tokio::time::interval(physics_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            request = request_rx.recv() => {
                let Some(request) = request else {
                    break;
                };
                handle_request(&mut area, request);
            }
            _ = interval.tick(), if area.physics_running() => {
                area.tick();
            }
        }
    }

    info!(area_id = %area.id(), "area task exiting");
}

fn handle_request(area: &mut TownArea, request: AreaRequest) {
    match request {
        AreaRequest::Enter { player_id } => {
            if area.add_occupant(&player_id) {
                debug!(area_id = %area.id(), player_id = %player_id, "player entered area");
            }
        }
        AreaRequest::Exit { player_id, done } => {
            if area.remove_occupant(&player_id) {
                debug!(area_id = %area.id(), player_id = %player_id, "player left area");
            }
            let _ = done.send(());
        }
        AreaRequest::Command {
            player_id,
            command,
            reply,
        } => {
            let result = area.handle_command(&player_id, command);
            if let Err(err) = &result {
                debug!(area_id = %area.id(), player_id = %player_id, error = %err, "command rejected");
            }
            // The requester may have gone away; the command still applied.
            let _ = reply.send(result);
        }
    }
}
