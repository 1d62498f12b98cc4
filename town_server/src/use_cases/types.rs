// Use-case level inputs/outputs for the area tasks.

use crate::domain::GameError;
use std::fmt;
use tokio::sync::oneshot;
use town_protocol::{CommandPayload, InteractableCommand, PlayerId};

pub type CommandResult = Result<Option<CommandPayload>, GameError>;

#[derive(Debug)]
pub enum AreaRequest {
    Enter {
        player_id: PlayerId,
    },
    Exit {
        player_id: PlayerId,
        // Fired once the player is gone from the area and any game in it.
        done: oneshot::Sender<()>,
    },
    Command {
        player_id: PlayerId,
        command: InteractableCommand,
        reply: oneshot::Sender<CommandResult>,
    },
}

/// Why a request could not be answered by an area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    Game(GameError),
    UnknownArea,
    /// The area task stopped before replying.
    AreaClosed,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Game(err) => write!(f, "{err}"),
            DispatchError::UnknownArea => write!(f, "area not found"),
            DispatchError::AreaClosed => write!(f, "area is closed"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<GameError> for DispatchError {
    fn from(err: GameError) -> Self {
        DispatchError::Game(err)
    }
}
