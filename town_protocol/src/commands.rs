// Interactable commands sent by clients and their typed replies.

use crate::model::{
    Difficulty, GameInstanceId, PaddleDirection, Point, PongSide, ShooterSlot, Wallet,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PongMove {
    // Informational only; the server resolves the side from the player id.
    pub game_piece: PongSide,
    pub direction: PaddleDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetShooterMove {
    // Informational only; the server resolves the slot from the player id.
    pub game_piece: ShooterSlot,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", content = "move")]
pub enum GameMove {
    Pong(PongMove),
    TargetShooter(TargetShooterMove),
}

/// Commands addressed to a single area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InteractableCommand {
    JoinGame,
    StartGame {
        game_id: GameInstanceId,
    },
    GameMove {
        game_id: GameInstanceId,
        #[serde(rename = "move")]
        game_move: GameMove,
    },
    LeaveGame {
        game_id: GameInstanceId,
    },
    StartUpdatePhysics {
        game_id: GameInstanceId,
    },
    StopUpdatePhysics {
        game_id: GameInstanceId,
    },
    ChangeDifficulty {
        game_id: GameInstanceId,
        difficulty: Difficulty,
    },
    TicketBoothPurchase {
        item_name: String,
    },
    TicketBoothEquip {
        item_name: String,
    },
    AddToken {
        amount: u32,
    },
}

impl InteractableCommand {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            InteractableCommand::JoinGame => "JoinGame",
            InteractableCommand::StartGame { .. } => "StartGame",
            InteractableCommand::GameMove { .. } => "GameMove",
            InteractableCommand::LeaveGame { .. } => "LeaveGame",
            InteractableCommand::StartUpdatePhysics { .. } => "StartUpdatePhysics",
            InteractableCommand::StopUpdatePhysics { .. } => "StopUpdatePhysics",
            InteractableCommand::ChangeDifficulty { .. } => "ChangeDifficulty",
            InteractableCommand::TicketBoothPurchase { .. } => "TicketBoothPurchase",
            InteractableCommand::TicketBoothEquip { .. } => "TicketBoothEquip",
            InteractableCommand::AddToken { .. } => "AddToken",
        }
    }

    pub fn game_id(&self) -> Option<&str> {
        match self {
            InteractableCommand::StartGame { game_id }
            | InteractableCommand::GameMove { game_id, .. }
            | InteractableCommand::LeaveGame { game_id }
            | InteractableCommand::StartUpdatePhysics { game_id }
            | InteractableCommand::StopUpdatePhysics { game_id }
            | InteractableCommand::ChangeDifficulty { game_id, .. } => Some(game_id),
            _ => None,
        }
    }
}

/// Command-specific reply data. Most commands reply without a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CommandPayload {
    JoinGame { game_id: GameInstanceId },
    Wallet(Wallet),
}
