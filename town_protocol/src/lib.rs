//! Wire model shared by the town server and its clients.
//!
//! Everything in here is plain data: the game state model pushed to clients,
//! the interactable commands clients send, and the websocket envelopes that
//! carry both. The server owns the rules; clients only mirror these types.

pub mod commands;
pub mod messages;
pub mod model;

pub use commands::{CommandPayload, GameMove, InteractableCommand, PongMove, TargetShooterMove};
pub use messages::{ClientMessage, CommandEnvelope, CommandResponse, JoinPayload, ServerMessage};
pub use model::{
    Accuracy, AreaKind, AreaSnapshot, Difficulty, GameInstance, GameInstanceId, GameResult,
    GameState, GameStatus, PaddleDirection, PlayerId, Point, PongGameState, PongSide,
    ShooterSlot, TargetShooterGameState, TicketBoothItem, Wallet,
};
