//! Authoritative game state machines.
//!
//! Every game follows the same lifecycle:
//!
//! ```text
//! WAITING_FOR_PLAYERS --(both seats filled)--> WAITING_TO_START
//! WAITING_TO_START --(both players ready)--> IN_PROGRESS
//! IN_PROGRESS --(win condition or a player leaves)--> OVER
//! ```
//!
//! Games never trust the slot label a client puts on a move; the acting seat is
//! always resolved from the player id. Operations validate fully before they
//! mutate, so an `Err` leaves the game exactly as it was.

mod pong;
mod seats;
mod target_shooter;

pub use pong::PongGame;
pub use target_shooter::TargetShooterGame;

use crate::domain::errors::GameError;
use crate::domain::ports::RandomSource;
use town_protocol::{
    AreaKind, Difficulty, GameInstance, GameInstanceId, GameMove, GameState, GameStatus,
    PlayerId,
};

/// Capability interface the area layer drives a game through.
pub trait Game: Send + Sized + 'static {
    /// Game-specific move payload.
    type Move;

    /// Kind reported in area snapshots for areas hosting this game.
    const AREA_KIND: AreaKind;

    /// Creates a fresh instance. `prior` is the instance it supersedes, used to
    /// keep returning players on the side they played before.
    fn new(id: GameInstanceId, prior: Option<&Self>) -> Self;

    fn id(&self) -> &str;

    fn status(&self) -> GameStatus;

    fn winner(&self) -> Option<&PlayerId>;

    /// Players currently seated, in join order.
    fn players(&self) -> &[PlayerId];

    fn join(&mut self, player: &str) -> Result<(), GameError>;

    fn start_game(&mut self, player: &str, rng: &mut dyn RandomSource) -> Result<(), GameError>;

    fn apply_move(
        &mut self,
        player: &str,
        game_move: Self::Move,
        rng: &mut dyn RandomSource,
    ) -> Result<(), GameError>;

    fn leave(&mut self, player: &str) -> Result<(), GameError>;

    /// Whether the game expects a fixed-interval physics step.
    fn supports_physics(&self) -> bool {
        false
    }

    /// Advances the simulation by one step. Returns true when state changed.
    fn update_physics(&mut self, _rng: &mut dyn RandomSource) -> bool {
        false
    }

    fn change_difficulty(&mut self, _player: &str, _difficulty: Difficulty) -> Result<(), GameError> {
        Err(GameError::InvalidCommand("difficulty is not adjustable in this game"))
    }

    /// Wire view of the current state.
    fn state(&self) -> GameState;

    /// Extracts this game's move from a wire move, if it is one.
    fn move_from_wire(game_move: GameMove) -> Option<Self::Move>;

    fn to_model(&self) -> GameInstance {
        GameInstance {
            id: self.id().to_string(),
            players: self.players().to_vec(),
            state: self.state(),
            result: None,
        }
    }
}
