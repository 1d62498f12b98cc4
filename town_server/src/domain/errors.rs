use std::fmt;

// Domain-level errors for game, area and economy commands.
// The Display text is what clients receive in a command response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    PlayerAlreadyInGame,
    GameFull,
    GameNotStartable,
    PlayerNotInGame,
    GameNotInProgress,
    GameIdMismatch,
    InvalidCommand(&'static str),
    InsufficientTokens { needed: u32, available: u32 },
    ItemAlreadyOwned,
    ItemNotOwned,
    ItemNotFound,
    PlayerNotFound,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::PlayerAlreadyInGame => write!(f, "player is already in this game"),
            GameError::GameFull => write!(f, "game is full"),
            GameError::GameNotStartable => write!(f, "game is not startable"),
            GameError::PlayerNotInGame => write!(f, "player is not in this game"),
            GameError::GameNotInProgress => write!(f, "game is not in progress"),
            GameError::GameIdMismatch => write!(f, "game id does not match the current game"),
            GameError::InvalidCommand(reason) => write!(f, "invalid command: {reason}"),
            GameError::InsufficientTokens { needed, available } => {
                write!(f, "insufficient tokens: needed {needed}, have {available}")
            }
            GameError::ItemAlreadyOwned => write!(f, "item is already owned"),
            GameError::ItemNotOwned => write!(f, "item is not owned"),
            GameError::ItemNotFound => write!(f, "item not found"),
            GameError::PlayerNotFound => write!(f, "player not found"),
        }
    }
}

impl std::error::Error for GameError {}
