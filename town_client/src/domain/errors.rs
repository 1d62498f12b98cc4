use std::fmt;

// Errors surfaced by area controllers.
// Local precondition failures never reach the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    NoGameInProgress,
    NoGameStartable,
    PlayerNotInGame,
    /// The server rejected the command; carries its error text.
    Remote(String),
    Transport(String),
    Timeout,
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::NoGameInProgress => write!(f, "no game in progress"),
            ControllerError::NoGameStartable => write!(f, "no game startable"),
            ControllerError::PlayerNotInGame => write!(f, "player is not in this game"),
            ControllerError::Remote(message) => write!(f, "server rejected command: {message}"),
            ControllerError::Transport(message) => write!(f, "transport error: {message}"),
            ControllerError::Timeout => write!(f, "timed out waiting for a command response"),
        }
    }
}

impl std::error::Error for ControllerError {}
