// Gameplay tuning, kept separate from runtime/server configuration.

pub mod economy;
pub mod pong;
pub mod target_shooter;
