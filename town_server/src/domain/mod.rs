// Domain layer: game rules, player economy and the ports the rules depend on.

pub mod economy;
pub mod errors;
pub mod games;
pub mod ports;
pub mod state;
pub mod systems;
pub mod tuning;

pub use errors::GameError;
pub use games::{Game, PongGame, TargetShooterGame};
pub use ports::{AreaEmitter, PlayerRegistry, RandomSource};
pub use state::PlayerRecord;

#[cfg(test)]
pub(crate) mod test_support;
