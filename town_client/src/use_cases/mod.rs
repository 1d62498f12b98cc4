// Use cases layer: client-side area mirrors and their change events.

pub mod events;
pub mod game_area_controller;
pub mod pong_area_controller;
pub mod target_shooter_area_controller;

pub use events::{EventBus, SubscriptionId};
pub use game_area_controller::{AreaEvent, GameAreaController};
pub use pong_area_controller::{PongAreaController, PongEvent};
pub use target_shooter_area_controller::{TargetShooterAreaController, TargetShooterEvent};

#[cfg(test)]
pub(crate) mod test_support;
