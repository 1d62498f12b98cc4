pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use domain::{CommandSender, ControllerError};
pub use frameworks::app::run_with_config;
pub use interface_adapters::{TownConnection, TownUpdate};
pub use use_cases::{
    AreaEvent, EventBus, GameAreaController, PongAreaController, PongEvent, SubscriptionId,
    TargetShooterAreaController, TargetShooterEvent,
};
