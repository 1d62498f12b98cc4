// Domain layer: client errors and the ports controllers depend on.

pub mod errors;
pub mod ports;

pub use errors::ControllerError;
pub use ports::CommandSender;
