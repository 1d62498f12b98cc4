// Interface adapters: the websocket session that feeds the controllers.

pub mod connection;

pub use connection::{ConnectionError, TownConnection, TownUpdate};
