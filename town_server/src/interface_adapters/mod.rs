// Interface adapters: websocket and HTTP handling around the town use cases.

pub mod http;
pub mod net;
pub mod state;
pub mod utils;
