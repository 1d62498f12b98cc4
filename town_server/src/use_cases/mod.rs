// Use cases layer: application workflows for the town server.

pub mod area;
pub mod game_area;
pub mod players;
pub mod ticket_booth;
pub mod town;
pub mod types;

pub use area::TownArea;
pub use game_area::GameArea;
pub use players::PlayerDirectory;
pub use ticket_booth::TicketBoothArea;
pub use town::{AreaHandle, TownError, TownRegistry, TownSettings};
pub use types::{AreaRequest, CommandResult, DispatchError};
