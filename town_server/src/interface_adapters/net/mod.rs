// Network adapter modules split by player sockets vs area administration routes.

pub mod client;
pub mod internal;

pub use client::{spawn_town_serializer, ws_handler};
pub use internal::{create_area_handler, list_areas_handler};
