use std::{env, time::Duration};
use town_protocol::AreaKind;

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("TOWN_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

/// Areas created at startup, from `TOWN_AREAS` as `id:Kind` pairs separated by commas.
///
/// Unknown kinds are skipped with a warning; an unset variable yields one area of each kind.
pub fn default_areas() -> Vec<(String, AreaKind)> {
    match env::var("TOWN_AREAS") {
        Ok(raw) => parse_areas(&raw),
        Err(_) => vec![
            ("pong".to_string(), AreaKind::Pong),
            ("target-shooter".to_string(), AreaKind::TargetShooter),
            ("ticket-booth".to_string(), AreaKind::TicketBooth),
        ],
    }
}

fn parse_areas(raw: &str) -> Vec<(String, AreaKind)> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| {
            let (id, kind) = entry.trim().split_once(':')?;
            let kind = match kind.trim() {
                "Pong" => AreaKind::Pong,
                "TargetShooter" => AreaKind::TargetShooter,
                "TicketBooth" => AreaKind::TicketBooth,
                other => {
                    tracing::warn!(area_id = id, kind = other, "unknown area kind in TOWN_AREAS");
                    return None;
                }
            };
            Some((id.trim().to_string(), kind))
        })
        .collect()
}

pub const REQUEST_CHANNEL_CAPACITY: usize = 256;
pub const SNAPSHOT_BROADCAST_CAPACITY: usize = 256;

// Pong physics runs at roughly 30 steps per second.
pub const PHYSICS_TICK_INTERVAL: Duration = Duration::from_millis(33);
