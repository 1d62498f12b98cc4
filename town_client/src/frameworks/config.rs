use std::{env, time::Duration};

// Runtime client settings, all overridable from the environment or `.env`.

pub fn server_url() -> String {
    env::var("TOWN_SERVER_URL").unwrap_or_else(|_| "ws://127.0.0.1:3001/ws".to_string())
}

pub fn command_timeout() -> Duration {
    parse_millis(env::var("TOWN_COMMAND_TIMEOUT_MS").ok().as_deref())
}

pub fn display_name() -> String {
    env::var("TOWN_DISPLAY_NAME").unwrap_or_else(|_| "guest".to_string())
}

/// Area the client enters and mirrors.
pub fn area_id() -> String {
    env::var("TOWN_AREA_ID").unwrap_or_else(|_| "pong".to_string())
}

const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 5_000;

fn parse_millis(raw: Option<&str>) -> Duration {
    let millis = raw
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_COMMAND_TIMEOUT_MS);
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_falls_back_on_missing_or_bad_values() {
        assert_eq!(parse_millis(None), Duration::from_secs(5));
        assert_eq!(parse_millis(Some("abc")), Duration::from_secs(5));
        assert_eq!(parse_millis(Some("0")), Duration::from_secs(5));
        assert_eq!(parse_millis(Some(" 250 ")), Duration::from_millis(250));
    }
}
