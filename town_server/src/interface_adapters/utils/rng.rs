use crate::domain::RandomSource;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{
    sync::{
        OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Returns a process-unique, monotonically increasing identifier.
///
/// Used to correlate log lines of one connection.
pub fn rand_id() -> u64 {
    static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU64::new(now_nanos()));
    counter.fetch_add(1, Ordering::Relaxed)
}

/// Random source backed by an OS-seeded `StdRng`.
pub struct OsRandom(StdRng);

impl OsRandom {
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl Default for OsRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for OsRandom {
    fn next_unit(&mut self) -> f32 {
        self.0.random::<f32>()
    }
}

/// Factory handed to the town so every area gets its own generator.
pub fn entropy_source() -> Box<dyn RandomSource> {
    Box::new(OsRandom::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let first = rand_id();
        let second = rand_id();
        assert!(second > first);
    }

    #[test]
    fn os_random_stays_in_the_unit_interval() {
        let mut rng = OsRandom::new();
        for _ in 0..1000 {
            let value = rng.next_unit();
            assert!((0.0..1.0).contains(&value));
        }
        let ranged = rng.range(20.0, 480.0);
        assert!((20.0..=480.0).contains(&ranged));
    }
}
