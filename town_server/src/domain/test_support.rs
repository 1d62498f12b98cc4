use crate::domain::errors::GameError;
use crate::domain::ports::{AreaEmitter, PlayerRegistry, RandomSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use town_protocol::{AreaSnapshot, Wallet};

// Deterministic random source that cycles through a fixed sequence.
pub(crate) struct SequenceRandom {
    values: Vec<f32>,
    next: usize,
}

impl SequenceRandom {
    pub(crate) fn new(values: Vec<f32>) -> Self {
        assert!(!values.is_empty(), "sequence needs at least one value");
        Self { values, next: 0 }
    }

    // Always yields the midpoint: straight serves and centred targets.
    pub(crate) fn centred() -> Self {
        Self::new(vec![0.5])
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f32 {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}

// Emitter that records every snapshot it is handed.
#[derive(Clone, Default)]
pub(crate) struct RecordingEmitter {
    snapshots: Arc<Mutex<Vec<AreaSnapshot>>>,
}

impl RecordingEmitter {
    pub(crate) fn count(&self) -> usize {
        self.snapshots.lock().expect("emitter mutex poisoned").len()
    }

    pub(crate) fn last(&self) -> Option<AreaSnapshot> {
        self.snapshots
            .lock()
            .expect("emitter mutex poisoned")
            .last()
            .cloned()
    }
}

impl AreaEmitter for RecordingEmitter {
    fn area_changed(&self, snapshot: AreaSnapshot) {
        self.snapshots
            .lock()
            .expect("emitter mutex poisoned")
            .push(snapshot);
    }
}

// In-memory registry with fixed display names and mutable wallets.
#[derive(Default)]
pub(crate) struct StaticPlayers {
    names: HashMap<String, String>,
    wallets: Mutex<HashMap<String, Wallet>>,
}

impl StaticPlayers {
    pub(crate) fn with(players: &[(&str, &str)]) -> Self {
        let names = players
            .iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect::<HashMap<_, _>>();
        let wallets = names
            .keys()
            .map(|id| (id.clone(), Wallet::default()))
            .collect::<HashMap<_, _>>();
        Self {
            names,
            wallets: Mutex::new(wallets),
        }
    }
}

impl PlayerRegistry for StaticPlayers {
    fn display_name(&self, player_id: &str) -> Option<String> {
        self.names.get(player_id).cloned()
    }

    fn update_wallet(
        &self,
        player_id: &str,
        update: &mut dyn FnMut(&mut Wallet) -> Result<(), GameError>,
    ) -> Result<Wallet, GameError> {
        let mut wallets = self.wallets.lock().expect("wallet mutex poisoned");
        let wallet = wallets.get_mut(player_id).ok_or(GameError::PlayerNotFound)?;
        let mut updated = wallet.clone();
        update(&mut updated)?;
        *wallet = updated.clone();
        Ok(updated)
    }
}
