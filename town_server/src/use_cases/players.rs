// Directory of connected players: identity plus wallet.

use crate::domain::{GameError, PlayerRecord, PlayerRegistry};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use town_protocol::Wallet;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct PlayerDirectory {
    players: Mutex<HashMap<String, PlayerRecord>>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new player under a freshly generated id.
    pub fn register(&self, display_name: &str) -> PlayerRecord {
        let record = PlayerRecord::new(Uuid::new_v4().to_string(), display_name);
        self.lock().insert(record.id.clone(), record.clone());
        debug!(player_id = %record.id, display_name, "player registered");
        record
    }

    pub fn remove(&self, player_id: &str) -> Option<PlayerRecord> {
        self.lock().remove(player_id)
    }

    pub fn get(&self, player_id: &str) -> Option<PlayerRecord> {
        self.lock().get(player_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned lock still holds consistent records: wallet updates commit in one assignment.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, PlayerRecord>> {
        self.players.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlayerRegistry for PlayerDirectory {
    fn display_name(&self, player_id: &str) -> Option<String> {
        self.lock()
            .get(player_id)
            .map(|record| record.display_name.clone())
    }

    fn update_wallet(
        &self,
        player_id: &str,
        update: &mut dyn FnMut(&mut Wallet) -> Result<(), GameError>,
    ) -> Result<Wallet, GameError> {
        let mut players = self.lock();
        let record = players
            .get_mut(player_id)
            .ok_or(GameError::PlayerNotFound)?;

        let mut wallet = record.wallet.clone();
        update(&mut wallet)?;
        record.wallet = wallet.clone();
        Ok(wallet)
    }
}
