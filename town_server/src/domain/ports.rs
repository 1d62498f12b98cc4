use crate::domain::errors::GameError;
use town_protocol::{AreaSnapshot, Wallet};

// Port for randomness used by serves, rebounds and target placement.
pub trait RandomSource: Send {
    // Uniform value in [0, 1).
    fn next_unit(&mut self) -> f32;

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_unit()
    }
}

// Port for player identity and economy lookups.
pub trait PlayerRegistry: Send + Sync {
    fn display_name(&self, player_id: &str) -> Option<String>;

    // Applies `update` to the player's wallet atomically; nothing is stored on error.
    fn update_wallet(
        &self,
        player_id: &str,
        update: &mut dyn FnMut(&mut Wallet) -> Result<(), GameError>,
    ) -> Result<Wallet, GameError>;
}

// Port notified with the full area snapshot after every successful mutation.
pub trait AreaEmitter: Send + Sync {
    fn area_changed(&self, snapshot: AreaSnapshot);
}
