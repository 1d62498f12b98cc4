// Domain-level player records kept by the town.

use town_protocol::{PlayerId, Wallet};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub display_name: String,
    pub wallet: Wallet,
}

impl PlayerRecord {
    pub fn new(id: impl Into<PlayerId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            wallet: Wallet::default(),
        }
    }
}
