// Ticket booth area: sells and equips cosmetic items against player tokens.

use crate::domain::economy;
use crate::domain::{AreaEmitter, GameError, PlayerRegistry};
use std::sync::Arc;
use town_protocol::{
    AreaKind, AreaSnapshot, CommandPayload, InteractableCommand, PlayerId, TicketBoothItem,
};
use tracing::info;

pub struct TicketBoothArea {
    id: String,
    occupants: Vec<PlayerId>,
    catalog: Vec<TicketBoothItem>,
    players: Arc<dyn PlayerRegistry>,
    emitter: Arc<dyn AreaEmitter>,
}

impl TicketBoothArea {
    pub fn new(
        id: impl Into<String>,
        catalog: Vec<TicketBoothItem>,
        players: Arc<dyn PlayerRegistry>,
        emitter: Arc<dyn AreaEmitter>,
    ) -> Self {
        Self {
            id: id.into(),
            occupants: Vec::new(),
            catalog,
            players,
            emitter,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn catalog(&self) -> &[TicketBoothItem] {
        &self.catalog
    }

    /// Economy commands reply with the player's updated wallet.
    pub fn handle_command(
        &mut self,
        player: &str,
        command: InteractableCommand,
    ) -> Result<Option<CommandPayload>, GameError> {
        let wallet = match command {
            InteractableCommand::TicketBoothPurchase { item_name } => {
                let item = economy::find_item(&self.catalog, &item_name)?;
                let wallet = self
                    .players
                    .update_wallet(player, &mut |wallet| economy::purchase(wallet, item))?;
                info!(area_id = %self.id, player, item = %item.name, cost = item.cost, "item purchased");
                wallet
            }
            InteractableCommand::TicketBoothEquip { item_name } => {
                let item = economy::find_item(&self.catalog, &item_name)?;
                self.players
                    .update_wallet(player, &mut |wallet| economy::equip(wallet, item))?
            }
            InteractableCommand::AddToken { amount } => {
                self.players.update_wallet(player, &mut |wallet| {
                    economy::add_tokens(wallet, amount);
                    Ok(())
                })?
            }
            _ => {
                return Err(GameError::InvalidCommand(
                    "ticket booths only handle economy commands",
                ));
            }
        };
        Ok(Some(CommandPayload::Wallet(wallet)))
    }

    pub fn add_occupant(&mut self, player: &str) -> bool {
        if self.occupants.iter().any(|occupant| occupant == player) {
            return false;
        }
        self.occupants.push(player.to_string());
        self.emitter.area_changed(self.to_snapshot());
        true
    }

    pub fn remove_occupant(&mut self, player: &str) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|occupant| occupant != player);
        if self.occupants.len() == before {
            return false;
        }
        self.emitter.area_changed(self.to_snapshot());
        true
    }

    pub fn to_snapshot(&self) -> AreaSnapshot {
        AreaSnapshot {
            occupants: self.occupants.clone(),
            ..AreaSnapshot::empty(self.id.clone(), AreaKind::TicketBooth)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{RecordingEmitter, StaticPlayers};
    use crate::domain::tuning::economy::default_catalog;
    use town_protocol::Wallet;

    fn booth() -> (TicketBoothArea, RecordingEmitter) {
        let emitter = RecordingEmitter::default();
        let area = TicketBoothArea::new(
            "booth",
            default_catalog(),
            Arc::new(StaticPlayers::with(&[("a", "Ada")])),
            Arc::new(emitter.clone()),
        );
        (area, emitter)
    }

    fn wallet_of(reply: Result<Option<CommandPayload>, GameError>) -> Wallet {
        match reply {
            Ok(Some(CommandPayload::Wallet(wallet))) => wallet,
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn earn_buy_and_equip() {
        let (mut area, emitter) = booth();

        let wallet = wallet_of(area.handle_command("a", InteractableCommand::AddToken { amount: 12 }));
        assert_eq!(wallet.tokens, 12);

        let wallet = wallet_of(area.handle_command(
            "a",
            InteractableCommand::TicketBoothPurchase {
                item_name: "Sunglasses".to_string(),
            },
        ));
        assert_eq!(wallet.tokens, 2);
        assert_eq!(wallet.owned, vec!["Sunglasses".to_string()]);

        let wallet = wallet_of(area.handle_command(
            "a",
            InteractableCommand::TicketBoothEquip {
                item_name: "Sunglasses".to_string(),
            },
        ));
        assert_eq!(wallet.equipped.as_deref(), Some("Sunglasses"));
        assert_eq!(emitter.count(), 0, "wallet changes are not area state");
    }

    #[test]
    fn purchase_failures_keep_the_wallet() {
        let (mut area, _emitter) = booth();

        let result = area.handle_command(
            "a",
            InteractableCommand::TicketBoothPurchase {
                item_name: "Crown".to_string(),
            },
        );
        assert_eq!(
            result,
            Err(GameError::InsufficientTokens {
                needed: 25,
                available: 0
            })
        );

        let result = area.handle_command(
            "a",
            InteractableCommand::TicketBoothPurchase {
                item_name: "Cape".to_string(),
            },
        );
        assert_eq!(result, Err(GameError::ItemNotFound));

        let wallet = wallet_of(area.handle_command("a", InteractableCommand::AddToken { amount: 0 }));
        assert_eq!(wallet, Wallet::default());
    }

    #[test]
    fn unknown_players_are_not_found() {
        let (mut area, _emitter) = booth();
        let result = area.handle_command("ghost", InteractableCommand::AddToken { amount: 1 });
        assert_eq!(result, Err(GameError::PlayerNotFound));
    }

    #[test]
    fn game_commands_are_invalid_here() {
        let (mut area, _emitter) = booth();
        let result = area.handle_command("a", InteractableCommand::JoinGame);
        assert!(matches!(result, Err(GameError::InvalidCommand(_))));
    }

    #[test]
    fn occupants_show_up_in_the_snapshot() {
        let (mut area, emitter) = booth();
        area.add_occupant("a");

        let snapshot = emitter.last().expect("snapshot");
        assert_eq!(snapshot.kind, AreaKind::TicketBooth);
        assert_eq!(snapshot.occupants, vec!["a".to_string()]);
        assert!(snapshot.game.is_none());
    }
}
