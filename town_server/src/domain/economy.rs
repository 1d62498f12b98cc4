// Wallet rules for the ticket booth economy.

use crate::domain::errors::GameError;
use town_protocol::{TicketBoothItem, Wallet};

pub fn find_item<'a>(
    catalog: &'a [TicketBoothItem],
    name: &str,
) -> Result<&'a TicketBoothItem, GameError> {
    catalog
        .iter()
        .find(|item| item.name == name)
        .ok_or(GameError::ItemNotFound)
}

pub fn purchase(wallet: &mut Wallet, item: &TicketBoothItem) -> Result<(), GameError> {
    if wallet.owned.iter().any(|owned| owned == &item.name) {
        return Err(GameError::ItemAlreadyOwned);
    }
    if wallet.tokens < item.cost {
        return Err(GameError::InsufficientTokens {
            needed: item.cost,
            available: wallet.tokens,
        });
    }

    wallet.tokens -= item.cost;
    wallet.owned.push(item.name.clone());
    Ok(())
}

pub fn equip(wallet: &mut Wallet, item: &TicketBoothItem) -> Result<(), GameError> {
    if !wallet.owned.iter().any(|owned| owned == &item.name) {
        return Err(GameError::ItemNotOwned);
    }
    wallet.equipped = Some(item.name.clone());
    Ok(())
}

pub fn add_tokens(wallet: &mut Wallet, amount: u32) {
    wallet.tokens = wallet.tokens.saturating_add(amount);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hat() -> TicketBoothItem {
        TicketBoothItem {
            name: "Party Hat".to_string(),
            cost: 5,
        }
    }

    #[test]
    fn purchase_deducts_cost_and_records_ownership() {
        let mut wallet = Wallet {
            tokens: 7,
            ..Wallet::default()
        };

        purchase(&mut wallet, &hat()).expect("purchase should succeed");

        assert_eq!(wallet.tokens, 2);
        assert_eq!(wallet.owned, vec!["Party Hat".to_string()]);
    }

    #[test]
    fn purchase_without_enough_tokens_leaves_wallet_untouched() {
        let mut wallet = Wallet {
            tokens: 4,
            ..Wallet::default()
        };

        let result = purchase(&mut wallet, &hat());

        assert_eq!(
            result,
            Err(GameError::InsufficientTokens {
                needed: 5,
                available: 4
            })
        );
        assert_eq!(wallet.tokens, 4);
        assert!(wallet.owned.is_empty());
    }

    #[test]
    fn purchasing_an_owned_item_fails() {
        let mut wallet = Wallet {
            tokens: 50,
            owned: vec!["Party Hat".to_string()],
            equipped: None,
        };

        assert_eq!(purchase(&mut wallet, &hat()), Err(GameError::ItemAlreadyOwned));
        assert_eq!(wallet.tokens, 50);
    }

    #[test]
    fn equip_requires_ownership() {
        let mut wallet = Wallet::default();
        assert_eq!(equip(&mut wallet, &hat()), Err(GameError::ItemNotOwned));

        wallet.owned.push("Party Hat".to_string());
        equip(&mut wallet, &hat()).expect("equip owned item");
        assert_eq!(wallet.equipped.as_deref(), Some("Party Hat"));
    }

    #[test]
    fn add_tokens_saturates() {
        let mut wallet = Wallet {
            tokens: u32::MAX - 1,
            ..Wallet::default()
        };
        add_tokens(&mut wallet, 10);
        assert_eq!(wallet.tokens, u32::MAX);
    }

    #[test]
    fn unknown_items_are_not_found() {
        let catalog = vec![hat()];
        assert!(find_item(&catalog, "Party Hat").is_ok());
        assert_eq!(find_item(&catalog, "Cape"), Err(GameError::ItemNotFound));
    }
}
