//! Currency wallet
//!
//! Coins and gems picked up during an attempt are *provisional*. Winning the
//! level commits them to the persisted balance; losing throws them away.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage};
use crate::sim::CollectibleKind;

/// Currency value of a pickup
pub fn currency_value(kind: CollectibleKind) -> u64 {
    match kind {
        CollectibleKind::Coin => 1,
        CollectibleKind::Gem => 5,
        CollectibleKind::Key => 0,
    }
}

/// Persistent balance plus this attempt's unconfirmed earnings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub balance: u64,
    #[serde(skip)]
    pub provisional: u64,
}

impl Wallet {
    /// Storage key
    const STORAGE_KEY: &'static str = "portal_hop_wallet";

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pickup's value as provisional
    pub fn earn(&mut self, kind: CollectibleKind) -> u64 {
        let value = currency_value(kind);
        self.provisional += value;
        value
    }

    /// Move provisional earnings into the balance; returns the amount moved
    pub fn commit(&mut self) -> u64 {
        let amount = std::mem::take(&mut self.provisional);
        self.balance += amount;
        amount
    }

    /// Drop provisional earnings; returns the amount lost
    pub fn discard(&mut self) -> u64 {
        std::mem::take(&mut self.provisional)
    }

    /// Spend from the committed balance if it covers `price`
    pub fn try_spend(&mut self, price: u64) -> bool {
        if self.balance < price {
            return false;
        }
        self.balance -= price;
        true
    }

    pub fn load(storage: &dyn Storage) -> Self {
        let wallet: Wallet = persistence::load_json(storage, Self::STORAGE_KEY);
        log::info!("Wallet balance: {}", wallet.balance);
        wallet
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        match persistence::save_json(storage, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Wallet saved (balance {})", self.balance),
            Err(e) => log::warn!("Wallet not saved: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_commit_and_discard() {
        let mut wallet = Wallet::new();
        wallet.earn(CollectibleKind::Coin);
        wallet.earn(CollectibleKind::Gem);
        wallet.earn(CollectibleKind::Key);
        assert_eq!(wallet.provisional, 6);
        assert_eq!(wallet.commit(), 6);
        assert_eq!(wallet.balance, 6);
        assert_eq!(wallet.provisional, 0);

        wallet.earn(CollectibleKind::Gem);
        assert_eq!(wallet.discard(), 5);
        assert_eq!(wallet.balance, 6);
    }

    #[test]
    fn test_try_spend() {
        let mut wallet = Wallet {
            balance: 10,
            provisional: 50,
        };
        assert!(!wallet.try_spend(11));
        assert!(wallet.try_spend(10));
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.provisional, 50);
    }

    #[test]
    fn test_only_balance_persists() {
        let mut storage = MemoryStorage::new();
        let wallet = Wallet {
            balance: 42,
            provisional: 9,
        };
        wallet.save(&mut storage);
        let loaded = Wallet::load(&storage);
        assert_eq!(loaded.balance, 42);
        assert_eq!(loaded.provisional, 0);
    }
}
