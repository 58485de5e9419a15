//! Escrow treasuries
//!
//! Two instances back the registry: the stakes treasury holds staked
//! principal until withdrawal, the rewards treasury is funded externally and
//! pays staker and DLP rewards. Only the registry moves funds out.

use dlp_core::{Address, Amount};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Treasury errors
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreasuryError {
    #[error("Insufficient treasury balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    #[error("Transfer to the zero address")]
    ZeroRecipient,
}

/// Escrow account capability
pub trait Treasury: Send + Sync {
    /// Funds received from `from`
    fn deposit(&self, from: &Address, amount: Amount);

    /// Pay `amount` to `to`
    fn transfer(&self, to: &Address, amount: Amount) -> Result<(), TreasuryError>;

    /// Current balance
    fn balance(&self) -> Amount;
}

#[derive(Debug, Default)]
struct Ledger {
    balance: Amount,
    paid_out: HashMap<Address, Amount>,
}

/// In-memory treasury tracking its balance and per-recipient payouts
#[derive(Debug, Default)]
pub struct InMemoryTreasury {
    name: &'static str,
    ledger: Mutex<Ledger>,
}

impl InMemoryTreasury {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Total ever paid to `account`
    pub fn paid_to(&self, account: &Address) -> Amount {
        self.ledger.lock().paid_out.get(account).copied().unwrap_or(0)
    }
}

impl Treasury for InMemoryTreasury {
    fn deposit(&self, from: &Address, amount: Amount) {
        let mut ledger = self.ledger.lock();
        ledger.balance = ledger.balance.saturating_add(amount);
        tracing::trace!(treasury = self.name, %from, amount, "Deposit");
    }

    fn transfer(&self, to: &Address, amount: Amount) -> Result<(), TreasuryError> {
        if to.is_zero() {
            return Err(TreasuryError::ZeroRecipient);
        }
        let mut ledger = self.ledger.lock();
        if ledger.balance < amount {
            return Err(TreasuryError::InsufficientBalance {
                requested: amount,
                available: ledger.balance,
            });
        }
        ledger.balance -= amount;
        *ledger.paid_out.entry(*to).or_insert(0) += amount;
        tracing::trace!(treasury = self.name, %to, amount, "Transfer");
        Ok(())
    }

    fn balance(&self) -> Amount {
        self.ledger.lock().balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_and_transfer() {
        let treasury = InMemoryTreasury::new("stakes");
        let alice = Address::from_seed(b"alice");

        treasury.deposit(&alice, 100);
        assert_eq!(treasury.balance(), 100);

        treasury.transfer(&alice, 40).unwrap();
        assert_eq!(treasury.balance(), 60);
        assert_eq!(treasury.paid_to(&alice), 40);
    }

    #[test]
    fn test_insufficient_balance() {
        let treasury = InMemoryTreasury::new("rewards");
        let bob = Address::from_seed(b"bob");

        let err = treasury.transfer(&bob, 1).unwrap_err();
        assert_eq!(err, TreasuryError::InsufficientBalance { requested: 1, available: 0 });
    }

    #[test]
    fn test_zero_recipient() {
        let treasury = InMemoryTreasury::new("rewards");
        treasury.deposit(&Address::from_seed(b"funder"), 10);

        assert_eq!(treasury.transfer(&Address::ZERO, 5), Err(TreasuryError::ZeroRecipient));
    }
}
