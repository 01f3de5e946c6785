//! Ledger Capability
//!
//! The ledger environment holds balances and executes value transfers on
//! behalf of the pool. [`InMemoryLedger`] is a reference implementation
//! used by in-process hosts and tests.

use crate::{BTreeMap, Vec};
use crate::errors::{LotteryError, LotteryResult, TransferFailureReason};
use crate::types::{Address, Amount};

/// Balances and the transfer primitive exposed by the hosting environment
pub trait Ledger {
    /// Current balance held by `account`
    fn balance_of(&self, account: &Address) -> Amount;

    /// Move `amount` from `from` to `to`.
    ///
    /// Must be all-or-nothing: on error no balance has changed.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> LotteryResult<()>;
}

impl<T: Ledger + ?Sized> Ledger for &mut T {
    fn balance_of(&self, account: &Address) -> Amount {
        (**self).balance_of(account)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> LotteryResult<()> {
        (**self).transfer(from, to, amount)
    }
}

/// Map-backed ledger with configurable recipient rejection
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: BTreeMap<Address, Amount>,
    rejecting: Vec<Address>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create value out of thin air for `account` (fixtures and genesis)
    pub fn credit(&mut self, account: Address, amount: Amount) -> LotteryResult<()> {
        let entry = self.balances.entry(account).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(LotteryError::Overflow)?;
        Ok(())
    }

    /// Make every future transfer into `account` fail
    pub fn reject_incoming(&mut self, account: Address) {
        if !self.rejecting.contains(&account) {
            self.rejecting.push(account);
        }
    }

    /// Accept transfers into `account` again
    pub fn accept_incoming(&mut self, account: &Address) {
        self.rejecting.retain(|a| a != account);
    }

    /// Sum of all balances
    pub fn total_supply(&self) -> u128 {
        self.balances.values().map(|b| *b as u128).sum()
    }
}

impl Ledger for InMemoryLedger {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> LotteryResult<()> {
        if self.rejecting.contains(to) {
            return Err(LotteryError::TransferFailed {
                to: *to,
                amount,
                reason: TransferFailureReason::RecipientRejected,
            });
        }

        let available = self.balance_of(from);
        if available < amount {
            return Err(LotteryError::InsufficientBalance {
                available,
                requested: amount,
            });
        }

        if from == to {
            return Ok(());
        }

        // Compute both sides before writing either
        let new_from = available.checked_sub(amount).ok_or(LotteryError::Underflow)?;
        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LotteryError::Overflow)?;

        self.balances.insert(*from, new_from);
        self.balances.insert(*to, new_to);
        Ok(())
    }
}
