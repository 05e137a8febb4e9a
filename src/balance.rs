use std::collections::HashMap;

use thiserror::Error;

use crate::{address::Address, units::Amount};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BalanceError {
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },
    #[error("Balance would overflow")]
    Overflow,
}

/// Per-depositor ledger for native currency and for every custodied asset.
///
/// Entries appear on first credit and are never removed, only driven to zero.
/// Every mutation either applies in full or returns an error with no change.
#[derive(Debug, Default, Clone)]
pub struct BalanceStore {
    ether: HashMap<Address, Amount>,
    tokens: HashMap<(Address, Address), Amount>,
}

impl BalanceStore {
    pub fn ether_of(&self, holder: &Address) -> Amount {
        self.ether.get(holder).copied().unwrap_or_default()
    }

    pub fn token_of(&self, asset: &Address, holder: &Address) -> Amount {
        self.tokens
            .get(&(*asset, *holder))
            .copied()
            .unwrap_or_default()
    }

    pub fn can_credit(&self, holder: &Address, amount: Amount) -> Result<(), BalanceError> {
        checked_credit(self.ether_of(holder), amount).map(drop)
    }

    pub fn can_credit_token(
        &self,
        asset: &Address,
        holder: &Address,
        amount: Amount,
    ) -> Result<(), BalanceError> {
        checked_credit(self.token_of(asset, holder), amount).map(drop)
    }

    pub fn credit(&mut self, holder: Address, amount: Amount) -> Result<Amount, BalanceError> {
        let updated = checked_credit(self.ether_of(&holder), amount)?;
        self.ether.insert(holder, updated);
        Ok(updated)
    }

    pub fn debit(&mut self, holder: Address, amount: Amount) -> Result<Amount, BalanceError> {
        let updated = checked_debit(self.ether_of(&holder), amount)?;
        self.ether.insert(holder, updated);
        Ok(updated)
    }

    pub fn credit_token(
        &mut self,
        asset: Address,
        holder: Address,
        amount: Amount,
    ) -> Result<Amount, BalanceError> {
        let updated = checked_credit(self.token_of(&asset, &holder), amount)?;
        self.tokens.insert((asset, holder), updated);
        Ok(updated)
    }

    pub fn debit_token(
        &mut self,
        asset: Address,
        holder: Address,
        amount: Amount,
    ) -> Result<Amount, BalanceError> {
        let updated = checked_debit(self.token_of(&asset, &holder), amount)?;
        self.tokens.insert((asset, holder), updated);
        Ok(updated)
    }

    /// Sum of tracked native balances, saturating at `Amount::MAX`.
    pub fn total_ether(&self) -> Amount {
        self.ether.values().fold(0, |acc, b| acc.saturating_add(*b))
    }

    /// Sum of tracked balances of `asset`, saturating at `Amount::MAX`.
    pub fn total_token(&self, asset: &Address) -> Amount {
        self.tokens
            .iter()
            .filter(|((a, _), _)| a == asset)
            .fold(0, |acc, (_, b)| acc.saturating_add(*b))
    }

    pub fn ether_entries(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.ether.iter()
    }

    /// Yields `(asset, holder, balance)`.
    pub fn token_entries(&self) -> impl Iterator<Item = (&Address, &Address, &Amount)> {
        self.tokens
            .iter()
            .map(|((asset, holder), balance)| (asset, holder, balance))
    }
}

fn checked_credit(balance: Amount, amount: Amount) -> Result<Amount, BalanceError> {
    balance.checked_add(amount).ok_or(BalanceError::Overflow)
}

fn checked_debit(balance: Amount, amount: Amount) -> Result<Amount, BalanceError> {
    balance
        .checked_sub(amount)
        .ok_or(BalanceError::InsufficientBalance {
            requested: amount,
            available: balance,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::new([1; 20]);
    const BOB: Address = Address::new([2; 20]);
    const TOKEN: Address = Address::new([9; 20]);

    #[test]
    fn credit_and_debit_ether() {
        let mut store = BalanceStore::default();
        assert_eq!(store.ether_of(&ALICE), 0);

        assert_eq!(store.credit(ALICE, 10).unwrap(), 10);
        assert_eq!(store.credit(ALICE, 5).unwrap(), 15);
        assert_eq!(store.credit(BOB, 1).unwrap(), 1);
        assert_eq!(store.total_ether(), 16);

        assert_eq!(store.debit(ALICE, 15).unwrap(), 0);
        // driven to zero, still present
        assert_eq!(store.ether_entries().count(), 2);
        assert_eq!(store.ether_of(&ALICE), 0);
    }

    #[test]
    fn debit_more_than_balance_leaves_state() {
        let mut store = BalanceStore::default();
        store.credit(ALICE, 3).unwrap();
        let err = store.debit(ALICE, 4).unwrap_err();
        assert_eq!(
            err,
            BalanceError::InsufficientBalance {
                requested: 4,
                available: 3
            }
        );
        assert_eq!(store.ether_of(&ALICE), 3);
        assert_eq!(
            err.to_string(),
            "Insufficient balance: requested 4, available 3"
        );
    }

    #[test]
    fn overflow_is_rejected() {
        let mut store = BalanceStore::default();
        store.credit(ALICE, Amount::MAX).unwrap();
        assert_eq!(store.can_credit(&ALICE, 1), Err(BalanceError::Overflow));
        assert_eq!(store.credit(ALICE, 1), Err(BalanceError::Overflow));
        assert_eq!(store.ether_of(&ALICE), Amount::MAX);
        assert!(store.can_credit(&BOB, Amount::MAX).is_ok());
    }

    #[test]
    fn token_balances_are_per_asset() {
        let other_token = Address::new([8; 20]);
        let mut store = BalanceStore::default();
        store.credit_token(TOKEN, ALICE, 7).unwrap();
        store.credit_token(other_token, ALICE, 2).unwrap();
        store.credit_token(TOKEN, BOB, 1).unwrap();

        assert_eq!(store.token_of(&TOKEN, &ALICE), 7);
        assert_eq!(store.token_of(&other_token, &ALICE), 2);
        assert_eq!(store.token_of(&other_token, &BOB), 0);
        assert_eq!(store.total_token(&TOKEN), 8);

        assert!(matches!(
            store.debit_token(other_token, BOB, 1),
            Err(BalanceError::InsufficientBalance { .. })
        ));
        assert_eq!(store.debit_token(TOKEN, ALICE, 7).unwrap(), 0);
        assert_eq!(store.total_token(&TOKEN), 1);
        // ether ledger untouched by token movements
        assert_eq!(store.total_ether(), 0);
    }
}
