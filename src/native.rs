use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::{address::Address, units::Amount};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NativeError {
    #[error("Recipient {0} rejected the transfer")]
    Rejected(Address),
    #[error("Insufficient funds of {holder}: requested {requested}, available {available}")]
    InsufficientFunds {
        holder: Address,
        requested: Amount,
        available: Amount,
    },
    #[error("Native balance would overflow")]
    Overflow,
}

/// Outbound native-currency transfer. A failed send must leave the sink unchanged.
pub trait NativeSink {
    fn send(&mut self, to: &Address, amount: Amount) -> Result<(), NativeError>;
}

/// Native-currency holdings of accounts outside the vault.
#[derive(Debug, Default, Clone)]
pub struct NativeWallets {
    balances: HashMap<Address, Amount>,
    rejecting: HashSet<Address>,
}

impl NativeWallets {
    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    pub fn fund(&mut self, holder: Address, amount: Amount) -> Result<(), NativeError> {
        let updated = self
            .balance_of(&holder)
            .checked_add(amount)
            .ok_or(NativeError::Overflow)?;
        self.balances.insert(holder, updated);
        Ok(())
    }

    pub fn ensure_can_pay(&self, holder: &Address, amount: Amount) -> Result<(), NativeError> {
        let available = self.balance_of(holder);
        if available < amount {
            return Err(NativeError::InsufficientFunds {
                holder: *holder,
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    pub fn charge(&mut self, holder: &Address, amount: Amount) -> Result<(), NativeError> {
        self.ensure_can_pay(holder, amount)?;
        let remaining = self.balance_of(holder) - amount;
        self.balances.insert(*holder, remaining);
        Ok(())
    }

    /// Makes every later [`NativeSink::send`] to `holder` fail.
    pub fn reject_incoming(&mut self, holder: Address) {
        self.rejecting.insert(holder);
    }
}

impl NativeSink for NativeWallets {
    fn send(&mut self, to: &Address, amount: Amount) -> Result<(), NativeError> {
        if self.rejecting.contains(to) {
            return Err(NativeError::Rejected(*to));
        }
        self.fund(*to, amount)
    }
}
