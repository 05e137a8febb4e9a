use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::{address::Address, units::Amount, verifier::TransferError};

/// Narrow view of an external fungible-token contract.
///
/// Implementations are untrusted: a `true` from [`TokenContract::transfer_from`]
/// says nothing about how much actually moved.
pub trait TokenContract {
    fn balance_of(&self, holder: &Address) -> Amount;

    /// Moves `amount` from `from` to `to` on behalf of `spender`.
    /// Returns `false` when the call reports failure.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> bool;
}

/// Resolves an asset address to the contract deployed behind it.
pub trait TokenDirectory {
    /// Runs `call` against the contract behind `asset` as one unit: when the
    /// call fails, every change it made to the contract is rolled back.
    ///
    /// Returns `None` when no contract is deployed at `asset`.
    fn call_reverting(
        &mut self,
        asset: &Address,
        call: &mut dyn FnMut(&mut dyn TokenContract) -> Result<Amount, TransferError>,
    ) -> Option<Result<Amount, TransferError>>;
}

impl<T: TokenContract + Clone> TokenDirectory for HashMap<Address, T> {
    fn call_reverting(
        &mut self,
        asset: &Address,
        call: &mut dyn FnMut(&mut dyn TokenContract) -> Result<Amount, TransferError>,
    ) -> Option<Result<Amount, TransferError>> {
        let token = self.get_mut(asset)?;
        let snapshot = token.clone();
        let result = call(token);
        if result.is_err() {
            debug!(%asset, "token call reverted");
            *token = snapshot;
        }
        Some(result)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient token balance of {holder}: requested {requested}, available {available}")]
    InsufficientBalance {
        holder: Address,
        requested: Amount,
        available: Amount,
    },
    #[error("Insufficient allowance for {spender}: requested {requested}, allowed {allowed}")]
    InsufficientAllowance {
        spender: Address,
        requested: Amount,
        allowed: Amount,
    },
    #[error("Invalid mode {0}")]
    InvalidMode(u8),
    #[error("Token balance would overflow")]
    Overflow,
}

/// How an [`InMemoryToken`] answers `transfer_from`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenMode {
    /// Honours allowance and balance.
    #[default]
    Normal,
    /// Reports failure without moving anything.
    Fail,
    /// Reports success but moves only half of the requested amount.
    Partial,
}

impl TryFrom<u8> for TokenMode {
    type Error = TokenError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Normal),
            1 => Ok(Self::Fail),
            2 => Ok(Self::Partial),
            other => Err(TokenError::InvalidMode(other)),
        }
    }
}

/// Fungible token kept entirely in memory, with a switchable misbehaviour mode.
#[derive(Debug, Default, Clone)]
pub struct InMemoryToken {
    balances: HashMap<Address, Amount>,
    // (owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address), Amount>,
    mode: TokenMode,
}

impl InMemoryToken {
    pub fn with_mode(mode: TokenMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> TokenMode {
        self.mode
    }

    pub fn set_mode(&mut self, raw: u8) -> Result<(), TokenError> {
        self.mode = TokenMode::try_from(raw)?;
        Ok(())
    }

    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<(), TokenError> {
        let balance = self.balances.entry(to).or_default();
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        self.allowances.insert((owner, spender), amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                holder: *from,
                requested: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(*from, debited);
        self.balances.insert(*to, credited);
        Ok(())
    }

    /// Spends `allowance` of the spender and moves `moved` tokens.
    fn spend_and_move(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        allowance: Amount,
        moved: Amount,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(from, spender);
        let remaining = allowed
            .checked_sub(allowance)
            .ok_or(TokenError::InsufficientAllowance {
                spender: *spender,
                requested: allowance,
                allowed,
            })?;
        self.transfer(from, to, moved)?;
        self.allowances.insert((*from, *spender), remaining);
        Ok(())
    }
}

impl TokenContract for InMemoryToken {
    fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> bool {
        let result = match self.mode {
            TokenMode::Normal => self.spend_and_move(spender, from, to, amount, amount),
            TokenMode::Fail => return false,
            TokenMode::Partial => self.spend_and_move(spender, from, to, amount, amount / 2),
        };
        if let Err(err) = &result {
            debug!(%from, %to, amount, %err, "token transfer_from rejected");
        }
        result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLDER: Address = Address::new([1; 20]);
    const SPENDER: Address = Address::new([2; 20]);
    const SINK: Address = Address::new([3; 20]);

    fn funded(mode: TokenMode) -> InMemoryToken {
        let mut token = InMemoryToken::with_mode(mode);
        token.mint(HOLDER, 1_000).unwrap();
        token
    }

    #[test]
    fn normal_mode_requires_allowance() {
        let mut token = funded(TokenMode::Normal);
        assert!(!token.transfer_from(&SPENDER, &HOLDER, &SINK, 100));
        assert_eq!(token.balance_of(&HOLDER), 1_000);

        token.approve(HOLDER, SPENDER, 100);
        assert!(token.transfer_from(&SPENDER, &HOLDER, &SINK, 100));
        assert_eq!(token.balance_of(&HOLDER), 900);
        assert_eq!(token.balance_of(&SINK), 100);
        assert_eq!(token.allowance(&HOLDER, &SPENDER), 0);
    }

    #[test]
    fn normal_mode_requires_balance() {
        let mut token = funded(TokenMode::Normal);
        token.approve(HOLDER, SPENDER, 5_000);
        assert!(!token.transfer_from(&SPENDER, &HOLDER, &SINK, 2_000));
        // failed call leaves allowance intact
        assert_eq!(token.allowance(&HOLDER, &SPENDER), 5_000);
        assert_eq!(token.balance_of(&SINK), 0);
    }

    #[test]
    fn fail_mode_moves_nothing() {
        let mut token = funded(TokenMode::Fail);
        token.approve(HOLDER, SPENDER, 100);
        assert!(!token.transfer_from(&SPENDER, &HOLDER, &SINK, 100));
        assert_eq!(token.balance_of(&HOLDER), 1_000);
    }

    #[test]
    fn partial_mode_moves_half() {
        let mut token = funded(TokenMode::Partial);
        token.approve(HOLDER, SPENDER, 100);
        assert!(token.transfer_from(&SPENDER, &HOLDER, &SINK, 100));
        assert_eq!(token.balance_of(&SINK), 50);
        assert_eq!(token.balance_of(&HOLDER), 950);
    }

    #[test]
    fn set_mode() {
        let mut token = InMemoryToken::default();
        assert_eq!(token.mode(), TokenMode::Normal);
        token.set_mode(2).unwrap();
        assert_eq!(token.mode(), TokenMode::Partial);
        assert_eq!(token.set_mode(3), Err(TokenError::InvalidMode(3)));
        assert_eq!(token.mode(), TokenMode::Partial);
        assert_eq!(TokenError::InvalidMode(3).to_string(), "Invalid mode 3");
    }

    #[test]
    fn failed_call_is_rolled_back() {
        let asset = Address::new([7; 20]);
        let mut token = funded(TokenMode::Partial);
        token.approve(HOLDER, SPENDER, 100);
        let mut directory = HashMap::from([(asset, token)]);

        let result = directory.call_reverting(&asset, &mut |token| {
            assert!(token.transfer_from(&SPENDER, &HOLDER, &SINK, 100));
            Err(TransferError::TransferMismatch {
                expected: 100,
                actual: token.balance_of(&SINK),
            })
        });
        assert_eq!(
            result,
            Some(Err(TransferError::TransferMismatch {
                expected: 100,
                actual: 50
            }))
        );
        let token = &directory[&asset];
        assert_eq!(token.balance_of(&SINK), 0);
        assert_eq!(token.balance_of(&HOLDER), 1_000);
        assert_eq!(token.allowance(&HOLDER, &SPENDER), 100);

        let result = directory.call_reverting(&asset, &mut |token| {
            token.transfer_from(&SPENDER, &HOLDER, &SINK, 10);
            Ok(10)
        });
        assert_eq!(result, Some(Ok(10)));
        assert_eq!(directory[&asset].balance_of(&SINK), 5);
        assert!(directory.call_reverting(&SINK, &mut |_| Ok(0)).is_none());
    }
}
