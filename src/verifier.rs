use thiserror::Error;
use tracing::debug;

use crate::{address::Address, asset::TokenContract, units::Amount};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("Transfer failed")]
    TransferFailed,
    #[error("Token transfer amount mismatch: expected {expected}, received {actual}")]
    TransferMismatch { expected: Amount, actual: Amount },
}

/// Pulls `amount` of a token from `from` into `custodian`, trusting only the
/// custodian's balance as reported before and after the call.
///
/// Returns the amount that actually arrived, which always equals `amount` on success.
pub fn pull(
    token: &mut dyn TokenContract,
    custodian: &Address,
    from: &Address,
    amount: Amount,
) -> Result<Amount, TransferError> {
    let before = token.balance_of(custodian);
    if !token.transfer_from(custodian, from, custodian, amount) {
        return Err(TransferError::TransferFailed);
    }
    let after = token.balance_of(custodian);
    // a shrinking balance counts as nothing received
    let actual = after.saturating_sub(before);
    debug!(%custodian, %from, expected = amount, actual, "verified token pull");
    if actual != amount {
        return Err(TransferError::TransferMismatch {
            expected: amount,
            actual,
        });
    }
    Ok(actual)
}

#[cfg(test)]
mod tests {
    use crate::asset::{InMemoryToken, TokenMode};

    use super::*;

    const VAULT: Address = Address::new([0xaa; 20]);
    const USER: Address = Address::new([1; 20]);

    fn approved_token(mode: TokenMode) -> InMemoryToken {
        let mut token = InMemoryToken::with_mode(mode);
        token.mint(USER, 500).unwrap();
        token.approve(USER, VAULT, 100);
        token
    }

    #[test]
    fn exact_delta_accepted() {
        let mut token = approved_token(TokenMode::Normal);
        assert_eq!(pull(&mut token, &VAULT, &USER, 100), Ok(100));
        assert_eq!(token.balance_of(&VAULT), 100);
    }

    #[test]
    fn reported_failure() {
        let mut token = approved_token(TokenMode::Fail);
        assert_eq!(
            pull(&mut token, &VAULT, &USER, 100),
            Err(TransferError::TransferFailed)
        );
    }

    #[test]
    fn short_delivery_is_mismatch() {
        let mut token = approved_token(TokenMode::Partial);
        assert_eq!(
            pull(&mut token, &VAULT, &USER, 100),
            Err(TransferError::TransferMismatch {
                expected: 100,
                actual: 50
            })
        );
    }

    /// Claims success, then reports a balance that went down.
    struct Shrinking {
        balance: Amount,
    }

    impl TokenContract for Shrinking {
        fn balance_of(&self, _holder: &Address) -> Amount {
            self.balance
        }

        fn transfer_from(&mut self, _: &Address, _: &Address, _: &Address, _: Amount) -> bool {
            self.balance -= 1;
            true
        }
    }

    #[test]
    fn shrinking_balance_is_mismatch() {
        let mut token = Shrinking { balance: 10 };
        assert_eq!(
            pull(&mut token, &VAULT, &USER, 5),
            Err(TransferError::TransferMismatch {
                expected: 5,
                actual: 0
            })
        );
    }

    /// Reports more than was requested, e.g. a rebasing token.
    struct Inflating {
        balance: Amount,
    }

    impl TokenContract for Inflating {
        fn balance_of(&self, _holder: &Address) -> Amount {
            self.balance
        }

        fn transfer_from(&mut self, _: &Address, _: &Address, _: &Address, amount: Amount) -> bool {
            self.balance += amount + 1;
            true
        }
    }

    #[test]
    fn surplus_is_mismatch() {
        let mut token = Inflating { balance: 0 };
        assert_eq!(
            pull(&mut token, &VAULT, &USER, 5),
            Err(TransferError::TransferMismatch {
                expected: 5,
                actual: 6
            })
        );
    }
}
