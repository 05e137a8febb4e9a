use thiserror::Error;
use tracing::{info, warn};

use crate::{
    access::{AccessError, Ownership},
    address::Address,
    asset::TokenDirectory,
    balance::{BalanceError, BalanceStore},
    events::{EventLog, VaultEvent},
    native::NativeSink,
    pause::{PauseError, PauseGate, PauseState},
    units::{Amount, ONE_UNIT},
    verifier::{self, TransferError},
};

/// Per-call ceiling for token deposits: 100 whole units.
pub const MAX_TOKEN_DEPOSIT: Amount = 100 * ONE_UNIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authorization,
    Validation,
    StateMachine,
    Accounting,
    ExternalDependency,
    Arithmetic,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("Caller {caller} is not the owner")]
    Unauthorized { caller: Address },
    #[error("Owner cannot be the zero address")]
    InvalidOwner,
    #[error("Amount must be greater than zero")]
    ZeroAmount,
    #[error("Invalid token address")]
    InvalidAsset,
    #[error("Amount {amount} exceeds the per-deposit ceiling of {max}")]
    ExceedsMaxDeposit { amount: Amount, max: Amount },
    #[error("Contract is paused")]
    Paused,
    #[error("Contract is already paused")]
    AlreadyPaused,
    #[error("Contract is not paused")]
    NotPaused,
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },
    #[error("No Ether available")]
    NoFundsAvailable,
    #[error("Transfer failed")]
    TransferFailed,
    #[error("Token transfer amount mismatch: expected {expected}, received {actual}")]
    TransferMismatch { expected: Amount, actual: Amount },
    #[error("Balance would overflow")]
    Overflow,
}

impl VaultError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VaultError::Unauthorized { .. } | VaultError::InvalidOwner => {
                ErrorCategory::Authorization
            }
            VaultError::ZeroAmount
            | VaultError::InvalidAsset
            | VaultError::ExceedsMaxDeposit { .. } => ErrorCategory::Validation,
            VaultError::Paused | VaultError::AlreadyPaused | VaultError::NotPaused => {
                ErrorCategory::StateMachine
            }
            VaultError::InsufficientBalance { .. } | VaultError::NoFundsAvailable => {
                ErrorCategory::Accounting
            }
            VaultError::TransferFailed | VaultError::TransferMismatch { .. } => {
                ErrorCategory::ExternalDependency
            }
            VaultError::Overflow => ErrorCategory::Arithmetic,
        }
    }
}

impl From<AccessError> for VaultError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthorized { caller } => VaultError::Unauthorized { caller },
            AccessError::InvalidOwner => VaultError::InvalidOwner,
        }
    }
}

impl From<PauseError> for VaultError {
    fn from(err: PauseError) -> Self {
        match err {
            PauseError::Paused => VaultError::Paused,
            PauseError::AlreadyPaused => VaultError::AlreadyPaused,
            PauseError::NotPaused => VaultError::NotPaused,
        }
    }
}

impl From<BalanceError> for VaultError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::InsufficientBalance {
                requested,
                available,
            } => VaultError::InsufficientBalance {
                requested,
                available,
            },
            BalanceError::Overflow => VaultError::Overflow,
        }
    }
}

impl From<TransferError> for VaultError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::TransferFailed => VaultError::TransferFailed,
            TransferError::TransferMismatch { expected, actual } => {
                VaultError::TransferMismatch { expected, actual }
            }
        }
    }
}

/// Custodial vault: per-depositor ledger, single owner and pause gate.
///
/// Every entry point either completes or returns an error leaving the vault
/// untouched. Owner withdrawals draw on the pooled native holdings and do not
/// touch depositor entries, so after a withdrawal the ledger reports more than
/// the vault holds.
#[derive(Debug, Clone)]
pub struct Vault {
    address: Address,
    ownership: Ownership,
    gate: PauseGate,
    balances: BalanceStore,
    held_ether: Amount,
    events: EventLog,
}

impl Vault {
    pub fn new(address: Address, owner: Address) -> Result<Self, VaultError> {
        Ok(Self {
            address,
            ownership: Ownership::new(owner)?,
            gate: PauseGate::default(),
            balances: BalanceStore::default(),
            held_ether: 0,
            events: EventLog::default(),
        })
    }

    pub fn deposit_ether(&mut self, caller: Address, value: Amount) -> Result<(), VaultError> {
        self.accept_ether(caller, value)
    }

    /// Native currency sent without selecting an operation.
    pub fn receive(&mut self, caller: Address, value: Amount) -> Result<(), VaultError> {
        self.accept_ether(caller, value)
    }

    fn accept_ether(&mut self, caller: Address, value: Amount) -> Result<(), VaultError> {
        self.gate.ensure_active()?;
        if value == 0 {
            return Err(VaultError::ZeroAmount);
        }
        let held = self
            .held_ether
            .checked_add(value)
            .ok_or(VaultError::Overflow)?;
        self.balances.credit(caller, value)?;
        self.held_ether = held;
        info!(depositor = %caller, amount = value, "ether deposited");
        self.events.emit(VaultEvent::EtherDeposited {
            depositor: caller,
            amount: value,
        });
        Ok(())
    }

    /// Pays `amount` out of the pooled holdings to the owner.
    ///
    /// Capacity is the total held amount, not the owner's tracked balance.
    pub fn withdraw_ether<S>(
        &mut self,
        caller: Address,
        amount: Amount,
        sink: &mut S,
    ) -> Result<(), VaultError>
    where
        S: NativeSink + ?Sized,
    {
        self.ownership.ensure_owner(&caller)?;
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        if amount > self.held_ether {
            return Err(VaultError::InsufficientBalance {
                requested: amount,
                available: self.held_ether,
            });
        }
        self.payout(amount, sink)?;
        info!(owner = %caller, amount, "ether withdrawn");
        Ok(())
    }

    /// Sweeps every held unit of native currency to the owner.
    /// Depositor entries are left as they are.
    pub fn emergency_withdraw<S>(&mut self, caller: Address, sink: &mut S) -> Result<(), VaultError>
    where
        S: NativeSink + ?Sized,
    {
        self.ownership.ensure_owner(&caller)?;
        if self.held_ether == 0 {
            return Err(VaultError::NoFundsAvailable);
        }
        let amount = self.held_ether;
        self.payout(amount, sink)?;
        warn!(
            owner = %caller,
            amount,
            tracked = self.balances.total_ether(),
            "emergency withdrawal swept all native holdings"
        );
        Ok(())
    }

    // holdings are reduced before the outbound call and restored if it fails
    fn payout<S>(&mut self, amount: Amount, sink: &mut S) -> Result<(), VaultError>
    where
        S: NativeSink + ?Sized,
    {
        let owner = self.ownership.owner();
        self.held_ether -= amount;
        if let Err(err) = sink.send(&owner, amount) {
            self.held_ether += amount;
            warn!(%owner, amount, %err, "native transfer to owner failed");
            return Err(VaultError::TransferFailed);
        }
        Ok(())
    }

    pub fn deposit_token<D>(
        &mut self,
        caller: Address,
        asset: Address,
        amount: Amount,
        tokens: &mut D,
    ) -> Result<(), VaultError>
    where
        D: TokenDirectory + ?Sized,
    {
        self.gate.ensure_active()?;
        if asset.is_zero() {
            return Err(VaultError::InvalidAsset);
        }
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        if amount > MAX_TOKEN_DEPOSIT {
            return Err(VaultError::ExceedsMaxDeposit {
                amount,
                max: MAX_TOKEN_DEPOSIT,
            });
        }
        self.balances.can_credit_token(&asset, &caller, amount)?;

        let custodian = self.address;
        // calling an address with no contract behind it fails like a reverted call
        let received = tokens
            .call_reverting(&asset, &mut |token| {
                verifier::pull(token, &custodian, &caller, amount)
            })
            .ok_or(VaultError::TransferFailed)??;

        self.balances.credit_token(asset, caller, received)?;
        info!(%asset, depositor = %caller, amount = received, "token deposited");
        self.events.emit(VaultEvent::TokenDeposited {
            asset,
            depositor: caller,
            amount: received,
        });
        Ok(())
    }

    pub fn pause(&mut self, caller: Address) -> Result<(), VaultError> {
        self.ownership.ensure_owner(&caller)?;
        self.gate.pause()?;
        info!(owner = %caller, "vault paused");
        Ok(())
    }

    pub fn unpause(&mut self, caller: Address) -> Result<(), VaultError> {
        self.ownership.ensure_owner(&caller)?;
        self.gate.unpause()?;
        info!(owner = %caller, "vault unpaused");
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), VaultError> {
        let previous = self.ownership.transfer(&caller, new_owner)?;
        info!(%previous, %new_owner, "ownership transferred");
        Ok(())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    pub fn pause_state(&self) -> PauseState {
        self.gate.state()
    }

    /// Native currency actually held by the vault.
    pub fn ether_balance(&self) -> Amount {
        self.held_ether
    }

    /// Tracked native balance of a single depositor.
    pub fn user_ether_balance(&self, holder: &Address) -> Amount {
        self.balances.ether_of(holder)
    }

    pub fn token_balance(&self, asset: &Address, holder: &Address) -> Amount {
        self.balances.token_of(asset, holder)
    }

    pub fn balances(&self) -> &BalanceStore {
        &self.balances
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }
}
