use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    address::Address,
    units::{Amount, DECIMALS, UnitsError, parse_units},
};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    DepositEther,
    WithdrawEther,
    DepositToken,
    Pause,
    Unpause,
    EmergencyWithdraw,
    TransferOwnership,
    Approve,
    SetTokenMode,
}

impl OperationKind {
    fn is_payable(self) -> bool {
        matches!(self, OperationKind::DepositEther)
    }
}

/// Raw optional fields accompanying an operation.
#[derive(Debug, Clone, Default)]
pub struct OperationFields {
    /// Native currency attached to the call, in whole units.
    pub value: Option<Decimal>,
    pub asset: Option<Address>,
    /// Operation argument in whole units.
    pub amount: Option<Decimal>,
    pub account: Option<Address>,
    pub mode: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultCommand {
    /// Value sent without an operation.
    Receive { value: Amount },
    DepositEther { value: Amount },
    WithdrawEther { amount: Amount },
    DepositToken { asset: Address, amount: Amount },
    Pause,
    Unpause,
    EmergencyWithdraw,
    TransferOwnership { new_owner: Address },
}

/// Calls addressed to a token contract rather than to the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCommand {
    /// Without a spender the vault is approved.
    Approve {
        asset: Address,
        spender: Option<Address>,
        amount: Amount,
    },
    SetMode { asset: Address, mode: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    Vault(VaultCommand),
    Token(TokenCommand),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Amount is required for {kind:?}")]
    AmountRequired { kind: OperationKind },
    #[error("Asset is required for {kind:?}")]
    AssetRequired { kind: OperationKind },
    #[error("Account is required for {kind:?}")]
    AccountRequired { kind: OperationKind },
    #[error("Mode is required for {kind:?}")]
    ModeRequired { kind: OperationKind },
    #[error("{kind:?} does not accept native currency")]
    NotPayable { kind: OperationKind },
    #[error(transparent)]
    Units(#[from] UnitsError),
}

impl LedgerCommand {
    /// A missing `kind` is a plain value transfer and dispatches to the receive path.
    pub fn parse_command(
        kind: Option<OperationKind>,
        fields: OperationFields,
    ) -> Result<Self, CommandError> {
        let value = to_base_units(fields.value)?.unwrap_or_default();
        let Some(kind) = kind else {
            return Ok(Self::Vault(VaultCommand::Receive { value }));
        };
        if value > 0 && !kind.is_payable() {
            return Err(CommandError::NotPayable { kind });
        }

        let command = match kind {
            OperationKind::DepositEther => Self::Vault(VaultCommand::DepositEther { value }),
            OperationKind::WithdrawEther => Self::Vault(VaultCommand::WithdrawEther {
                amount: required_amount(kind, fields.amount)?,
            }),
            OperationKind::DepositToken => Self::Vault(VaultCommand::DepositToken {
                asset: fields.asset.ok_or(CommandError::AssetRequired { kind })?,
                amount: required_amount(kind, fields.amount)?,
            }),
            OperationKind::Pause => Self::Vault(VaultCommand::Pause),
            OperationKind::Unpause => Self::Vault(VaultCommand::Unpause),
            OperationKind::EmergencyWithdraw => Self::Vault(VaultCommand::EmergencyWithdraw),
            OperationKind::TransferOwnership => Self::Vault(VaultCommand::TransferOwnership {
                new_owner: fields.account.ok_or(CommandError::AccountRequired { kind })?,
            }),
            OperationKind::Approve => Self::Token(TokenCommand::Approve {
                asset: fields.asset.ok_or(CommandError::AssetRequired { kind })?,
                spender: fields.account,
                amount: required_amount(kind, fields.amount)?,
            }),
            OperationKind::SetTokenMode => Self::Token(TokenCommand::SetMode {
                asset: fields.asset.ok_or(CommandError::AssetRequired { kind })?,
                mode: fields.mode.ok_or(CommandError::ModeRequired { kind })?,
            }),
        };
        Ok(command)
    }
}

fn to_base_units(value: Option<Decimal>) -> Result<Option<Amount>, UnitsError> {
    value.map(|v| parse_units(v, DECIMALS)).transpose()
}

fn required_amount(kind: OperationKind, amount: Option<Decimal>) -> Result<Amount, CommandError> {
    to_base_units(amount)?.ok_or(CommandError::AmountRequired { kind })
}
