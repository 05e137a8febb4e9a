use std::collections::HashMap;

use crate::{
    address::Address,
    asset::InMemoryToken,
    command::{LedgerCommand, OperationFields, OperationKind, TokenCommand, VaultCommand},
    native::NativeWallets,
    vault::Vault,
};

use super::{OperationProcessor, ProcessError};

/// Owns the vault together with everything outside it: the callers' native
/// wallets and the token contracts.
///
/// A rejected operation leaves all three as they were.
#[derive(Debug)]
pub struct InMemoryProcessor {
    pub vault: Vault,
    pub wallets: NativeWallets,
    pub tokens: HashMap<Address, InMemoryToken>,
}

impl InMemoryProcessor {
    pub fn new(vault: Vault) -> Self {
        Self {
            vault,
            wallets: NativeWallets::default(),
            tokens: HashMap::new(),
        }
    }

    pub fn execute(&mut self, caller: Address, command: LedgerCommand) -> Result<(), ProcessError> {
        match command {
            LedgerCommand::Vault(command) => self.execute_vault(caller, command),
            LedgerCommand::Token(command) => self.execute_token(caller, command),
        }
    }

    fn execute_vault(&mut self, caller: Address, command: VaultCommand) -> Result<(), ProcessError> {
        match command {
            VaultCommand::Receive { value } => {
                self.wallets.ensure_can_pay(&caller, value)?;
                self.vault.receive(caller, value)?;
                self.wallets.charge(&caller, value)?;
            }
            VaultCommand::DepositEther { value } => {
                self.wallets.ensure_can_pay(&caller, value)?;
                self.vault.deposit_ether(caller, value)?;
                self.wallets.charge(&caller, value)?;
            }
            VaultCommand::WithdrawEther { amount } => {
                self.vault
                    .withdraw_ether(caller, amount, &mut self.wallets)?;
            }
            VaultCommand::DepositToken { asset, amount } => {
                self.vault
                    .deposit_token(caller, asset, amount, &mut self.tokens)?;
            }
            VaultCommand::Pause => self.vault.pause(caller)?,
            VaultCommand::Unpause => self.vault.unpause(caller)?,
            VaultCommand::EmergencyWithdraw => {
                self.vault.emergency_withdraw(caller, &mut self.wallets)?;
            }
            VaultCommand::TransferOwnership { new_owner } => {
                self.vault.transfer_ownership(caller, new_owner)?;
            }
        }
        Ok(())
    }

    fn execute_token(&mut self, caller: Address, command: TokenCommand) -> Result<(), ProcessError> {
        match command {
            TokenCommand::Approve {
                asset,
                spender,
                amount,
            } => {
                let spender = spender.unwrap_or(self.vault.address());
                self.token_mut(&asset)?.approve(caller, spender, amount);
            }
            TokenCommand::SetMode { asset, mode } => {
                self.token_mut(&asset)?.set_mode(mode)?;
            }
        }
        Ok(())
    }

    fn token_mut(&mut self, asset: &Address) -> Result<&mut InMemoryToken, ProcessError> {
        self.tokens
            .get_mut(asset)
            .ok_or(ProcessError::UnknownToken(*asset))
    }
}

impl OperationProcessor for InMemoryProcessor {
    fn process_operation(
        &mut self,
        caller: Address,
        kind: Option<OperationKind>,
        fields: OperationFields,
    ) -> Result<(), ProcessError> {
        let command = LedgerCommand::parse_command(kind, fields)?;
        self.execute(caller, command)
    }
}
