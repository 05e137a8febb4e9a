use thiserror::Error;

use crate::{
    address::Address,
    asset::TokenError,
    command::{CommandError, OperationFields, OperationKind},
    native::NativeError,
    vault::VaultError,
};

pub mod in_memory_processor;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    CommandErr(#[from] CommandError),
    #[error(transparent)]
    VaultErr(#[from] VaultError),
    #[error(transparent)]
    TokenErr(#[from] TokenError),
    #[error(transparent)]
    NativeErr(#[from] NativeError),
    #[error("No token contract deployed at {0}")]
    UnknownToken(Address),
}

pub trait OperationProcessor {
    fn process_operation(
        &mut self,
        caller: Address,
        kind: Option<OperationKind>,
        fields: OperationFields,
    ) -> Result<(), ProcessError>;
}
