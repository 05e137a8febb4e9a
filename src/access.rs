use thiserror::Error;

use crate::address::Address;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Caller {caller} is not the owner")]
    Unauthorized { caller: Address },
    #[error("Owner cannot be the zero address")]
    InvalidOwner,
}

/// Single-owner gate for privileged operations.
#[derive(Debug, Clone)]
pub struct Ownership {
    owner: Address,
}

impl Ownership {
    pub fn new(owner: Address) -> Result<Self, AccessError> {
        if owner.is_zero() {
            return Err(AccessError::InvalidOwner);
        }
        Ok(Self { owner })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn ensure_owner(&self, caller: &Address) -> Result<(), AccessError> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(AccessError::Unauthorized { caller: *caller })
        }
    }

    /// Replaces the owner and returns the previous one.
    pub fn transfer(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Address, AccessError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(AccessError::InvalidOwner);
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
