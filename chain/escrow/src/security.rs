//! Role gate: owner and operator identities
//!
//! Authorization is checked on every privileged call against the identity
//! currently holding the role. Nothing is cached between calls.

use escrow_types::ids::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::EscrowError;

/// Privileged roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Controls the operator identity and pool withdrawals
    Owner,
    /// Commits pending escrows
    Operator,
}

/// Check that `caller` is the current holder of `role`.
pub fn authorize(caller: &Address, role: Role, holder: &Address) -> Result<(), EscrowError> {
    if caller != holder {
        debug!(%caller, ?role, "Authorization denied");
        return Err(EscrowError::Unauthorized { role });
    }
    Ok(())
}

/// Current owner and operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGate {
    owner: Address,
    operator: Address,
}

impl RoleGate {
    pub fn new(owner: Address, operator: Address) -> Self {
        Self { owner, operator }
    }

    /// Identity currently holding `role`.
    pub fn holder(&self, role: Role) -> &Address {
        match role {
            Role::Owner => &self.owner,
            Role::Operator => &self.operator,
        }
    }

    /// Require `caller` to hold `role`.
    pub fn require(&self, caller: &Address, role: Role) -> Result<(), EscrowError> {
        authorize(caller, role, self.holder(role))
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn operator(&self) -> &Address {
        &self.operator
    }

    /// Replace the operator. Owner-only. Returns the previous operator.
    pub fn set_operator(
        &mut self,
        caller: &Address,
        new_operator: Address,
    ) -> Result<Address, EscrowError> {
        self.require(caller, Role::Owner)?;
        Ok(std::mem::replace(&mut self.operator, new_operator))
    }

    /// Hand the owner role to a new identity. Owner-only. Returns the previous owner.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Address, EscrowError> {
        self.require(caller, Role::Owner)?;
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
