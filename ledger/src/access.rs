//! # Access Policy
//!
//! Capability checks for the ledger's privileged operations, modeled as a
//! single-method policy injected at construction time rather than baked-in
//! access-control state. Two roles exist:
//!
//! - **Owner** — may lower the global rate. Nothing else.
//! - **MintBurn** — may credit and debit holder balances. In the intended
//!   deployment the vault's authority address is the sole holder.
//!
//! The ledger never decides *who* holds a role; it only asks the policy.
//! What happens when the owner key is compromised is the policy's problem,
//! not the ledger's.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by capability checks.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The caller does not hold the required role.
    #[error("unauthorized: {caller} does not hold the {role} role")]
    Unauthorized {
        /// Address that attempted the operation.
        caller: String,
        /// The role that was required.
        role: Role,
    },
}

/// The capability roles recognized by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May lower the global rate.
    Owner,
    /// May mint and burn ledger credit.
    MintBurn,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::MintBurn => write!(f, "mint-burn"),
        }
    }
}

/// A capability check injected into the ledger at construction.
pub trait AccessPolicy: Send + Sync {
    /// Succeeds iff `caller` holds `role`.
    fn check(&self, caller: &str, role: Role) -> Result<(), AccessError>;

    /// Convenience wrapper for [`Role::Owner`].
    fn require_owner(&self, caller: &str) -> Result<(), AccessError> {
        self.check(caller, Role::Owner)
    }

    /// Convenience wrapper for [`Role::MintBurn`].
    fn require_mint_burn(&self, caller: &str) -> Result<(), AccessError> {
        self.check(caller, Role::MintBurn)
    }
}

/// The standard policy: one fixed owner address and an explicit set of
/// mint-burn holders, both decided before the ledger is constructed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleRegistry {
    owner: String,
    mint_burn: HashSet<String>,
}

impl RoleRegistry {
    /// Creates a registry with the given owner and no mint-burn holders.
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            mint_burn: HashSet::new(),
        }
    }

    /// Grants the mint-burn role to an address. Builder-style.
    pub fn with_mint_burn(mut self, address: &str) -> Self {
        self.mint_burn.insert(address.to_string());
        self
    }

    /// Returns the owner address.
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

impl AccessPolicy for RoleRegistry {
    fn check(&self, caller: &str, role: Role) -> Result<(), AccessError> {
        let held = match role {
            Role::Owner => caller == self.owner,
            Role::MintBurn => self.mint_burn.contains(caller),
        };
        if held {
            Ok(())
        } else {
            Err(AccessError::Unauthorized {
                caller: caller.to_string(),
                role,
            })
        }
    }
}
