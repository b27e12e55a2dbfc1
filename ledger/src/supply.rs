//! # Principal Supply Book
//!
//! The fungible-unit bookkeeping primitive that the accrual engine wraps.
//! A [`SupplyBook`] tracks per-holder principal balances and the total
//! supply, with the standard conservation guarantee: total issued minus
//! total burned always equals the sum of balances.
//!
//! The book knows nothing about interest, rates, or time — it only moves
//! whole units. Every mutation emits a `trace!` event, which is the
//! primitive's notification channel for downstream indexers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during supply-book operations.
#[derive(Debug, Error)]
pub enum SupplyError {
    /// A debit or transfer exceeds the holder's balance.
    #[error("insufficient balance: {holder} has {available}, requested {requested}")]
    InsufficientBalance {
        /// The holder being debited.
        holder: String,
        /// Current balance.
        available: u64,
        /// Amount that was requested.
        requested: u64,
    },

    /// An issue would overflow a balance or the total supply.
    #[error("supply overflow: issuing {amount} to {holder} would exceed u64::MAX")]
    SupplyOverflow {
        /// The holder being credited.
        holder: String,
        /// The amount that caused the overflow.
        amount: u64,
    },
}

/// Per-holder principal balances plus total-supply tracking.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SupplyBook {
    /// Principal balances keyed by holder address.
    balances: HashMap<String, u64>,
    /// Sum of all balances. Maintained on every issue/burn.
    total_supply: u64,
}

impl SupplyBook {
    /// Creates an empty book with zero supply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the balance of `holder`, or 0 if never credited.
    pub fn balance_of(&self, holder: &str) -> u64 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Returns the total number of units in circulation.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Issues `amount` new units to `holder`.
    ///
    /// # Errors
    ///
    /// Returns [`SupplyError::SupplyOverflow`] if the balance or total
    /// supply would exceed `u64::MAX`. Nothing changes on failure.
    pub fn issue(&mut self, holder: &str, amount: u64) -> Result<u64, SupplyError> {
        let overflow = || SupplyError::SupplyOverflow {
            holder: holder.to_string(),
            amount,
        };

        let new_total = self.total_supply.checked_add(amount).ok_or_else(overflow)?;
        let balance = self.balances.entry(holder.to_string()).or_insert(0);
        let new_balance = balance.checked_add(amount).ok_or_else(overflow)?;

        *balance = new_balance;
        self.total_supply = new_total;

        tracing::trace!(holder, amount, new_balance, "supply: issue");
        Ok(new_balance)
    }

    /// Burns `amount` units from `holder`.
    ///
    /// # Errors
    ///
    /// Returns [`SupplyError::InsufficientBalance`] if `holder` has fewer
    /// than `amount` units.
    pub fn burn(&mut self, holder: &str, amount: u64) -> Result<u64, SupplyError> {
        let balance = self.balances.entry(holder.to_string()).or_insert(0);
        if *balance < amount {
            return Err(SupplyError::InsufficientBalance {
                holder: holder.to_string(),
                available: *balance,
                requested: amount,
            });
        }

        *balance -= amount;
        let new_balance = *balance;
        self.total_supply -= amount;

        tracing::trace!(holder, amount, new_balance, "supply: burn");
        Ok(new_balance)
    }

    /// Moves `amount` units from `from` to `to`. Supply is conserved.
    /// A transfer to oneself is checked against the balance but is
    /// otherwise a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SupplyError::InsufficientBalance`] if `from` has fewer
    /// than `amount` units, or [`SupplyError::SupplyOverflow`] if `to`'s
    /// balance would overflow. Nothing changes on failure.
    pub fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<(), SupplyError> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(SupplyError::InsufficientBalance {
                holder: from.to_string(),
                available: from_balance,
                requested: amount,
            });
        }

        // A self-transfer is validated like any other but moves nothing;
        // writing both sides of the same key would double-count it.
        if from == to {
            return Ok(());
        }

        let to_balance = self.balance_of(to);
        let new_to = to_balance
            .checked_add(amount)
            .ok_or_else(|| SupplyError::SupplyOverflow {
                holder: to.to_string(),
                amount,
            })?;

        self.balances.insert(from.to_string(), from_balance - amount);
        self.balances.insert(to.to_string(), new_to);

        tracing::trace!(from, to, amount, "supply: transfer");
        Ok(())
    }

    /// Overwrites a holder's balance, adjusting total supply to match.
    ///
    /// Only used by the accrual engine's rollback path; not part of the
    /// public primitive surface.
    pub(crate) fn set_balance(&mut self, holder: &str, amount: u64) {
        let current = self.balance_of(holder);
        if amount >= current {
            self.total_supply += amount - current;
        } else {
            self.total_supply -= current - amount;
        }
        self.balances.insert(holder.to_string(), amount);
    }
}
