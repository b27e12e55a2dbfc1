//! # Funds Custody
//!
//! The vault holds the base asset through a [`Custody`] collaborator:
//! receiving funds is implicit in the deposit call and cannot fail, while
//! releasing funds to a holder can — and a failed release must abort the
//! enclosing redeem. The vault never duplicates the held-asset balance in
//! the ledger; custody is the single source of truth for it.
//!
//! [`TreasuryCustody`] is the provided in-memory implementation. Its
//! release fails exactly when holdings are insufficient, which is the
//! economically meaningful failure mode: interest being redeemed before
//! anyone funded the rewards that back it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the custody collaborator.
#[derive(Debug, Error)]
pub enum CustodyError {
    /// A release was requested for more than is currently held.
    #[error("cannot release {requested} to {to}: only {held} held")]
    InsufficientHoldings {
        /// Intended recipient of the release.
        to: String,
        /// Amount currently held.
        held: u64,
        /// Amount that was requested.
        requested: u64,
    },

    /// The release was refused for a reason outside the vault's control
    /// (recipient unreachable, downstream transfer rejected, ...).
    #[error("release of {amount} to {to} refused: {reason}")]
    ReleaseRefused {
        /// Intended recipient of the release.
        to: String,
        /// Amount that was being released.
        amount: u64,
        /// Collaborator-supplied explanation.
        reason: String,
    },
}

/// Holds and releases the base asset on the vault's behalf.
pub trait Custody: Send {
    /// Takes custody of `amount` units. Funds arrive attached to the
    /// enclosing call, so this cannot fail.
    fn receive(&mut self, amount: u64);

    /// Releases `amount` units to `to`.
    ///
    /// # Errors
    ///
    /// Any error here aborts the enclosing vault operation; the vault
    /// rolls its ledger effects back.
    fn release(&mut self, to: &str, amount: u64) -> Result<(), CustodyError>;

    /// Base-asset units currently held.
    fn held(&self) -> u64;
}

/// In-memory custody backed by a single held-balance counter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TreasuryCustody {
    held: u64,
}

impl TreasuryCustody {
    /// Creates an empty treasury.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Custody for TreasuryCustody {
    fn receive(&mut self, amount: u64) {
        // The asset itself caps total existence well below u64::MAX;
        // saturate rather than panic if an embedder violates that.
        self.held = self.held.saturating_add(amount);
        tracing::trace!(amount, held = self.held, "custody: received");
    }

    fn release(&mut self, to: &str, amount: u64) -> Result<(), CustodyError> {
        if amount > self.held {
            return Err(CustodyError::InsufficientHoldings {
                to: to.to_string(),
                held: self.held,
                requested: amount,
            });
        }
        self.held -= amount;
        tracing::trace!(to, amount, held = self.held, "custody: released");
        Ok(())
    }

    fn held(&self) -> u64 {
        self.held
    }
}
