//! # Custodial Vault
//!
//! The [`Vault`] bridges base-asset custody and the accrual ledger:
//! deposits move the asset into custody and mint matching ledger credit,
//! redemptions burn credit and release the asset, in lockstep. The vault's
//! own authority address is the sole holder of the ledger's mint-burn
//! role, so no credit exists that custody never saw.
//!
//! ## Redeem Ordering
//!
//! Redeem debits the ledger *before* releasing funds. If the release
//! fails, the debit (including the settlement it performed) is rolled
//! back from a pre-captured snapshot, so a failing external release can
//! never leave credited-but-unpaid state — and a successful release can
//! never pay out more than was burned.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use drip_ledger::{AccrualLedger, Clock, LedgerError, RoleRegistry, MAX_AMOUNT};

use crate::custody::{Custody, CustodyError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// A deposit of zero was attempted. A no-op deposit almost certainly
    /// indicates a caller bug, so it is rejected rather than ignored.
    #[error("zero-amount deposits are not permitted")]
    ZeroDeposit,

    /// Custody failed to release funds during a redeem. All ledger
    /// effects of the redeem were rolled back; the holder's principal,
    /// rate, and settlement timestamp are exactly as before the call.
    #[error("redeem of {amount} for {holder} failed during fund release: {source}")]
    RedeemTransferFailed {
        /// The holder whose redeem was aborted.
        holder: String,
        /// The amount that could not be paid out.
        amount: u64,
        /// The custody failure that aborted the redeem.
        #[source]
        source: CustodyError,
    },

    /// A ledger operation failed (authorization, balance, rate, overflow).
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// Record of a successful deposit: credit minted, custody grown.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DepositReceipt {
    /// The vault that processed the deposit.
    pub vault_id: Uuid,
    /// The depositing holder.
    pub holder: String,
    /// Base-asset units deposited and ledger units credited.
    pub amount: u64,
    /// The holder's principal after credit (including settled interest).
    pub new_principal: u64,
    /// Wall-clock time of the deposit.
    pub timestamp: DateTime<Utc>,
}

/// Record of a successful redemption: credit burned, funds released.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedeemReceipt {
    /// The vault that processed the redemption.
    pub vault_id: Uuid,
    /// The redeeming holder.
    pub holder: String,
    /// Ledger units burned and base-asset units released. A withdraw-all
    /// sentinel has already been resolved to the live balance.
    pub amount: u64,
    /// The holder's principal remaining after the burn.
    pub remaining_principal: u64,
    /// Wall-clock time of the redemption.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// A custodial vault paired with its own accrual ledger.
///
/// Construction wires the roles: the supplied `owner` may lower the
/// global rate, and the vault's generated authority address receives the
/// mint-burn role — the only address that ever will. Holder-initiated
/// transfers and owner rate changes go directly through
/// [`ledger_mut`](Self::ledger_mut); deposit/redeem/reward flows go
/// through the vault so custody stays in lockstep.
pub struct Vault {
    id: Uuid,
    /// The address this vault uses when calling gated ledger operations.
    authority: String,
    ledger: AccrualLedger,
    custody: Box<dyn Custody>,
}

impl Vault {
    /// Creates a vault offering `global_rate` to new depositors.
    ///
    /// # Arguments
    ///
    /// * `owner` — address allowed to lower the global rate.
    /// * `global_rate` — initial per-second rate, scaled by
    ///   [`drip_ledger::fixed::PRECISION`].
    /// * `clock` — monotonic seconds source shared with the ledger.
    /// * `custody` — base-asset custody collaborator.
    pub fn new(
        owner: &str,
        global_rate: u128,
        clock: Arc<dyn Clock>,
        custody: Box<dyn Custody>,
    ) -> Self {
        let id = Uuid::new_v4();
        let authority = format!("drip:vault:{id}");
        let policy = RoleRegistry::new(owner).with_mint_burn(&authority);
        let ledger = AccrualLedger::new(global_rate, Box::new(policy), clock);

        Self {
            id,
            authority,
            ledger,
            custody,
        }
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// This vault's unique identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The address holding the ledger's mint-burn role.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Base-asset units currently in custody.
    pub fn held(&self) -> u64 {
        self.custody.held()
    }

    /// The vault's ledger. Balance and rate views live here.
    pub fn ledger(&self) -> &AccrualLedger {
        &self.ledger
    }

    /// Mutable ledger access for the operations the vault does not
    /// mediate: holder-initiated transfers and owner rate changes.
    pub fn ledger_mut(&mut self) -> &mut AccrualLedger {
        &mut self.ledger
    }

    // -----------------------------------------------------------------------
    // Protocol Operations
    // -----------------------------------------------------------------------

    /// Deposits `amount` of the base asset for `caller`, crediting
    /// exactly that amount of ledger units.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::ZeroDeposit`] if `amount` is zero, or a
    /// ledger error on credit failure (in which case custody is not
    /// touched).
    pub fn deposit(&mut self, caller: &str, amount: u64) -> Result<DepositReceipt, VaultError> {
        if amount == 0 {
            return Err(VaultError::ZeroDeposit);
        }

        let new_principal = self.ledger.credit(&self.authority, caller, amount)?;
        self.custody.receive(amount);

        tracing::info!(holder = caller, amount, new_principal, "vault: deposit");
        Ok(DepositReceipt {
            vault_id: self.id,
            holder: caller.to_string(),
            amount,
            new_principal,
            timestamp: Utc::now(),
        })
    }

    /// Redeems `amount` of ledger credit for `caller` and releases the
    /// same amount of the base asset to them.
    ///
    /// [`MAX_AMOUNT`] resolves to the caller's live balance before any
    /// state changes. The ledger debit runs first; if the subsequent
    /// custody release fails, every ledger effect of this call is rolled
    /// back and [`VaultError::RedeemTransferFailed`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Ledger`] if the debit fails (insufficient
    /// settled balance), or [`VaultError::RedeemTransferFailed`] if
    /// custody refuses the release. In both cases the holder's state is
    /// exactly as before the call.
    pub fn redeem(&mut self, caller: &str, amount: u64) -> Result<RedeemReceipt, VaultError> {
        let amount = if amount == MAX_AMOUNT {
            self.ledger.live_balance(caller)?
        } else {
            amount
        };

        let before = self.ledger.snapshot(caller);

        // Debit first: a failed external release must find the credit
        // already burned, never the reverse. A failed debit rolls itself
        // back, so the snapshot exists for the release path alone.
        self.ledger.debit(&self.authority, caller, amount)?;

        if let Err(err) = self.custody.release(caller, amount) {
            self.ledger.restore(before);
            tracing::warn!(holder = caller, amount, %err, "vault: redeem rolled back");
            return Err(VaultError::RedeemTransferFailed {
                holder: caller.to_string(),
                amount,
                source: err,
            });
        }

        let remaining_principal = self.ledger.principal_of(caller);
        tracing::info!(holder = caller, amount, remaining_principal, "vault: redeem");
        Ok(RedeemReceipt {
            vault_id: self.id,
            holder: caller.to_string(),
            amount,
            remaining_principal,
            timestamp: Utc::now(),
        })
    }

    /// Grows custody by `amount` without minting any ledger credit.
    ///
    /// This is how accrued interest gets economically backed: anyone may
    /// supply rewards, and the protocol assumes they arrive before
    /// holders redeem more than their principal. Returns the new held
    /// balance.
    pub fn reward_fund(&mut self, funder: &str, amount: u64) -> u64 {
        self.custody.receive(amount);
        tracing::info!(funder, amount, held = self.custody.held(), "vault: reward funded");
        self.custody.held()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
