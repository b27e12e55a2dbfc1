//! # Accrual Ledger
//!
//! The interest-accruing balance ledger. Each holder's credit grows
//! linearly over time at a rate locked in when their balance last went
//! from zero to non-zero, while the global rate offered to *new* holders
//! can only ever be lowered.
//!
//! There is no background process. A holder's **live balance** is computed
//! on demand from `(principal, rate, last_settled)` and the current clock
//! reading, and every mutating operation first **settles** the holder —
//! folds accrued interest into principal via the supply book and resets
//! the accrual clock — before touching principal. Settlement is what makes
//! growth compound: between settlements growth is linear, but each
//! settlement enlarges the principal that future accrual computes from.
//!
//! ## Invariants
//!
//! - Live balance never falls below principal.
//! - The global rate is non-increasing over the ledger's lifetime.
//! - A holder's locked rate changes only at a zero→non-zero transition.
//! - `last_settled` is non-decreasing and equals "now" right after any
//!   settlement; settling twice at the same instant accrues nothing twice.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::{AccessError, AccessPolicy};
use crate::clock::Clock;
use crate::fixed;
use crate::supply::{SupplyBook, SupplyError};

/// Reserved amount meaning "my full live balance".
///
/// Passing this to [`AccrualLedger::debit`] or [`AccrualLedger::transfer`]
/// resolves to the holder's entire settled balance, so a withdraw-all never
/// strands dust from interest accrued between quoting a balance and acting
/// on it. The vault's redeem honors the same sentinel.
pub const MAX_AMOUNT: u64 = u64::MAX;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A capability check failed.
    #[error("access error: {0}")]
    Access(#[from] AccessError),

    /// The underlying supply book rejected an operation.
    #[error("supply error: {0}")]
    Supply(#[from] SupplyError),

    /// A debit or transfer exceeds the holder's settled balance.
    #[error("insufficient balance: {holder} has {available} settled, requested {requested}")]
    InsufficientBalance {
        /// The holder being debited.
        holder: String,
        /// Settled principal available.
        available: u64,
        /// Amount that was requested.
        requested: u64,
    },

    /// A proposed global rate was not strictly below the current one.
    #[error("global rate must strictly decrease: current {current}, proposed {proposed}")]
    RateMustDecrease {
        /// The rate currently in effect.
        current: u128,
        /// The rate that was rejected.
        proposed: u128,
    },

    /// Accrual arithmetic overflowed. Indicates an absurd rate, an absurd
    /// elapsed time, or both.
    #[error("accrual overflow for holder {holder}")]
    Overflow {
        /// The holder whose balance could not be computed.
        holder: String,
    },
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Per-holder accrual state. Principal itself lives in the supply book.
///
/// Created lazily on a holder's first settlement and never destroyed: a
/// holder whose principal returns to zero keeps their record (rate and
/// timestamp) until the next zero→non-zero credit overwrites the rate.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HolderRecord {
    /// Per-second growth fraction scaled by [`fixed::PRECISION`], locked
    /// at the holder's last zero→non-zero transition.
    pub rate: u128,
    /// Clock reading at the holder's last settlement.
    pub last_settled: u64,
}

/// Record of a successful global rate change, emitted by
/// [`AccrualLedger::set_global_rate`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateChange {
    /// The rate that was in effect before the change.
    pub previous: u128,
    /// The new, strictly lower rate.
    pub new_rate: u128,
    /// Wall-clock time of the change.
    pub changed_at: DateTime<Utc>,
}

/// A point-in-time copy of one holder's complete ledger state.
///
/// The execution model requires every operation to commit or fail
/// atomically; for callers that couple a debit to an external action
/// (the vault's custody release), this is the rollback primitive —
/// [`AccrualLedger::restore`] puts principal, rate, last-settled and
/// total supply back exactly as captured.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HolderSnapshot {
    holder: String,
    principal: u64,
    record: Option<HolderRecord>,
}

// ---------------------------------------------------------------------------
// AccrualLedger
// ---------------------------------------------------------------------------

/// The interest-accruing ledger.
///
/// Construction injects the two collaborators the ledger refuses to own:
/// the [`AccessPolicy`] deciding who may mint/burn and who may lower the
/// rate, and the [`Clock`] supplying monotonic seconds. Each mutating
/// operation samples the clock exactly once and runs to completion
/// single-threaded; views may race mutators and see either side.
pub struct AccrualLedger {
    /// Principal balances. The ledger never stores principal itself.
    book: SupplyBook,
    /// Per-holder rate and settlement timestamp, created lazily.
    records: HashMap<String, HolderRecord>,
    /// Rate offered at the next zero→non-zero transition. Only decreases.
    global_rate: u128,
    policy: Box<dyn AccessPolicy>,
    clock: Arc<dyn Clock>,
}

impl AccrualLedger {
    /// Creates a ledger offering `global_rate` to its first depositors.
    pub fn new(global_rate: u128, policy: Box<dyn AccessPolicy>, clock: Arc<dyn Clock>) -> Self {
        Self {
            book: SupplyBook::new(),
            records: HashMap::new(),
            global_rate,
            policy,
            clock,
        }
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// The rate currently offered to newly-credited holders.
    pub fn global_rate(&self) -> u128 {
        self.global_rate
    }

    /// The rate locked in for `holder`, or 0 if never credited.
    pub fn rate_of(&self, holder: &str) -> u128 {
        self.records.get(holder).map(|r| r.rate).unwrap_or(0)
    }

    /// Stored principal for `holder`, with no settlement performed.
    ///
    /// Use this to distinguish "deposited" from "deposited plus accrued";
    /// for the latter see [`live_balance`](Self::live_balance).
    pub fn principal_of(&self, holder: &str) -> u64 {
        self.book.balance_of(holder)
    }

    /// Principal plus interest accrued since the holder's last settlement.
    ///
    /// Pure view: nothing is settled, nothing is mutated. At zero elapsed
    /// time this equals [`principal_of`](Self::principal_of).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the accrual product exceeds
    /// the arithmetic range.
    pub fn live_balance(&self, holder: &str) -> Result<u64, LedgerError> {
        let principal = self.book.balance_of(holder);
        let record = match self.records.get(holder) {
            Some(record) => record,
            None => return Ok(principal),
        };
        let elapsed = self.clock.now().saturating_sub(record.last_settled);
        fixed::grow(principal, record.rate, elapsed).ok_or_else(|| LedgerError::Overflow {
            holder: holder.to_string(),
        })
    }

    /// Read-only access to the underlying principal supply book.
    pub fn supply(&self) -> &SupplyBook {
        &self.book
    }

    // -----------------------------------------------------------------------
    // Settlement
    // -----------------------------------------------------------------------

    /// Folds accrued interest into `holder`'s principal and resets their
    /// accrual clock to `now`. Returns the interest that was materialized.
    ///
    /// Runs before principal is read or written in every mutator. The
    /// timestamp is reset even when nothing accrued, so the same interval
    /// is never counted twice.
    fn settle_at(&mut self, holder: &str, now: u64) -> Result<u64, LedgerError> {
        let (rate, last_settled) = match self.records.get(holder) {
            Some(record) => (record.rate, record.last_settled),
            None => {
                // First contact: spring the record into existence with the
                // accrual clock already at now, so nothing pre-accrues.
                self.records.insert(
                    holder.to_string(),
                    HolderRecord {
                        rate: 0,
                        last_settled: now,
                    },
                );
                (0, now)
            }
        };

        let principal = self.book.balance_of(holder);
        let elapsed = now.saturating_sub(last_settled);
        let live = fixed::grow(principal, rate, elapsed).ok_or_else(|| LedgerError::Overflow {
            holder: holder.to_string(),
        })?;

        let accrued = live - principal;
        if accrued > 0 {
            self.book.issue(holder, accrued)?;
            tracing::debug!(holder, accrued, "ledger: settled accrued interest");
        }

        if let Some(record) = self.records.get_mut(holder) {
            record.last_settled = now;
        }

        Ok(accrued)
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    /// Credits `amount` new units to `holder`. Mint-burn gated.
    ///
    /// Settles first. If the holder's settled principal is zero and
    /// `amount` is positive, the current global rate is locked in for them.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Access`] if `caller` lacks the mint-burn
    /// role, or [`LedgerError::Supply`] on overflow. On failure the
    /// holder's state is exactly as before the call.
    pub fn credit(&mut self, caller: &str, holder: &str, amount: u64) -> Result<u64, LedgerError> {
        self.policy.require_mint_burn(caller)?;
        let now = self.clock.now();
        let before = self.snapshot(holder);

        match self.settled_credit(holder, now, amount) {
            Ok(new_principal) => {
                tracing::debug!(holder, amount, new_principal, "ledger: credit");
                Ok(new_principal)
            }
            Err(err) => {
                self.restore(before);
                Err(err)
            }
        }
    }

    fn settled_credit(&mut self, holder: &str, now: u64, amount: u64) -> Result<u64, LedgerError> {
        self.settle_at(holder, now)?;

        // Zero -> non-zero transition locks in the rate on offer right now.
        if self.book.balance_of(holder) == 0 && amount > 0 {
            if let Some(record) = self.records.get_mut(holder) {
                record.rate = self.global_rate;
            }
        }

        Ok(self.book.issue(holder, amount)?)
    }

    /// Debits `amount` units from `holder`. Mint-burn gated.
    ///
    /// Settles first, so freshly accrued interest is debitable. The
    /// [`MAX_AMOUNT`] sentinel resolves to the full settled balance.
    /// Returns the amount actually debited.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Access`] if `caller` lacks the mint-burn
    /// role, or [`LedgerError::InsufficientBalance`] if `amount` exceeds
    /// the settled principal. On failure the holder's state, including
    /// any settlement this call performed, is restored.
    pub fn debit(&mut self, caller: &str, holder: &str, amount: u64) -> Result<u64, LedgerError> {
        self.policy.require_mint_burn(caller)?;
        let now = self.clock.now();
        let before = self.snapshot(holder);

        match self.settled_debit(holder, now, amount) {
            Ok(debited) => {
                tracing::debug!(holder, debited, "ledger: debit");
                Ok(debited)
            }
            Err(err) => {
                self.restore(before);
                Err(err)
            }
        }
    }

    fn settled_debit(&mut self, holder: &str, now: u64, amount: u64) -> Result<u64, LedgerError> {
        self.settle_at(holder, now)?;

        let principal = self.book.balance_of(holder);
        // Post-settlement, live balance == principal, so the withdraw-all
        // sentinel resolves to principal.
        let amount = if amount == MAX_AMOUNT { principal } else { amount };
        if amount > principal {
            return Err(LedgerError::InsufficientBalance {
                holder: holder.to_string(),
                available: principal,
                requested: amount,
            });
        }

        self.book.burn(holder, amount)?;
        Ok(amount)
    }

    /// Moves `amount` units from `from` to `to`. Holder-initiated; no
    /// capability required.
    ///
    /// Both endpoints are settled at the same sampled instant before any
    /// principal moves. The [`MAX_AMOUNT`] sentinel resolves to the
    /// sender's full settled balance. A recipient whose principal is zero
    /// inherits the **sender's** locked rate — early, high-rate holders
    /// propagate their advantage by transferring — while a recipient with
    /// an existing balance keeps their own rate. Transferring to oneself
    /// is validated but moves nothing. Returns the amount moved.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientBalance`] if `amount` exceeds
    /// the sender's settled principal. On failure both endpoints are
    /// restored to their pre-call state.
    pub fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<u64, LedgerError> {
        let now = self.clock.now();
        let before_from = self.snapshot(from);
        let before_to = self.snapshot(to);

        match self.settled_transfer(from, to, now, amount) {
            Ok(moved) => {
                tracing::debug!(from, to, moved, "ledger: transfer");
                Ok(moved)
            }
            Err(err) => {
                self.restore(before_to);
                self.restore(before_from);
                Err(err)
            }
        }
    }

    fn settled_transfer(
        &mut self,
        from: &str,
        to: &str,
        now: u64,
        amount: u64,
    ) -> Result<u64, LedgerError> {
        self.settle_at(from, now)?;
        self.settle_at(to, now)?;

        let from_principal = self.book.balance_of(from);
        let amount = if amount == MAX_AMOUNT {
            from_principal
        } else {
            amount
        };
        if amount > from_principal {
            return Err(LedgerError::InsufficientBalance {
                holder: from.to_string(),
                available: from_principal,
                requested: amount,
            });
        }

        if from != to && self.book.balance_of(to) == 0 && amount > 0 {
            let sender_rate = self.rate_of(from);
            if let Some(record) = self.records.get_mut(to) {
                record.rate = sender_rate;
            }
        }

        self.book.transfer(from, to, amount)?;
        Ok(amount)
    }

    /// Lowers the global rate. Owner gated.
    ///
    /// Holders who already locked a rate are unaffected; only future
    /// zero→non-zero transitions see the new rate.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Access`] if `caller` is not the owner, or
    /// [`LedgerError::RateMustDecrease`] if `new_rate` is not strictly
    /// below the current rate. The rate is unchanged on failure.
    pub fn set_global_rate(&mut self, caller: &str, new_rate: u128) -> Result<RateChange, LedgerError> {
        self.policy.require_owner(caller)?;
        if new_rate >= self.global_rate {
            return Err(LedgerError::RateMustDecrease {
                current: self.global_rate,
                proposed: new_rate,
            });
        }

        let previous = self.global_rate;
        self.global_rate = new_rate;
        tracing::info!(previous = %previous, new_rate = %new_rate, "ledger: global rate lowered");

        Ok(RateChange {
            previous,
            new_rate,
            changed_at: Utc::now(),
        })
    }

    // -----------------------------------------------------------------------
    // Rollback
    // -----------------------------------------------------------------------

    /// Captures `holder`'s complete ledger state for later [`restore`](Self::restore).
    pub fn snapshot(&self, holder: &str) -> HolderSnapshot {
        HolderSnapshot {
            holder: holder.to_string(),
            principal: self.book.balance_of(holder),
            record: self.records.get(holder).copied(),
        }
    }

    /// Restores a holder to a previously captured snapshot, adjusting the
    /// supply book so total supply stays consistent.
    pub fn restore(&mut self, snapshot: HolderSnapshot) {
        self.book.set_balance(&snapshot.holder, snapshot.principal);
        match snapshot.record {
            Some(record) => {
                self.records.insert(snapshot.holder, record);
            }
            None => {
                self.records.remove(&snapshot.holder);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::RoleRegistry;
    use crate::clock::ManualClock;
    use crate::fixed::PRECISION;

    const OWNER: &str = "drip:owner";
    const MINTER: &str = "drip:vault-authority";

    /// 0.1% growth per second. Large enough that one second of accrual is
    /// visible on small test principals.
    const R0: u128 = PRECISION / 1000;

    fn ledger_at_rate(rate: u128) -> (Arc<ManualClock>, AccrualLedger) {
        let clock = Arc::new(ManualClock::starting_at(1_000_000));
        let policy = RoleRegistry::new(OWNER).with_mint_burn(MINTER);
        let ledger = AccrualLedger::new(rate, Box::new(policy), clock.clone());
        (clock, ledger)
    }

    fn ledger() -> (Arc<ManualClock>, AccrualLedger) {
        ledger_at_rate(R0)
    }

    #[test]
    fn credit_requires_mint_burn_role() {
        let (_clock, mut ledger) = ledger();
        let result = ledger.credit("drip:mallory", "alice", 1_000);
        assert!(matches!(result, Err(LedgerError::Access(_))));
        assert_eq!(ledger.principal_of("alice"), 0);
    }

    #[test]
    fn debit_requires_mint_burn_role() {
        let (_clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 1_000).unwrap();
        assert!(matches!(
            ledger.debit("alice", "alice", 100),
            Err(LedgerError::Access(_))
        ));
    }

    #[test]
    fn first_credit_locks_global_rate() {
        let (_clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 1_000).unwrap();
        assert_eq!(ledger.rate_of("alice"), R0);
    }

    #[test]
    fn live_balance_equals_principal_at_zero_elapsed() {
        let (_clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();
        assert_eq!(ledger.live_balance("alice").unwrap(), 100_000);
    }

    #[test]
    fn live_balance_grows_linearly_between_settlements() {
        let (clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();

        // 100_000 * (1 + 0.001 * 10) = 101_000
        clock.advance(10);
        assert_eq!(ledger.live_balance("alice").unwrap(), 101_000);

        // Same interval again with no settlement in between: same growth.
        clock.advance(10);
        assert_eq!(ledger.live_balance("alice").unwrap(), 102_000);

        // Principal is untouched by views.
        assert_eq!(ledger.principal_of("alice"), 100_000);
    }

    #[test]
    fn settlement_folds_interest_into_principal() {
        let (clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();
        clock.advance(10);

        // Any mutator settles first; a zero-amount credit is the cheapest.
        ledger.credit(MINTER, "alice", 0).unwrap();
        assert_eq!(ledger.principal_of("alice"), 101_000);
        assert_eq!(ledger.live_balance("alice").unwrap(), 101_000);
    }

    #[test]
    fn growth_compounds_across_settlements() {
        let (clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();

        clock.advance(10);
        ledger.credit(MINTER, "alice", 0).unwrap(); // settle at 101_000

        // Second interval accrues on the enlarged principal: 101_000 * 1.01.
        clock.advance(10);
        assert_eq!(ledger.live_balance("alice").unwrap(), 102_010);
    }

    #[test]
    fn settlement_is_idempotent_at_one_instant() {
        let (clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();
        clock.advance(10);

        ledger.credit(MINTER, "alice", 0).unwrap();
        ledger.credit(MINTER, "alice", 0).unwrap();
        assert_eq!(ledger.principal_of("alice"), 101_000);
    }

    #[test]
    fn credit_to_nonzero_holder_preserves_rate() {
        let (_clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 1_000).unwrap();
        ledger.set_global_rate(OWNER, R0 / 2).unwrap();

        // Top-up while non-zero: no re-lock.
        ledger.credit(MINTER, "alice", 1_000).unwrap();
        assert_eq!(ledger.rate_of("alice"), R0);
    }

    #[test]
    fn zeroed_holder_relocks_at_next_credit() {
        let (_clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 1_000).unwrap();
        ledger.debit(MINTER, "alice", MAX_AMOUNT).unwrap();

        // Record survives at zero principal with the old rate.
        assert_eq!(ledger.rate_of("alice"), R0);

        ledger.set_global_rate(OWNER, R0 / 2).unwrap();
        ledger.credit(MINTER, "alice", 500).unwrap();
        assert_eq!(ledger.rate_of("alice"), R0 / 2);
    }

    #[test]
    fn debit_includes_freshly_accrued_interest() {
        let (clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();
        clock.advance(10);

        // 101_000 is only reachable if settlement ran before the check.
        let debited = ledger.debit(MINTER, "alice", 101_000).unwrap();
        assert_eq!(debited, 101_000);
        assert_eq!(ledger.principal_of("alice"), 0);
    }

    #[test]
    fn debit_sentinel_drains_live_balance() {
        let (clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();
        clock.advance(10);

        let debited = ledger.debit(MINTER, "alice", MAX_AMOUNT).unwrap();
        assert_eq!(debited, 101_000);
        assert_eq!(ledger.live_balance("alice").unwrap(), 0);
    }

    #[test]
    fn debit_beyond_settled_balance_rejected() {
        let (clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();
        clock.advance(10);

        let result = ledger.debit(MINTER, "alice", 101_001);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance {
                available: 101_000,
                requested: 101_001,
                ..
            })
        ));
        // The failed debit's settlement was rolled back with it; the
        // interest is still pending, not materialized.
        assert_eq!(ledger.principal_of("alice"), 100_000);
        assert_eq!(ledger.live_balance("alice").unwrap(), 101_000);
    }

    #[test]
    fn transfer_moves_settled_balance() {
        let (clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();
        clock.advance(10);

        let moved = ledger.transfer("alice", "bob", 50_000).unwrap();
        assert_eq!(moved, 50_000);
        assert_eq!(ledger.principal_of("alice"), 51_000);
        assert_eq!(ledger.principal_of("bob"), 50_000);
        assert_eq!(ledger.supply().total_supply(), 101_000);
    }

    #[test]
    fn transfer_recipient_inherits_sender_rate() {
        let (_clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();
        ledger.set_global_rate(OWNER, R0 / 10).unwrap();

        // Bob has never held a balance; he gets alice's locked R0, not
        // the lowered global rate.
        ledger.transfer("alice", "bob", MAX_AMOUNT).unwrap();
        assert_eq!(ledger.rate_of("bob"), R0);
        assert_eq!(ledger.principal_of("alice"), 0);
    }

    #[test]
    fn transfer_to_funded_recipient_preserves_their_rate() {
        let (_clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();
        ledger.set_global_rate(OWNER, R0 / 2).unwrap();
        ledger.credit(MINTER, "bob", 1_000).unwrap(); // bob locks R0/2

        ledger.transfer("alice", "bob", 50_000).unwrap();
        assert_eq!(ledger.rate_of("bob"), R0 / 2);
    }

    #[test]
    fn transfer_beyond_balance_rejected() {
        let (clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();
        clock.advance(10);

        let result = ledger.transfer("alice", "bob", 200_000);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { .. })
        ));
        // Both endpoints are exactly pre-call: the sender's interest is
        // still pending and the recipient has no record.
        assert_eq!(ledger.principal_of("alice"), 100_000);
        assert_eq!(ledger.live_balance("alice").unwrap(), 101_000);
        assert_eq!(ledger.principal_of("bob"), 0);
        assert_eq!(ledger.rate_of("bob"), 0);
    }

    #[test]
    fn self_transfer_conserves_balance_and_supply() {
        let (_clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 1_000).unwrap();

        let moved = ledger.transfer("alice", "alice", 400).unwrap();
        assert_eq!(moved, 400);
        assert_eq!(ledger.principal_of("alice"), 1_000);
        assert_eq!(ledger.supply().total_supply(), 1_000);
    }

    #[test]
    fn self_transfer_still_checks_balance() {
        let (_clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 1_000).unwrap();
        assert!(matches!(
            ledger.transfer("alice", "alice", 1_001),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.principal_of("alice"), 1_000);
    }

    #[test]
    fn set_global_rate_requires_owner() {
        let (_clock, mut ledger) = ledger();
        assert!(matches!(
            ledger.set_global_rate(MINTER, R0 / 2),
            Err(LedgerError::Access(_))
        ));
        assert_eq!(ledger.global_rate(), R0);
    }

    #[test]
    fn global_rate_must_strictly_decrease() {
        let (_clock, mut ledger) = ledger();

        assert!(matches!(
            ledger.set_global_rate(OWNER, R0),
            Err(LedgerError::RateMustDecrease { .. })
        ));
        assert!(matches!(
            ledger.set_global_rate(OWNER, R0 * 2),
            Err(LedgerError::RateMustDecrease { .. })
        ));
        assert_eq!(ledger.global_rate(), R0);

        let change = ledger.set_global_rate(OWNER, R0 / 2).unwrap();
        assert_eq!(change.previous, R0);
        assert_eq!(change.new_rate, R0 / 2);
        assert_eq!(ledger.global_rate(), R0 / 2);
    }

    #[test]
    fn rate_drop_does_not_touch_existing_holders() {
        let (clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();
        ledger.set_global_rate(OWNER, R0 / 10).unwrap();

        clock.advance(10);
        // Still growing at the locked R0.
        assert_eq!(ledger.live_balance("alice").unwrap(), 101_000);
        assert_eq!(ledger.rate_of("alice"), R0);
    }

    #[test]
    fn snapshot_restore_roundtrip() {
        let (clock, mut ledger) = ledger();
        ledger.credit(MINTER, "alice", 100_000).unwrap();
        clock.advance(10);

        let before = ledger.snapshot("alice");
        ledger.debit(MINTER, "alice", MAX_AMOUNT).unwrap();
        assert_eq!(ledger.principal_of("alice"), 0);

        ledger.restore(before);
        assert_eq!(ledger.principal_of("alice"), 100_000);
        assert_eq!(ledger.rate_of("alice"), R0);
        assert_eq!(ledger.supply().total_supply(), 100_000);
        // last_settled was restored too, so the interval re-accrues.
        assert_eq!(ledger.live_balance("alice").unwrap(), 101_000);
    }

    #[test]
    fn unknown_holder_views_are_zero() {
        let (_clock, ledger) = ledger();
        assert_eq!(ledger.principal_of("ghost"), 0);
        assert_eq!(ledger.live_balance("ghost").unwrap(), 0);
        assert_eq!(ledger.rate_of("ghost"), 0);
    }

    #[test]
    fn holder_record_serialization_roundtrip() {
        let record = HolderRecord {
            rate: R0,
            last_settled: 1_000_042,
        };
        let json = serde_json::to_string(&record).expect("serialize");
        let recovered: HolderRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(recovered.rate, R0);
        assert_eq!(recovered.last_settled, 1_000_042);
    }
}
