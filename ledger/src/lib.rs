//! # drip-ledger — Interest-Accruing Balance Ledger
//!
//! The core bookkeeping engine of the drip protocol. Holders are credited
//! with ledger units that grow linearly over time at an individually
//! locked-in rate, while the system-wide rate offered to new holders can
//! only ever be lowered. There is no background accrual process: balances
//! reflect accrued interest at every read, and every mutation settles owed
//! interest before touching principal.
//!
//! ## Architecture
//!
//! ```text
//! fixed.rs   — Fixed-point convention (PRECISION = 10^18) and growth math
//! clock.rs   — Injected monotonic seconds clock (system + manual)
//! access.rs  — Capability checks: owner and mint-burn roles
//! supply.rs  — Principal supply book (issue / burn / transfer primitive)
//! accrual.rs — The AccrualLedger: settlement, credit/debit/transfer,
//!              global rate control, snapshot/restore rollback
//! ```
//!
//! ## Design Principles
//!
//! 1. All monetary arithmetic is checked — `checked_add`/`checked_mul`
//!    everywhere, because wrapping arithmetic and money do not mix.
//! 2. Time and authorization are injected collaborators, never ambient
//!    state; accrual is a pure function of stored state plus "now".
//! 3. Every mutating operation settles first, samples the clock once,
//!    and either fully commits or fully fails.
//! 4. Persistent state is serializable (serde) for storage and transport.

pub mod access;
pub mod accrual;
pub mod clock;
pub mod fixed;
pub mod supply;

pub use access::{AccessError, AccessPolicy, Role, RoleRegistry};
pub use accrual::{
    AccrualLedger, HolderRecord, HolderSnapshot, LedgerError, RateChange, MAX_AMOUNT,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use supply::{SupplyBook, SupplyError};
