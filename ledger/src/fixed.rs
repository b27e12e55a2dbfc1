//! # Fixed-Point Interest Arithmetic
//!
//! All interest math in drip runs on unsigned fixed-point numbers scaled by
//! [`PRECISION`] (10^18). No floating point anywhere near money.
//!
//! ## Rate Convention
//!
//! A rate `r` is the **per-second growth fraction, pre-scaled by
//! `PRECISION`**: a holder with principal `p` and rate `r` is owed
//! `p * r * elapsed / PRECISION` units of interest after `elapsed` seconds.
//! Equivalently, the multiplicative growth factor over an interval is
//!
//! ```text
//! growth_factor = PRECISION + r * elapsed
//! live          = p * growth_factor / PRECISION
//! ```
//!
//! Growth is linear between settlements; compounding only happens when a
//! settlement folds accrued interest into principal.
//!
//! Rates quoted in human terms (basis points of APR, the convention used
//! across drip's credit products) convert via [`rate_from_apr_bps`].

/// The fixed-point scaling unit. One "whole" in factor space.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Seconds in a (non-leap) year, used for APR conversions.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Computes the multiplicative growth factor for a rate over an interval.
///
/// `PRECISION + rate * elapsed`, or `None` on u128 overflow. At
/// `elapsed == 0` this is exactly `PRECISION` (no instantaneous interest).
pub fn growth_factor(rate: u128, elapsed: u64) -> Option<u128> {
    rate.checked_mul(elapsed as u128)
        .and_then(|accrual| PRECISION.checked_add(accrual))
}

/// Grows `principal` by `rate` over `elapsed` seconds.
///
/// Returns the live balance `principal * growth_factor / PRECISION`, or
/// `None` if the intermediate product overflows u128 or the result no
/// longer fits in u64. The result is always `>= principal`.
pub fn grow(principal: u64, rate: u128, elapsed: u64) -> Option<u64> {
    let factor = growth_factor(rate, elapsed)?;
    let live = (principal as u128).checked_mul(factor)? / PRECISION;
    u64::try_from(live).ok()
}

/// Converts an annual rate in basis points (1 bp = 0.01%) to the
/// per-second fixed-point rate used by the ledger.
///
/// Example: 500 bps (5.00% APR) -> `500 * PRECISION / 10_000 / 31_536_000`.
/// The division truncates; at 10^18 precision the error is far below one
/// unit of interest per year on any u64 principal.
pub fn rate_from_apr_bps(bps: u32) -> u128 {
    bps as u128 * PRECISION / 10_000 / SECONDS_PER_YEAR as u128
}
