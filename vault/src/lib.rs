//! # drip-vault — Custodial Vault for the Drip Accrual Ledger
//!
//! Where the base asset actually lives. Users deposit the asset into a
//! [`Vault`] and receive interest-accruing ledger credit in return; they
//! redeem credit to get the asset back, interest included. The vault owns
//! its [`drip_ledger::AccrualLedger`] and is the sole holder of the
//! mint-burn capability on it, so credit and custody move in lockstep by
//! construction.
//!
//! ## Architecture
//!
//! ```text
//! custody.rs — Custody trait + in-memory treasury implementation
//! vault.rs   — Deposit / redeem / reward-fund protocol and receipts
//! ```
//!
//! ## Design Principles
//!
//! 1. Debit before release: a redeem burns credit first and rolls the
//!    burn back if the fund release fails, so no state ever exists where
//!    funds left but credit remains (or vice versa).
//! 2. Rewards are supplied out-of-band via [`Vault::reward_fund`]; the
//!    vault has no yield source of its own and does not pretend to.
//! 3. Receipts, not logs, are the caller-facing record of what happened;
//!    tracing events cover the operational side.

pub mod custody;
pub mod vault;

pub use custody::{Custody, CustodyError, TreasuryCustody};
pub use vault::{DepositReceipt, RedeemReceipt, Vault, VaultError};
