//! Reflection accounting over two coupled unit domains.
//!
//! Every holder's balance lives either in *reflected* units (included
//! accounts) or in absolute token units (excluded accounts). The conversion
//! factor between the two is a pure function of four running totals:
//!
//! `rate = (reflected_supply − excluded_reflected) / (token_supply − excluded_tokens)`
//!
//! Shrinking the reflected supply without touching any account raises the
//! token value of every included holder at once, which is how a fee is
//! redistributed with O(1) writes.
//!
//! This crate handles:
//! - Rate derivation and truncating conversions in both directions
//! - Per-account storage as a tagged variant over the account kind
//! - Staged multi-account writes that commit all-or-nothing
//! - Exclusion toggles that leave observable balances unchanged

pub mod account;
pub mod error;
pub mod ledger;
pub mod rate;

pub use account::Account;
pub use error::ReflectionError;
pub use ledger::{AccountLedger, LedgerBatch, LedgerChanges};
pub use rate::{Rate, ReflectionTotals};
