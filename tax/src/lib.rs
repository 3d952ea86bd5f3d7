//! Transfer tax policy.
//!
//! A taxed transfer is split into six buckets, each a whole percentage of the
//! transferred amount:
//!
//! - **instant reward**: reflected to every included holder
//! - **charity**, **community**, **marketing**: credited to fixed wallets
//! - **liquidity**: accumulated by the token contract for auto-liquidity
//! - **burn**: removed from the supply
//!
//! `total` is the distributable rate (everything except burn). Each bucket is
//! truncated on its own and the recipient keeps the remainder.

pub mod breakdown;
pub mod error;
pub mod policy;

pub use breakdown::TaxBreakdown;
pub use error::TaxError;
pub use policy::{TaxPolicy, TaxRates, TAX_RATE_DENOMINATOR};
