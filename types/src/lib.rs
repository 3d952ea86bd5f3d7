//! Fundamental types for the Solar token ledger.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account addresses, 256-bit amounts, and the `Exchange` collaborator boundary.

pub mod address;
pub mod amount;
pub mod error;
pub mod exchange;

pub use address::Address;
pub use amount::{to_raw, Amount, TOKEN_DECIMALS, U256, U512};
pub use error::{AddressError, ExchangeError};
pub use exchange::{Exchange, LiquidityReceipt};
