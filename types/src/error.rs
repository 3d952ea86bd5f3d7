//! Errors for the shared types.

use thiserror::Error;

/// Failure to parse an [`Address`](crate::Address) from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address {0:?} must start with 0x")]
    MissingPrefix(String),

    #[error("address is not valid hex: {0}")]
    InvalidHex(String),

    #[error("address must be 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// Failure reported by the external [`Exchange`](crate::Exchange) collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("swap rejected: {0}")]
    SwapRejected(String),

    #[error("add liquidity rejected: {0}")]
    AddLiquidityRejected(String),

    #[error("exchange unavailable: {0}")]
    Unavailable(String),
}
