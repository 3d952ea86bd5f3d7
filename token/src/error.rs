//! Token engine errors.

use solar_reflection::ReflectionError;
use solar_tax::TaxError;
use solar_types::{Address, ExchangeError, U256};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("zero address is not a valid participant")]
    ZeroAddress,

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: U256, available: U256 },

    #[error("insufficient allowance: need {needed}, available {available}")]
    InsufficientAllowance { needed: U256, available: U256 },

    #[error("caller {0} is not the owner")]
    NotOwner(Address),

    #[error("division by zero in reflection rate")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("arithmetic underflow in {0}")]
    Underflow(&'static str),

    #[error("invalid tax configuration: {0}")]
    InvalidTaxConfig(String),

    #[error("invalid approval: {0}")]
    InvalidApproval(String),

    #[error("allowance must be reset to zero before changing it (current {current})")]
    UnsafeApprovalSequence { current: U256 },

    #[error("decreased allowance below zero: current {current}, requested {requested}")]
    AllowanceUnderflow { current: U256, requested: U256 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("exchange error: {0}")]
    Exchange(#[from] ExchangeError),
}

/// Coarse classification of a [`TokenError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is unacceptable; nothing changed.
    Validation,
    /// Fixed-point accounting failed; nothing changed.
    Arithmetic,
    /// Rejected configuration or approval sequence; nothing changed.
    Config,
    /// The exchange failed while provisioning liquidity.
    Provisioning,
}

impl TokenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenError::ZeroAddress
            | TokenError::ZeroAmount
            | TokenError::InsufficientBalance { .. }
            | TokenError::InsufficientAllowance { .. }
            | TokenError::NotOwner(_) => ErrorKind::Validation,
            TokenError::DivisionByZero | TokenError::Overflow | TokenError::Underflow(_) => {
                ErrorKind::Arithmetic
            }
            TokenError::InvalidTaxConfig(_)
            | TokenError::InvalidApproval(_)
            | TokenError::UnsafeApprovalSequence { .. }
            | TokenError::AllowanceUnderflow { .. }
            | TokenError::InvalidConfig(_)
            | TokenError::Snapshot(_) => ErrorKind::Config,
            TokenError::Exchange(_) => ErrorKind::Provisioning,
        }
    }
}

impl From<ReflectionError> for TokenError {
    fn from(err: ReflectionError) -> Self {
        match err {
            ReflectionError::InsufficientBalance { needed, available } => {
                TokenError::InsufficientBalance { needed, available }
            }
            ReflectionError::DivisionByZero => TokenError::DivisionByZero,
            ReflectionError::Overflow => TokenError::Overflow,
            ReflectionError::Underflow(what) => TokenError::Underflow(what),
        }
    }
}

impl From<TaxError> for TokenError {
    fn from(err: TaxError) -> Self {
        match err {
            TaxError::InvalidTaxConfig(reason) => TokenError::InvalidTaxConfig(reason),
            TaxError::Overflow => TokenError::Overflow,
        }
    }
}
