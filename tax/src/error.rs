//! Tax-specific errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaxError {
    #[error("invalid tax configuration: {0}")]
    InvalidTaxConfig(String),

    #[error("arithmetic overflow in tax computation")]
    Overflow,
}
