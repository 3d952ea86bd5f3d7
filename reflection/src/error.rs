//! Reflection-specific errors.

use solar_types::U256;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReflectionError {
    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: U256, available: U256 },

    #[error("division by zero: no token supply backs the reflection rate")]
    DivisionByZero,

    #[error("arithmetic overflow in reflection accounting")]
    Overflow,

    #[error("arithmetic underflow in {0}")]
    Underflow(&'static str),
}
