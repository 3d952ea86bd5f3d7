//! Nullable infrastructure for deterministic testing.
//!
//! External collaborators are abstracted behind traits. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record every call for assertions
//!
//! Usage: swap real implementations for nullables in tests and simulations.

pub mod exchange;

pub use exchange::{ExchangeCall, NullExchange};
