//! Shared utilities for the Solar workspace.

pub mod format;
pub mod logging;

pub use format::format_amount;
pub use logging::{init_logging, init_tracing, LogFormat};
