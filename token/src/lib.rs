//! Solar reflection token engine.
//!
//! A fee-on-transfer token whose instant-reward tax is redistributed to every
//! included holder in O(1) by shrinking the reflected supply. The remaining
//! buckets go to fixed wallets, to the token contract for auto-liquidity, or
//! are burned.
//!
//! This crate handles:
//! - Taxed and untaxed transfer settlement with staged, all-or-nothing writes
//! - Owner-only exclusion, tax, exemption and ownership management
//! - Allowances with a safe approval sequence
//! - Auto-liquidity through a pluggable [`Exchange`](solar_types::Exchange)
//! - Genesis configuration, snapshots and event signals

pub mod allowance;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod liquidity;
pub mod snapshot;

pub use allowance::{AllowanceStore, UNLIMITED_ALLOWANCE};
pub use config::{LiquidityConfig, TokenConfig};
pub use engine::{FeeWallets, ReflectionToken};
pub use error::{ErrorKind, TokenError};
pub use events::{EventBus, TokenEvent};
pub use liquidity::{LiquidityProvisioner, SwapLock};
pub use snapshot::TokenSnapshot;
