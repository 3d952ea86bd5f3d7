//! Token amount types.
//!
//! Amounts are unsigned 256-bit integers counted in raw units. One whole
//! token is `10^decimals` raw units; the default is nine decimals.

pub use primitive_types::{U256, U512};

/// An amount of tokens in raw units.
pub type Amount = U256;

/// Default number of decimals for a freshly configured token.
pub const TOKEN_DECIMALS: u8 = 9;

/// Convert a whole-token count to raw units: `tokens × 10^decimals`.
///
/// Returns `None` if the result does not fit in 256 bits.
pub fn to_raw(tokens: u64, decimals: u8) -> Option<Amount> {
    let scale = U256::from(10u64).checked_pow(U256::from(decimals))?;
    U256::from(tokens).checked_mul(scale)
}
