//! Global running totals and the conversion rate derived from them.

use serde::{Deserialize, Serialize};
use solar_types::{U256, U512};
use std::fmt;

use crate::error::ReflectionError;

/// The four running totals that define the reflection rate.
///
/// The rate itself is never stored. It is recomputed from these totals on
/// every read, so toggling exclusions or burning can never leave a stale
/// cached rate behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionTotals {
    /// Tokens in existence. Fixed at genesis, only decreased by burns.
    pub token_supply: U256,
    /// Reflected units in existence, held across all accounts.
    pub reflected_supply: U256,
    /// Tokens held by excluded accounts.
    pub excluded_tokens: U256,
    /// Reflected units mirrored by excluded accounts.
    pub excluded_reflected: U256,
}

impl ReflectionTotals {
    /// Totals for a fresh token: `reflected_supply = supply × (U256::MAX / supply)`.
    ///
    /// The scale is the largest one that keeps the reflected supply inside
    /// 256 bits, which keeps truncation in reflected units negligible.
    pub fn genesis(token_supply: U256) -> Result<Self, ReflectionError> {
        if token_supply.is_zero() {
            return Err(ReflectionError::DivisionByZero);
        }
        let scale = U256::MAX / token_supply;
        Ok(Self {
            token_supply,
            reflected_supply: token_supply * scale,
            excluded_tokens: U256::zero(),
            excluded_reflected: U256::zero(),
        })
    }

    /// Tokens held by included accounts.
    pub fn included_tokens(&self) -> Result<U256, ReflectionError> {
        self.token_supply
            .checked_sub(self.excluded_tokens)
            .ok_or(ReflectionError::Underflow("included token supply"))
    }

    /// Reflected units held by included accounts.
    pub fn included_reflected(&self) -> Result<U256, ReflectionError> {
        self.reflected_supply
            .checked_sub(self.excluded_reflected)
            .ok_or(ReflectionError::Underflow("included reflected supply"))
    }

    /// Derive the current rate.
    ///
    /// When the included pool is empty the rate falls back to the genesis
    /// ratio `reflected_supply / token_supply`; with no token supply at all
    /// the rate is undefined.
    pub fn rate(&self) -> Result<Rate, ReflectionError> {
        let tokens = self.included_tokens()?;
        let reflected = self.included_reflected()?;
        if tokens.is_zero() || reflected.is_zero() {
            return Rate::new(self.reflected_supply, self.token_supply);
        }
        Rate::new(reflected, tokens)
    }
}

/// Reflected units per token, kept as an exact ratio of two integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rate {
    reflected: U256,
    tokens: U256,
}

impl Rate {
    pub fn new(reflected: U256, tokens: U256) -> Result<Self, ReflectionError> {
        if tokens.is_zero() || reflected.is_zero() {
            return Err(ReflectionError::DivisionByZero);
        }
        Ok(Self { reflected, tokens })
    }

    pub fn reflected(&self) -> U256 {
        self.reflected
    }

    pub fn tokens(&self) -> U256 {
        self.tokens
    }

    /// `amount × reflected / tokens`, truncated.
    pub fn to_reflected(&self, amount: U256) -> Result<U256, ReflectionError> {
        mul_div(amount, self.reflected, self.tokens)
    }

    /// `amount × tokens / reflected`, truncated.
    pub fn to_tokens(&self, amount: U256) -> Result<U256, ReflectionError> {
        mul_div(amount, self.tokens, self.reflected)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.reflected, self.tokens)
    }
}

/// `a × b / c` with a 512-bit intermediate product.
fn mul_div(a: U256, b: U256, c: U256) -> Result<U256, ReflectionError> {
    if c.is_zero() {
        return Err(ReflectionError::DivisionByZero);
    }
    let quotient = a.full_mul(b) / U512::from(c);
    U256::try_from(quotient).map_err(|_| ReflectionError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supply() -> U256 {
        // 10 billion tokens at 9 decimals.
        U256::from(10_000_000_000_000_000_000u128)
    }

    #[test]
    fn genesis_scale_fills_256_bits() {
        let totals = ReflectionTotals::genesis(supply()).unwrap();
        assert_eq!(totals.reflected_supply % supply(), U256::zero());
        assert!(U256::MAX - totals.reflected_supply < supply());
    }

    #[test]
    fn genesis_rejects_zero_supply() {
        assert_eq!(
            ReflectionTotals::genesis(U256::zero()),
            Err(ReflectionError::DivisionByZero)
        );
    }

    #[test]
    fn conversions_round_trip_whole_tokens() {
        let rate = ReflectionTotals::genesis(supply()).unwrap().rate().unwrap();
        let amount = U256::from(1_234_567_890u64);
        let reflected = rate.to_reflected(amount).unwrap();
        assert_eq!(rate.to_tokens(reflected).unwrap(), amount);
    }

    #[test]
    fn conversion_truncates() {
        let rate = Rate::new(U256::from(3u64), U256::from(2u64)).unwrap();
        // 5 × 3 / 2 = 7.5 -> 7
        assert_eq!(rate.to_reflected(U256::from(5u64)).unwrap(), U256::from(7u64));
        // 7 × 2 / 3 = 4.67 -> 4
        assert_eq!(rate.to_tokens(U256::from(7u64)).unwrap(), U256::from(4u64));
    }

    #[test]
    fn rate_excludes_excluded_pool() {
        let mut totals = ReflectionTotals::genesis(U256::from(100u64)).unwrap();
        let per_token = totals.reflected_supply / U256::from(100u64);
        totals.excluded_tokens = U256::from(40u64);
        totals.excluded_reflected = per_token * U256::from(40u64);
        let rate = totals.rate().unwrap();
        assert_eq!(rate.tokens(), U256::from(60u64));
        assert_eq!(rate.reflected(), per_token * U256::from(60u64));
    }

    #[test]
    fn rate_falls_back_when_everything_is_excluded() {
        let mut totals = ReflectionTotals::genesis(U256::from(100u64)).unwrap();
        totals.excluded_tokens = totals.token_supply;
        totals.excluded_reflected = totals.reflected_supply;
        let rate = totals.rate().unwrap();
        assert_eq!(rate.tokens(), totals.token_supply);
        assert_eq!(rate.reflected(), totals.reflected_supply);
    }

    #[test]
    fn rate_fails_without_supply() {
        let totals = ReflectionTotals {
            token_supply: U256::zero(),
            reflected_supply: U256::zero(),
            excluded_tokens: U256::zero(),
            excluded_reflected: U256::zero(),
        };
        assert_eq!(totals.rate(), Err(ReflectionError::DivisionByZero));
    }

    #[test]
    fn excluded_totals_above_supply_underflow() {
        let mut totals = ReflectionTotals::genesis(U256::from(100u64)).unwrap();
        totals.excluded_tokens = U256::from(101u64);
        assert!(matches!(totals.rate(), Err(ReflectionError::Underflow(_))));
    }
}
