//! Nullable exchange: a fixed-price pool that records every call.

use serde::Serialize;
use solar_types::{Address, Amount, Exchange, ExchangeError, LiquidityReceipt, U256};

/// A call the exchange received, successful or not.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ExchangeCall {
    Swap {
        token_amount: Amount,
        base_received: Option<Amount>,
    },
    AddLiquidity {
        token_amount: Amount,
        base_amount: Amount,
        lp_recipient: Address,
        accepted: bool,
    },
}

/// A deterministic exchange for testing.
///
/// Swaps pay `base_per_token_num / base_per_token_den` base units per token.
/// Liquidity is always accepted in full and mints one pool share per token
/// added. Either step can be told to fail.
#[derive(Clone, Debug)]
pub struct NullExchange {
    base_per_token_num: U256,
    base_per_token_den: U256,
    fail_swaps: bool,
    fail_add_liquidity: bool,
    token_reserve: Amount,
    base_reserve: Amount,
    shares_minted: Amount,
    calls: Vec<ExchangeCall>,
}

impl NullExchange {
    /// One base unit per token.
    pub fn new() -> Self {
        Self::with_price(1, 1)
    }

    /// `num / den` base units per token. A zero denominator is treated as one.
    pub fn with_price(num: u64, den: u64) -> Self {
        Self {
            base_per_token_num: U256::from(num),
            base_per_token_den: U256::from(den.max(1)),
            fail_swaps: false,
            fail_add_liquidity: false,
            token_reserve: U256::zero(),
            base_reserve: U256::zero(),
            shares_minted: U256::zero(),
            calls: Vec::new(),
        }
    }

    /// Make every following swap fail (or succeed again).
    pub fn fail_swaps(&mut self, fail: bool) {
        self.fail_swaps = fail;
    }

    /// Make every following add-liquidity call fail (or succeed again).
    pub fn fail_add_liquidity(&mut self, fail: bool) {
        self.fail_add_liquidity = fail;
    }

    /// Get all recorded calls (for assertions).
    pub fn calls(&self) -> &[ExchangeCall] {
        &self.calls
    }

    pub fn swap_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, ExchangeCall::Swap { .. }))
            .count()
    }

    /// Tokens deposited into the pool so far.
    pub fn token_reserve(&self) -> Amount {
        self.token_reserve
    }

    /// Base asset deposited into the pool so far.
    pub fn base_reserve(&self) -> Amount {
        self.base_reserve
    }

    pub fn shares_minted(&self) -> Amount {
        self.shares_minted
    }

    /// Clear recorded calls and reserves; failure toggles are kept.
    pub fn reset(&mut self) {
        self.calls.clear();
        self.token_reserve = U256::zero();
        self.base_reserve = U256::zero();
        self.shares_minted = U256::zero();
    }
}

impl Default for NullExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange for NullExchange {
    fn swap_tokens_for_base(&mut self, token_amount: Amount) -> Result<Amount, ExchangeError> {
        if self.fail_swaps {
            self.calls.push(ExchangeCall::Swap {
                token_amount,
                base_received: None,
            });
            return Err(ExchangeError::SwapRejected(
                "null exchange configured to fail swaps".into(),
            ));
        }
        let base = token_amount
            .checked_mul(self.base_per_token_num)
            .map(|scaled| scaled / self.base_per_token_den)
            .ok_or_else(|| ExchangeError::SwapRejected("swap amount overflows".into()))?;
        self.calls.push(ExchangeCall::Swap {
            token_amount,
            base_received: Some(base),
        });
        Ok(base)
    }

    fn add_liquidity(
        &mut self,
        token_amount: Amount,
        base_amount: Amount,
        lp_recipient: &Address,
    ) -> Result<LiquidityReceipt, ExchangeError> {
        self.calls.push(ExchangeCall::AddLiquidity {
            token_amount,
            base_amount,
            lp_recipient: *lp_recipient,
            accepted: !self.fail_add_liquidity,
        });
        if self.fail_add_liquidity {
            return Err(ExchangeError::AddLiquidityRejected(
                "null exchange configured to fail add-liquidity".into(),
            ));
        }
        self.token_reserve = self.token_reserve.saturating_add(token_amount);
        self.base_reserve = self.base_reserve.saturating_add(base_amount);
        self.shares_minted = self.shares_minted.saturating_add(token_amount);
        Ok(LiquidityReceipt {
            tokens_added: token_amount,
            base_added: base_amount,
            pool_shares: token_amount,
        })
    }
}
