//! The external trading-pool boundary.
//!
//! The ledger never prices anything itself. When auto-liquidity fires it
//! hands token amounts to an [`Exchange`] and records whatever comes back.
//! Implementations receive no handle to the ledger, so they cannot observe
//! or mutate balances while a transfer is being settled.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::Amount;
use crate::error::ExchangeError;

/// Result of a successful add-liquidity call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityReceipt {
    /// Tokens actually deposited into the pool.
    pub tokens_added: Amount,
    /// Base asset actually deposited into the pool.
    pub base_added: Amount,
    /// Pool-share tokens minted to the LP recipient.
    pub pool_shares: Amount,
}

/// Automated-market-maker collaborator used for auto-liquidity.
pub trait Exchange {
    /// Sell `token_amount` tokens for the paired base asset.
    ///
    /// Returns the amount of base asset received.
    fn swap_tokens_for_base(&mut self, token_amount: Amount) -> Result<Amount, ExchangeError>;

    /// Deposit both sides into the pool, minting pool shares to `lp_recipient`.
    fn add_liquidity(
        &mut self,
        token_amount: Amount,
        base_amount: Amount,
        lp_recipient: &Address,
    ) -> Result<LiquidityReceipt, ExchangeError>;
}
