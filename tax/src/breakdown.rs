//! The result of applying a tax policy to one transfer.

use serde::{Deserialize, Serialize};
use solar_types::U256;

/// Per-bucket amounts for a single transfer, in raw token units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub instant_reward: U256,
    pub charity: U256,
    pub community: U256,
    pub marketing: U256,
    pub liquidity: U256,
    pub burn: U256,
    /// What the recipient receives: the amount minus every bucket.
    pub net_amount: U256,
}

impl TaxBreakdown {
    /// A breakdown that passes `amount` through untouched.
    pub fn untaxed(amount: U256) -> Self {
        Self {
            net_amount: amount,
            ..Self::default()
        }
    }

    /// Sum of all six buckets.
    pub fn total_tax(&self) -> U256 {
        self.instant_reward
            + self.charity
            + self.community
            + self.marketing
            + self.liquidity
            + self.burn
    }

    pub fn is_zero(&self) -> bool {
        self.total_tax().is_zero()
    }

    /// The amount the breakdown was computed from.
    pub fn gross_amount(&self) -> U256 {
        self.net_amount + self.total_tax()
    }
}
