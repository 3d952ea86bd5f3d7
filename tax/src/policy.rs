//! Tax rates and their application to a transfer amount.

use serde::{Deserialize, Serialize};
use solar_types::U256;

use crate::breakdown::TaxBreakdown;
use crate::error::TaxError;

/// Rates are whole percentages.
pub const TAX_RATE_DENOMINATOR: u32 = 100;

/// The six bucket rates plus the distributable total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRates {
    pub instant_reward: u32,
    pub charity: u32,
    pub community: u32,
    pub marketing: u32,
    pub liquidity: u32,
    pub burn: u32,
    /// Distributable rate: every bucket except burn.
    pub total: u32,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            instant_reward: 3,
            charity: 1,
            community: 1,
            marketing: 1,
            liquidity: 2,
            burn: 2,
            total: 8,
        }
    }
}

impl TaxRates {
    /// All rates zero: transfers pass through untaxed.
    pub fn zero() -> Self {
        Self {
            instant_reward: 0,
            charity: 0,
            community: 0,
            marketing: 0,
            liquidity: 0,
            burn: 0,
            total: 0,
        }
    }

    /// Sum of the buckets that `total` must match.
    pub fn distributable(&self) -> u64 {
        [
            self.instant_reward,
            self.charity,
            self.community,
            self.marketing,
            self.liquidity,
        ]
        .iter()
        .map(|&r| u64::from(r))
        .sum()
    }

    /// Everything taken from a transfer, burn included.
    pub fn effective(&self) -> u64 {
        u64::from(self.total) + u64::from(self.burn)
    }

    pub fn validate(&self) -> Result<(), TaxError> {
        let distributable = self.distributable();
        if u64::from(self.total) != distributable {
            return Err(TaxError::InvalidTaxConfig(format!(
                "total rate {} does not match the distributable buckets ({})",
                self.total, distributable
            )));
        }
        let buckets = [
            ("instant reward", self.instant_reward),
            ("charity", self.charity),
            ("community", self.community),
            ("marketing", self.marketing),
            ("liquidity", self.liquidity),
            ("burn", self.burn),
        ];
        if let Some((name, rate)) = buckets.iter().find(|(_, rate)| *rate > self.total) {
            return Err(TaxError::InvalidTaxConfig(format!(
                "{name} rate {rate} exceeds total rate {}",
                self.total
            )));
        }
        if self.effective() > u64::from(TAX_RATE_DENOMINATOR) {
            return Err(TaxError::InvalidTaxConfig(format!(
                "total rate {} plus burn {} exceeds {}%",
                self.total, self.burn, TAX_RATE_DENOMINATOR
            )));
        }
        Ok(())
    }
}

/// Validated tax rates, applied to every taxed transfer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPolicy {
    rates: TaxRates,
}

impl TaxPolicy {
    pub fn new(rates: TaxRates) -> Result<Self, TaxError> {
        rates.validate()?;
        Ok(Self { rates })
    }

    pub fn rates(&self) -> &TaxRates {
        &self.rates
    }

    /// Replace every rate at once. Returns the previous rates.
    ///
    /// On error the current rates stay in force.
    pub fn update(&mut self, rates: TaxRates) -> Result<TaxRates, TaxError> {
        rates.validate()?;
        Ok(std::mem::replace(&mut self.rates, rates))
    }

    /// Split `amount` into buckets.
    ///
    /// Buckets are computed in the order instant reward, charity, community,
    /// marketing, liquidity, burn, each truncated independently.
    pub fn apply(&self, amount: U256) -> Result<TaxBreakdown, TaxError> {
        let bucket = |rate: u32| -> Result<U256, TaxError> {
            amount
                .checked_mul(U256::from(rate))
                .map(|scaled| scaled / U256::from(TAX_RATE_DENOMINATOR))
                .ok_or(TaxError::Overflow)
        };
        let mut breakdown = TaxBreakdown {
            instant_reward: bucket(self.rates.instant_reward)?,
            charity: bucket(self.rates.charity)?,
            community: bucket(self.rates.community)?,
            marketing: bucket(self.rates.marketing)?,
            liquidity: bucket(self.rates.liquidity)?,
            burn: bucket(self.rates.burn)?,
            net_amount: U256::zero(),
        };
        // Validation caps the buckets at 100% of the amount.
        breakdown.net_amount = amount - breakdown.total_tax();
        Ok(breakdown)
    }
}
