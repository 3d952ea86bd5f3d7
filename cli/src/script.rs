//! Simulation scripts: a list of token operations replayed in order.
//!
//! ```toml
//! [[step]]
//! op = "transfer"
//! from = "0x0000000000000000000000000000000000000001"
//! to = "0x00000000000000000000000000000000000000a1"
//! amount = 1000
//! ```
//!
//! Amounts and thresholds are whole tokens, scaled by the token's decimals.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use solar_nullables::NullExchange;
use solar_tax::TaxRates;
use solar_token::{ReflectionToken, TokenError};
use solar_types::{to_raw, Address, Amount};
use tracing::{debug, warn};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Transfer {
        from: Address,
        to: Address,
        amount: u64,
    },
    TransferFrom {
        spender: Address,
        from: Address,
        to: Address,
        amount: u64,
    },
    Approve {
        owner: Address,
        spender: Address,
        amount: u64,
    },
    IncreaseAllowance {
        owner: Address,
        spender: Address,
        amount: u64,
    },
    DecreaseAllowance {
        owner: Address,
        spender: Address,
        amount: u64,
    },
    SetExclusion {
        caller: Address,
        address: Address,
        excluded: bool,
        #[serde(default)]
        is_liquidity_pair: bool,
    },
    UpdateTaxes {
        caller: Address,
        taxes: TaxRates,
    },
    SetLiquidityProvisioning {
        caller: Address,
        enabled: bool,
    },
    SetProvisioningThreshold {
        caller: Address,
        threshold: u64,
    },
    SetTaxExemption {
        caller: Address,
        address: Address,
        exempt: bool,
    },
    TransferOwnership {
        caller: Address,
        new_owner: Address,
    },
    /// Control the simulated exchange.
    ExchangeFailures {
        #[serde(default)]
        swaps: bool,
        #[serde(default)]
        add_liquidity: bool,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Transfer { .. } => "transfer",
            Step::TransferFrom { .. } => "transfer_from",
            Step::Approve { .. } => "approve",
            Step::IncreaseAllowance { .. } => "increase_allowance",
            Step::DecreaseAllowance { .. } => "decrease_allowance",
            Step::SetExclusion { .. } => "set_exclusion",
            Step::UpdateTaxes { .. } => "update_taxes",
            Step::SetLiquidityProvisioning { .. } => "set_liquidity_provisioning",
            Step::SetProvisioningThreshold { .. } => "set_provisioning_threshold",
            Step::SetTaxExemption { .. } => "set_tax_exemption",
            Step::TransferOwnership { .. } => "transfer_ownership",
            Step::ExchangeFailures { .. } => "exchange_failures",
        }
    }
}

/// A step the token rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub index: usize,
    pub op: &'static str,
    pub error: String,
}

impl Script {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("failed to parse simulation script")
    }

    pub fn from_toml_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Replay every step. Rejected steps are collected, not fatal, unless
    /// `stop_on_error` is set.
    pub fn run(
        &self,
        token: &mut ReflectionToken<NullExchange>,
        stop_on_error: bool,
    ) -> Vec<StepFailure> {
        let mut failures = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            match apply(token, step) {
                Ok(()) => debug!(index, op = step.name(), "step applied"),
                Err(err) => {
                    warn!(index, op = step.name(), error = %err, "step rejected");
                    failures.push(StepFailure {
                        index,
                        op: step.name(),
                        error: err.to_string(),
                    });
                    if stop_on_error {
                        break;
                    }
                }
            }
        }
        failures
    }
}

fn raw(token: &ReflectionToken<NullExchange>, whole: u64) -> Result<Amount, TokenError> {
    to_raw(whole, token.decimals()).ok_or(TokenError::Overflow)
}

fn apply(token: &mut ReflectionToken<NullExchange>, step: &Step) -> Result<(), TokenError> {
    match step {
        Step::Transfer { from, to, amount } => {
            let amount = raw(token, *amount)?;
            token.transfer(from, to, amount).map(drop)
        }
        Step::TransferFrom {
            spender,
            from,
            to,
            amount,
        } => {
            let amount = raw(token, *amount)?;
            token.transfer_from(spender, from, to, amount).map(drop)
        }
        Step::Approve {
            owner,
            spender,
            amount,
        } => {
            let amount = raw(token, *amount)?;
            token.approve(owner, spender, amount).map(drop)
        }
        Step::IncreaseAllowance {
            owner,
            spender,
            amount,
        } => {
            let amount = raw(token, *amount)?;
            token.increase_allowance(owner, spender, amount).map(drop)
        }
        Step::DecreaseAllowance {
            owner,
            spender,
            amount,
        } => {
            let amount = raw(token, *amount)?;
            token.decrease_allowance(owner, spender, amount).map(drop)
        }
        Step::SetExclusion {
            caller,
            address,
            excluded,
            is_liquidity_pair,
        } => token.set_exclusion(caller, address, *excluded, *is_liquidity_pair),
        Step::UpdateTaxes { caller, taxes } => token.update_taxes(caller, *taxes),
        Step::SetLiquidityProvisioning { caller, enabled } => {
            token.set_liquidity_provisioning(caller, *enabled)
        }
        Step::SetProvisioningThreshold { caller, threshold } => {
            let threshold = raw(token, *threshold)?;
            token.set_provisioning_threshold(caller, threshold)
        }
        Step::SetTaxExemption {
            caller,
            address,
            exempt,
        } => token.set_tax_exemption(caller, address, *exempt),
        Step::TransferOwnership { caller, new_owner } => {
            token.transfer_ownership(caller, new_owner)
        }
        Step::ExchangeFailures {
            swaps,
            add_liquidity,
        } => {
            let exchange = token.exchange_mut();
            exchange.fail_swaps(*swaps);
            exchange.fail_add_liquidity(*add_liquidity);
            Ok(())
        }
    }
}
