//! JSON summary of a token's state after a simulation.

use serde::Serialize;
use solar_nullables::NullExchange;
use solar_tax::TaxRates;
use solar_token::{ReflectionToken, TokenError};
use solar_utils::format_amount;
use std::collections::BTreeMap;

use crate::script::StepFailure;

#[derive(Debug, Serialize)]
pub struct Report {
    pub name: String,
    pub symbol: String,
    pub owner: String,
    pub total_supply: String,
    pub total_fees: String,
    /// Reflected units per token, as `reflected/tokens`.
    pub rate: String,
    pub taxes: TaxRates,
    pub pending_liquidity: String,
    pub held_base: String,
    pub provisioning_enabled: bool,
    pub balances: BTreeMap<String, String>,
    pub excluded: Vec<String>,
    pub steps: usize,
    pub rejected: Vec<StepFailure>,
    pub signals: usize,
    pub exchange_calls: usize,
}

impl Report {
    pub fn build(
        token: &ReflectionToken<NullExchange>,
        steps: usize,
        rejected: Vec<StepFailure>,
        signals: usize,
    ) -> Result<Self, TokenError> {
        let decimals = token.decimals();
        let holders = token.holders()?;
        let excluded = holders
            .iter()
            .filter(|(address, _)| token.is_excluded(address))
            .map(|(address, _)| address.to_string())
            .collect();
        let balances = holders
            .into_iter()
            .map(|(address, balance)| (address.to_string(), format_amount(balance, decimals)))
            .collect();
        Ok(Self {
            name: token.name().to_string(),
            symbol: token.symbol().to_string(),
            owner: token.owner().to_string(),
            total_supply: format_amount(token.total_supply(), decimals),
            total_fees: format_amount(token.total_fees(), decimals),
            rate: token.rate()?.to_string(),
            taxes: *token.taxes(),
            pending_liquidity: format_amount(token.pending_liquidity(), decimals),
            held_base: token.held_base().to_string(),
            provisioning_enabled: token.is_liquidity_provisioning_enabled(),
            balances,
            excluded,
            steps,
            rejected,
            signals,
            exchange_calls: token.exchange().calls().len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_token::TokenConfig;
    use solar_types::Address;

    #[test]
    fn report_lists_holders_and_formats_amounts() {
        let config = TokenConfig {
            initial_supply: 1_000,
            ..TokenConfig::default()
        };
        let mut token = ReflectionToken::new(&config, NullExchange::new()).unwrap();
        token
            .transfer(
                &config.owner,
                &Address::from_low_u64(0xa1),
                1_500_000_000u64.into(),
            )
            .unwrap();

        let report = Report::build(&token, 1, Vec::new(), 1).unwrap();
        assert_eq!(report.total_supply, "1000");
        assert_eq!(
            report.balances[&Address::from_low_u64(0xa1).to_string()],
            "1.5"
        );
        assert_eq!(report.excluded.len(), 2);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"symbol\":\"SOLAR\""));
    }
}
