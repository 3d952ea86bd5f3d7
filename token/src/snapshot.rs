//! Point-in-time capture of a token's mutable state.

use serde::{Deserialize, Serialize};
use solar_reflection::AccountLedger;
use solar_tax::TaxRates;
use solar_types::{Address, Amount};

use crate::allowance::AllowanceStore;
use crate::error::TokenError;
use crate::liquidity::LiquidityProvisioner;

/// Everything a token accumulates after genesis.
///
/// Metadata and role addresses are not included; they come from the
/// [`TokenConfig`](crate::TokenConfig) passed to
/// [`ReflectionToken::restore`](crate::ReflectionToken::restore).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub owner: Address,
    pub ledger: AccountLedger,
    pub taxes: TaxRates,
    pub total_fees: Amount,
    pub tax_exempt: Vec<Address>,
    pub pairs: Vec<Address>,
    pub allowances: AllowanceStore,
    pub liquidity: LiquidityProvisioner,
}

impl TokenSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, TokenError> {
        bincode::serialize(self).map_err(|e| TokenError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        bincode::deserialize(bytes).map_err(|e| TokenError::Snapshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_types::U256;

    fn snapshot() -> TokenSnapshot {
        let owner = Address::from_low_u64(1);
        TokenSnapshot {
            owner,
            ledger: AccountLedger::genesis(owner, U256::from(1_000u64)).unwrap(),
            taxes: TaxRates::default(),
            total_fees: U256::from(12u64),
            tax_exempt: vec![owner],
            pairs: vec![Address::from_low_u64(3)],
            allowances: AllowanceStore::new(),
            liquidity: LiquidityProvisioner::new(true, U256::from(50u64)),
        }
    }

    #[test]
    fn bytes_round_trip() {
        let original = snapshot();
        let decoded = TokenSnapshot::from_bytes(&original.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.owner, original.owner);
        assert_eq!(decoded.total_fees, original.total_fees);
        assert_eq!(decoded.ledger.totals(), original.ledger.totals());
        assert_eq!(decoded.liquidity.threshold(), U256::from(50u64));
    }

    #[test]
    fn truncated_bytes_rejected() {
        let bytes = snapshot().to_bytes().unwrap();
        let err = TokenSnapshot::from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, TokenError::Snapshot(_)));
    }
}
