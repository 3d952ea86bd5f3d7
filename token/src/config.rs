//! Genesis configuration with TOML file support.

use serde::{Deserialize, Serialize};
use solar_tax::TaxRates;
use solar_types::{to_raw, Address, Amount, TOKEN_DECIMALS};
use std::path::Path;

use crate::error::TokenError;

/// Everything fixed at token construction.
///
/// Can be loaded from a TOML file via [`TokenConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Supply and threshold are given in
/// whole tokens and scaled by `decimals`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_symbol")]
    pub symbol: String,

    #[serde(default = "default_decimals")]
    pub decimals: u8,

    /// Whole tokens minted to the owner at genesis.
    #[serde(default = "default_initial_supply")]
    pub initial_supply: u64,

    /// Deployer: receives the supply and controls owner-only operations.
    #[serde(default = "default_owner")]
    pub owner: Address,

    /// The token's own address, where the liquidity bucket accumulates.
    #[serde(default = "default_contract")]
    pub contract: Address,

    /// Trading pair that receives auto-provisioned liquidity.
    #[serde(default = "default_pair")]
    pub pair: Address,

    #[serde(default = "default_charity_wallet")]
    pub charity_wallet: Address,

    #[serde(default = "default_community_wallet")]
    pub community_wallet: Address,

    #[serde(default = "default_marketing_wallet")]
    pub marketing_wallet: Address,

    /// Receives the pool shares minted by auto-liquidity.
    #[serde(default = "default_lp_recipient")]
    pub lp_recipient: Address,

    /// Accounts excluded from rewards right after genesis.
    #[serde(default = "default_excluded")]
    pub excluded: Vec<Address>,

    /// Extra tax-exempt accounts; owner and contract are always exempt.
    #[serde(default)]
    pub tax_exempt: Vec<Address>,

    #[serde(default)]
    pub taxes: TaxRates,

    #[serde(default)]
    pub liquidity: LiquidityConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whole tokens that must accumulate before a round runs.
    #[serde(default = "default_threshold")]
    pub threshold: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_name() -> String {
    "Solarmoon".to_string()
}

fn default_symbol() -> String {
    "SOLAR".to_string()
}

fn default_decimals() -> u8 {
    TOKEN_DECIMALS
}

fn default_initial_supply() -> u64 {
    10_000_000_000
}

fn default_owner() -> Address {
    Address::from_low_u64(0x01)
}

fn default_contract() -> Address {
    Address::from_low_u64(0x02)
}

fn default_pair() -> Address {
    Address::from_low_u64(0x03)
}

fn default_charity_wallet() -> Address {
    Address::from_low_u64(0x04)
}

fn default_community_wallet() -> Address {
    Address::from_low_u64(0x05)
}

fn default_marketing_wallet() -> Address {
    Address::from_low_u64(0x06)
}

fn default_lp_recipient() -> Address {
    Address::from_low_u64(0x07)
}

fn default_excluded() -> Vec<Address> {
    vec![default_contract(), default_pair()]
}

fn default_true() -> bool {
    true
}

fn default_threshold() -> u64 {
    500_000
}

// ── Impl ───────────────────────────────────────────────────────────────

impl TokenConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, TokenError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TokenError::InvalidConfig(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, TokenError> {
        toml::from_str(s).map_err(|e| TokenError::InvalidConfig(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, TokenError> {
        toml::to_string_pretty(self).map_err(|e| TokenError::InvalidConfig(e.to_string()))
    }

    /// Initial supply in raw units.
    pub fn raw_supply(&self) -> Result<Amount, TokenError> {
        to_raw(self.initial_supply, self.decimals)
            .ok_or_else(|| TokenError::InvalidConfig("initial supply overflows".into()))
    }

    /// Provisioning threshold in raw units.
    pub fn raw_threshold(&self) -> Result<Amount, TokenError> {
        to_raw(self.liquidity.threshold, self.decimals)
            .ok_or_else(|| TokenError::InvalidConfig("liquidity threshold overflows".into()))
    }

    pub fn validate(&self) -> Result<(), TokenError> {
        if self.initial_supply == 0 {
            return Err(TokenError::InvalidConfig("initial supply must be non-zero".into()));
        }
        self.raw_supply()?;
        self.raw_threshold()?;
        let roles = [
            ("owner", &self.owner),
            ("contract", &self.contract),
            ("pair", &self.pair),
            ("charity wallet", &self.charity_wallet),
            ("community wallet", &self.community_wallet),
            ("marketing wallet", &self.marketing_wallet),
            ("LP recipient", &self.lp_recipient),
        ];
        if let Some((role, _)) = roles.iter().find(|(_, address)| address.is_zero()) {
            return Err(TokenError::InvalidConfig(format!("{role} is the zero address")));
        }
        if let Some(address) = self
            .excluded
            .iter()
            .chain(&self.tax_exempt)
            .find(|address| address.is_zero())
        {
            return Err(TokenError::InvalidConfig(format!(
                "{address} cannot be excluded or exempted"
            )));
        }
        self.taxes.validate()?;
        Ok(())
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            symbol: default_symbol(),
            decimals: default_decimals(),
            initial_supply: default_initial_supply(),
            owner: default_owner(),
            contract: default_contract(),
            pair: default_pair(),
            charity_wallet: default_charity_wallet(),
            community_wallet: default_community_wallet(),
            marketing_wallet: default_marketing_wallet(),
            lp_recipient: default_lp_recipient(),
            excluded: default_excluded(),
            tax_exempt: Vec::new(),
            taxes: TaxRates::default(),
            liquidity: LiquidityConfig::default(),
        }
    }
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            threshold: default_threshold(),
        }
    }
}
