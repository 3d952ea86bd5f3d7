//! Per-account balance storage.

use serde::{Deserialize, Serialize};
use solar_types::U256;

use crate::error::ReflectionError;
use crate::rate::Rate;

/// Balance record for a single address.
///
/// Included accounts hold reflected units only and benefit from every
/// reflection. Excluded accounts hold an exact token balance; their
/// `reflected` field mirrors it so the account can be re-included in O(1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Account {
    Included { reflected: U256 },
    Excluded { tokens: U256, reflected: U256 },
}

impl Account {
    /// Observable token balance under `rate`.
    pub fn balance(&self, rate: &Rate) -> Result<U256, ReflectionError> {
        match self {
            Account::Included { reflected } => rate.to_tokens(*reflected),
            Account::Excluded { tokens, .. } => Ok(*tokens),
        }
    }

    pub fn reflected(&self) -> U256 {
        match self {
            Account::Included { reflected } | Account::Excluded { reflected, .. } => *reflected,
        }
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, Account::Excluded { .. })
    }
}

impl Default for Account {
    fn default() -> Self {
        Account::Included {
            reflected: U256::zero(),
        }
    }
}
