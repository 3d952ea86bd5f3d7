//! Owner/spender approvals, independent of reflection.

use serde::{Deserialize, Serialize};
use solar_types::{Address, U256};
use std::collections::HashMap;

use crate::error::TokenError;

/// Allowance value that is never decremented by spending.
pub const UNLIMITED_ALLOWANCE: U256 = U256::MAX;

/// A validated allowance deduction, applied once the transfer it pays for
/// has settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingSpend {
    pub owner: Address,
    pub spender: Address,
    /// `None` when the allowance is unlimited and stays untouched.
    pub remaining: Option<U256>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceStore {
    entries: HashMap<Address, HashMap<Address, U256>>,
}

impl AllowanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.entries
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or_default()
    }

    fn set(&mut self, owner: &Address, spender: &Address, amount: U256) {
        if amount.is_zero() {
            if let Some(spenders) = self.entries.get_mut(owner) {
                spenders.remove(spender);
                if spenders.is_empty() {
                    self.entries.remove(owner);
                }
            }
        } else {
            self.entries
                .entry(*owner)
                .or_default()
                .insert(*spender, amount);
        }
    }

    fn check_parties(owner: &Address, spender: &Address) -> Result<(), TokenError> {
        if owner.is_zero() {
            return Err(TokenError::InvalidApproval("approve from the zero address".into()));
        }
        if spender.is_zero() {
            return Err(TokenError::InvalidApproval("approve to the zero address".into()));
        }
        Ok(())
    }

    /// Set the allowance outright.
    ///
    /// Moving from one non-zero value to another is rejected: the allowance
    /// has to pass through zero, or be changed with increase/decrease.
    pub fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        Self::check_parties(owner, spender)?;
        let current = self.allowance(owner, spender);
        if !current.is_zero() && !amount.is_zero() {
            return Err(TokenError::UnsafeApprovalSequence { current });
        }
        self.set(owner, spender, amount);
        Ok(())
    }

    /// Returns the new allowance.
    pub fn increase(
        &mut self,
        owner: &Address,
        spender: &Address,
        added: U256,
    ) -> Result<U256, TokenError> {
        Self::check_parties(owner, spender)?;
        let updated = self
            .allowance(owner, spender)
            .checked_add(added)
            .ok_or(TokenError::Overflow)?;
        self.set(owner, spender, updated);
        Ok(updated)
    }

    /// Returns the new allowance.
    pub fn decrease(
        &mut self,
        owner: &Address,
        spender: &Address,
        subtracted: U256,
    ) -> Result<U256, TokenError> {
        Self::check_parties(owner, spender)?;
        let current = self.allowance(owner, spender);
        let updated = current
            .checked_sub(subtracted)
            .ok_or(TokenError::AllowanceUnderflow {
                current,
                requested: subtracted,
            })?;
        self.set(owner, spender, updated);
        Ok(updated)
    }

    /// Check that `spender` may move `amount` of `owner`'s tokens and work out
    /// what the allowance becomes. Nothing is written yet.
    pub fn prepare_spend(
        &self,
        owner: &Address,
        spender: &Address,
        amount: U256,
    ) -> Result<PendingSpend, TokenError> {
        let current = self.allowance(owner, spender);
        if current < amount {
            return Err(TokenError::InsufficientAllowance {
                needed: amount,
                available: current,
            });
        }
        let remaining = if current == UNLIMITED_ALLOWANCE {
            None
        } else {
            Some(current - amount)
        };
        Ok(PendingSpend {
            owner: *owner,
            spender: *spender,
            remaining,
        })
    }

    pub fn commit_spend(&mut self, spend: PendingSpend) {
        if let Some(remaining) = spend.remaining {
            self.set(&spend.owner, &spend.spender, remaining);
        }
    }
}
