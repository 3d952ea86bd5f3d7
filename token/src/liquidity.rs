//! Auto-liquidity bookkeeping and the swap guard.
//!
//! The liquidity tax bucket is credited to the token contract and tracked
//! here as `pending`. Once provisioning is enabled and `pending` exceeds the
//! threshold, the engine swaps half of it for the base asset and adds the
//! other half plus the proceeds to the pool. While that round runs the swap
//! guard is held: transfers made during it are untaxed and cannot start a
//! nested round.

use serde::{Deserialize, Serialize};
use solar_types::U256;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Provisioning state carried across transfers.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LiquidityProvisioner {
    enabled: bool,
    threshold: U256,
    pending: U256,
    /// Base asset from a swap whose add-liquidity step failed.
    base_held: U256,
    #[serde(skip)]
    swap_flag: Arc<AtomicBool>,
}

// A clone never shares the swap guard with its source.
impl Clone for LiquidityProvisioner {
    fn clone(&self) -> Self {
        Self {
            enabled: self.enabled,
            threshold: self.threshold,
            pending: self.pending,
            base_held: self.base_held,
            swap_flag: Arc::default(),
        }
    }
}

/// Token amounts for one provisioning round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProvisionPlan {
    /// Sold for the base asset.
    pub swap_tokens: U256,
    /// Paired with the base asset in the pool.
    pub liquidity_tokens: U256,
}

impl LiquidityProvisioner {
    pub fn new(enabled: bool, threshold: U256) -> Self {
        Self {
            enabled,
            threshold,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.enabled, enabled)
    }

    pub fn threshold(&self) -> U256 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: U256) -> U256 {
        std::mem::replace(&mut self.threshold, threshold)
    }

    pub fn pending(&self) -> U256 {
        self.pending
    }

    pub fn base_held(&self) -> U256 {
        self.base_held
    }

    pub fn is_swapping(&self) -> bool {
        self.swap_flag.load(Ordering::Acquire)
    }

    /// The pending total after adding `amount`, without writing it.
    pub fn pending_after(&self, amount: U256) -> Option<U256> {
        self.pending.checked_add(amount)
    }

    pub fn set_pending(&mut self, pending: U256) {
        self.pending = pending;
    }

    /// Whether a round should start now.
    pub fn is_due(&self) -> bool {
        self.enabled && self.pending > self.threshold && !self.is_swapping()
    }

    /// Split what can be provisioned right now: at most `pending`, and never
    /// more than the contract actually holds.
    pub fn plan(&self, contract_balance: U256) -> Option<ProvisionPlan> {
        let amount = self.pending.min(contract_balance);
        if amount.is_zero() {
            return None;
        }
        let swap_tokens = amount / 2;
        Some(ProvisionPlan {
            swap_tokens,
            liquidity_tokens: amount - swap_tokens,
        })
    }

    /// Record a completed swap: the sold tokens leave `pending` and the
    /// proceeds are held until they are added to the pool.
    pub fn record_swap(&mut self, tokens_sold: U256, base_received: U256) {
        self.pending = self.pending.saturating_sub(tokens_sold);
        self.base_held = self.base_held.saturating_add(base_received);
    }

    pub fn record_liquidity(&mut self, tokens_added: U256, base_added: U256) {
        self.pending = self.pending.saturating_sub(tokens_added);
        self.base_held = self.base_held.saturating_sub(base_added);
    }

    /// Take the swap guard. Returns `None` if a round is already running.
    pub fn try_lock(&self) -> Option<SwapLock> {
        self.swap_flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SwapLock {
                flag: Arc::clone(&self.swap_flag),
            })
    }
}

/// Holds the swap guard; released when dropped, on every exit path.
#[must_use = "the swap guard is released as soon as the lock is dropped"]
pub struct SwapLock {
    flag: Arc<AtomicBool>,
}

impl Drop for SwapLock {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_due_until_enabled_and_above_threshold() {
        let mut provisioner = LiquidityProvisioner::new(false, U256::from(100u64));
        provisioner.set_pending(U256::from(500u64));
        assert!(!provisioner.is_due());

        provisioner.set_enabled(true);
        assert!(provisioner.is_due());

        provisioner.set_pending(U256::from(100u64));
        assert!(!provisioner.is_due());
    }

    #[test]
    fn lock_is_exclusive_and_released_on_drop() {
        let provisioner = LiquidityProvisioner::new(true, U256::zero());
        let lock = provisioner.try_lock().unwrap();
        assert!(provisioner.is_swapping());
        assert!(provisioner.try_lock().is_none());
        drop(lock);
        assert!(!provisioner.is_swapping());
        assert!(provisioner.try_lock().is_some());
    }

    #[test]
    fn not_due_while_swapping() {
        let mut provisioner = LiquidityProvisioner::new(true, U256::zero());
        provisioner.set_pending(U256::from(10u64));
        let _lock = provisioner.try_lock().unwrap();
        assert!(!provisioner.is_due());
    }

    #[test]
    fn plan_splits_in_half_and_caps_at_balance() {
        let mut provisioner = LiquidityProvisioner::new(true, U256::zero());
        provisioner.set_pending(U256::from(101u64));
        let plan = provisioner.plan(U256::from(1_000u64)).unwrap();
        assert_eq!(plan.swap_tokens, U256::from(50u64));
        assert_eq!(plan.liquidity_tokens, U256::from(51u64));

        let capped = provisioner.plan(U256::from(40u64)).unwrap();
        assert_eq!(capped.swap_tokens + capped.liquidity_tokens, U256::from(40u64));

        assert!(provisioner.plan(U256::zero()).is_none());
    }

    #[test]
    fn swap_then_liquidity_clears_pending() {
        let mut provisioner = LiquidityProvisioner::new(true, U256::zero());
        provisioner.set_pending(U256::from(100u64));
        provisioner.record_swap(U256::from(50u64), U256::from(7u64));
        assert_eq!(provisioner.pending(), U256::from(50u64));
        assert_eq!(provisioner.base_held(), U256::from(7u64));

        provisioner.record_liquidity(U256::from(50u64), U256::from(7u64));
        assert!(provisioner.pending().is_zero());
        assert!(provisioner.base_held().is_zero());
    }

    #[test]
    fn swap_guard_is_not_persisted() {
        let provisioner = LiquidityProvisioner::new(true, U256::from(3u64));
        let _lock = provisioner.try_lock().unwrap();
        let bytes = bincode::serialize(&provisioner).unwrap();
        let restored: LiquidityProvisioner = bincode::deserialize(&bytes).unwrap();
        assert!(!restored.is_swapping());
        assert_eq!(restored.threshold(), U256::from(3u64));
    }
}
