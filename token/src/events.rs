//! Signals emitted by the token engine for subscribers.

use serde::Serialize;
use solar_tax::{TaxBreakdown, TaxRates};
use solar_types::{Address, U256};

/// Token-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TokenEvent {
    /// A transfer settled. `amount` is what the recipient received.
    Transfer {
        from: Address,
        to: Address,
        amount: U256,
    },
    /// A taxed transfer produced at least one non-zero bucket.
    TaxApplied {
        from: Address,
        to: Address,
        breakdown: TaxBreakdown,
    },
    /// An allowance was set, increased, decreased or spent.
    Approval {
        owner: Address,
        spender: Address,
        amount: U256,
    },
    /// An account's reward exclusion or liquidity-pair flag changed.
    ExclusionChanged {
        address: Address,
        excluded: bool,
        is_liquidity_pair: bool,
    },
    /// The owner replaced the tax rates.
    TaxesUpdated {
        previous: TaxRates,
        current: TaxRates,
    },
    /// An address was added to or removed from the tax whitelist.
    TaxExemptionChanged { address: Address, exempt: bool },
    /// Auto-liquidity was switched on or off.
    LiquidityProvisioningChanged { enabled: bool },
    /// Accumulated liquidity tokens were swapped and added to the pool.
    LiquidityProvisioned {
        tokens_swapped: U256,
        base_received: U256,
        tokens_added: U256,
        base_added: U256,
        pool_shares: U256,
    },
    /// A provisioning round failed; the triggering transfer still stands.
    LiquidityProvisionFailed { reason: String, pending: U256 },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

/// Synchronous fan-out event bus for token events.
///
/// Listeners run inline after the emitting operation has committed; keep
/// handlers fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&TokenEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&TokenEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &TokenEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn test_address(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));

        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&TokenEvent::LiquidityProvisioningChanged { enabled: true });

        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::default();
        bus.emit(&TokenEvent::Transfer {
            from: test_address(1),
            to: test_address(2),
            amount: U256::one(),
        });
        assert!(bus.listeners.is_empty());
    }

    #[test]
    fn listener_receives_correct_event_variant() {
        let transfers = Arc::new(AtomicUsize::new(0));
        let approvals = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let t = Arc::clone(&transfers);
        let a = Arc::clone(&approvals);
        bus.subscribe(Box::new(move |event| match event {
            TokenEvent::Transfer { .. } => {
                t.fetch_add(1, Ordering::SeqCst);
            }
            TokenEvent::Approval { .. } => {
                a.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }));

        bus.emit(&TokenEvent::Transfer {
            from: test_address(1),
            to: test_address(2),
            amount: U256::one(),
        });
        bus.emit(&TokenEvent::Approval {
            owner: test_address(1),
            spender: test_address(3),
            amount: U256::one(),
        });
        bus.emit(&TokenEvent::LiquidityProvisioningChanged { enabled: false });

        assert_eq!(transfers.load(Ordering::SeqCst), 1);
        assert_eq!(approvals.load(Ordering::SeqCst), 1);
    }
}
