//! The reflection token: taxed transfers, exclusions, allowances and
//! auto-liquidity over a single [`AccountLedger`].
//!
//! Every mutating operation takes `&mut self` and runs to completion. Writes
//! are staged in a [`LedgerBatch`](solar_reflection::LedgerBatch) and only
//! committed once every check has passed, so a failed operation leaves no
//! trace. Signals are emitted after the commit.

use solar_reflection::{AccountLedger, Rate};
use solar_tax::{TaxBreakdown, TaxPolicy, TaxRates};
use solar_types::{Address, Amount, Exchange, U256};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::allowance::AllowanceStore;
use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::events::{EventBus, TokenEvent};
use crate::liquidity::LiquidityProvisioner;
use crate::snapshot::TokenSnapshot;

/// Destinations of the fixed-wallet tax buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeWallets {
    pub charity: Address,
    pub community: Address,
    pub marketing: Address,
}

/// Outcome of one successful provisioning round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ProvisionReport {
    tokens_swapped: U256,
    base_received: U256,
    tokens_added: U256,
    base_added: U256,
    pool_shares: U256,
}

pub struct ReflectionToken<X: Exchange> {
    name: String,
    symbol: String,
    decimals: u8,
    owner: Address,
    contract: Address,
    pair: Address,
    wallets: FeeWallets,
    lp_recipient: Address,
    ledger: AccountLedger,
    taxes: TaxPolicy,
    total_fees: U256,
    tax_exempt: HashSet<Address>,
    pairs: HashSet<Address>,
    allowances: AllowanceStore,
    liquidity: LiquidityProvisioner,
    exchange: X,
    events: EventBus,
}

impl<X: Exchange> ReflectionToken<X> {
    /// Mint the whole supply to the configured owner and apply the initial
    /// exclusion set.
    pub fn new(config: &TokenConfig, exchange: X) -> Result<Self, TokenError> {
        config.validate()?;
        let supply = config.raw_supply()?;
        let mut ledger = AccountLedger::genesis(config.owner, supply)?;
        for address in &config.excluded {
            ledger.set_exclusion(address, true)?;
        }

        let mut tax_exempt: HashSet<Address> = config.tax_exempt.iter().copied().collect();
        tax_exempt.insert(config.owner);
        tax_exempt.insert(config.contract);

        let token = Self {
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            decimals: config.decimals,
            owner: config.owner,
            contract: config.contract,
            pair: config.pair,
            wallets: FeeWallets {
                charity: config.charity_wallet,
                community: config.community_wallet,
                marketing: config.marketing_wallet,
            },
            lp_recipient: config.lp_recipient,
            ledger,
            taxes: TaxPolicy::new(config.taxes)?,
            total_fees: U256::zero(),
            tax_exempt,
            pairs: HashSet::from([config.pair]),
            allowances: AllowanceStore::new(),
            liquidity: LiquidityProvisioner::new(
                config.liquidity.enabled,
                config.raw_threshold()?,
            ),
            exchange,
            events: EventBus::new(),
        };
        info!(
            name = %token.name,
            symbol = %token.symbol,
            supply = %supply,
            owner = %token.owner,
            excluded = config.excluded.len(),
            "token created"
        );
        Ok(token)
    }

    /// Rebuild a token from a snapshot. Metadata and role addresses come from
    /// `config`; balances, taxes, approvals and provisioning state from the
    /// snapshot.
    pub fn restore(
        config: &TokenConfig,
        snapshot: TokenSnapshot,
        exchange: X,
    ) -> Result<Self, TokenError> {
        config.validate()?;
        let taxes = TaxPolicy::new(snapshot.taxes)?;
        // The rate must be derivable for the restored totals.
        snapshot.ledger.rate()?;
        info!(
            owner = %snapshot.owner,
            holders = snapshot.ledger.holder_count(),
            "token restored from snapshot"
        );
        Ok(Self {
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            decimals: config.decimals,
            owner: snapshot.owner,
            contract: config.contract,
            pair: config.pair,
            wallets: FeeWallets {
                charity: config.charity_wallet,
                community: config.community_wallet,
                marketing: config.marketing_wallet,
            },
            lp_recipient: config.lp_recipient,
            ledger: snapshot.ledger,
            taxes,
            total_fees: snapshot.total_fees,
            tax_exempt: snapshot.tax_exempt.into_iter().collect(),
            pairs: snapshot.pairs.into_iter().collect(),
            allowances: snapshot.allowances,
            liquidity: snapshot.liquidity,
            exchange,
            events: EventBus::new(),
        })
    }

    /// Capture all mutable state.
    pub fn snapshot(&self) -> TokenSnapshot {
        let mut tax_exempt: Vec<Address> = self.tax_exempt.iter().copied().collect();
        tax_exempt.sort();
        let mut pairs: Vec<Address> = self.pairs.iter().copied().collect();
        pairs.sort();
        TokenSnapshot {
            owner: self.owner,
            ledger: self.ledger.clone(),
            taxes: *self.taxes.rates(),
            total_fees: self.total_fees,
            tax_exempt,
            pairs,
            allowances: self.allowances.clone(),
            liquidity: self.liquidity.clone(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&TokenEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Reads ──────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn pair(&self) -> Address {
        self.pair
    }

    pub fn fee_wallets(&self) -> &FeeWallets {
        &self.wallets
    }

    pub fn total_supply(&self) -> Amount {
        self.ledger.totals().token_supply
    }

    /// Cumulative tax taken by every taxed transfer, burn included.
    pub fn total_fees(&self) -> Amount {
        self.total_fees
    }

    pub fn balance_of(&self, address: &Address) -> Result<Amount, TokenError> {
        Ok(self.ledger.balance_of(address)?)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances.allowance(owner, spender)
    }

    pub fn rate(&self) -> Result<Rate, TokenError> {
        Ok(self.ledger.rate()?)
    }

    pub fn reflected_supply(&self) -> U256 {
        self.ledger.totals().reflected_supply
    }

    pub fn excluded_tokens(&self) -> Amount {
        self.ledger.totals().excluded_tokens
    }

    pub fn excluded_reflected(&self) -> U256 {
        self.ledger.totals().excluded_reflected
    }

    pub fn is_excluded(&self, address: &Address) -> bool {
        self.ledger.is_excluded(address)
    }

    pub fn is_tax_exempt(&self, address: &Address) -> bool {
        self.tax_exempt.contains(address)
    }

    pub fn is_liquidity_pair(&self, address: &Address) -> bool {
        self.pairs.contains(address)
    }

    pub fn taxes(&self) -> &TaxRates {
        self.taxes.rates()
    }

    pub fn pending_liquidity(&self) -> Amount {
        self.liquidity.pending()
    }

    /// Base asset received by a swap whose add-liquidity step failed.
    pub fn held_base(&self) -> Amount {
        self.liquidity.base_held()
    }

    pub fn is_liquidity_provisioning_enabled(&self) -> bool {
        self.liquidity.is_enabled()
    }

    pub fn provisioning_threshold(&self) -> Amount {
        self.liquidity.threshold()
    }

    /// Every address the ledger knows about with its current balance.
    pub fn holders(&self) -> Result<Vec<(Address, Amount)>, TokenError> {
        let mut holders = self
            .ledger
            .accounts()
            .map(|(address, _)| Ok((*address, self.ledger.balance_of(address)?)))
            .collect::<Result<Vec<_>, TokenError>>()?;
        holders.sort_by_key(|(address, _)| *address);
        Ok(holders)
    }

    pub fn exchange(&self) -> &X {
        &self.exchange
    }

    pub fn exchange_mut(&mut self) -> &mut X {
        &mut self.exchange
    }

    // ── Transfers ──────────────────────────────────────────────────────

    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<bool, TokenError> {
        let taxed = self.is_taxed(from, to);
        self.settle(from, to, amount)?;
        if taxed {
            self.provision_if_due(from);
        }
        Ok(true)
    }

    /// Move `amount` of `from`'s tokens on behalf of `spender`.
    ///
    /// When the spender is the holder no allowance is needed.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<bool, TokenError> {
        self.validate(from, to, amount)?;
        let spend = if spender != from {
            Some(self.allowances.prepare_spend(from, spender, amount)?)
        } else {
            None
        };
        let taxed = self.is_taxed(from, to);
        self.settle(from, to, amount)?;
        if let Some(spend) = spend {
            self.allowances.commit_spend(spend);
            if let Some(remaining) = spend.remaining {
                self.events.emit(&TokenEvent::Approval {
                    owner: *from,
                    spender: *spender,
                    amount: remaining,
                });
            }
        }
        if taxed {
            self.provision_if_due(from);
        }
        Ok(true)
    }

    fn is_taxed(&self, from: &Address, to: &Address) -> bool {
        !self.liquidity.is_swapping()
            && !self.tax_exempt.contains(from)
            && !self.tax_exempt.contains(to)
    }

    /// Reject a transfer before anything is staged: parties first, then the
    /// amount, then the sender's balance.
    fn validate(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        if from.is_zero() || to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        if amount.is_zero() {
            return Err(TokenError::ZeroAmount);
        }
        let available = self.ledger.balance_of(from)?;
        if amount > available {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Validate, tax and commit one transfer, then emit its signals.
    fn settle(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<TaxBreakdown, TokenError> {
        self.validate(from, to, amount)?;

        let breakdown = if self.is_taxed(from, to) {
            self.taxes.apply(amount)?
        } else {
            TaxBreakdown::untaxed(amount)
        };

        let mut batch = self.ledger.batch()?;
        batch.debit(from, amount)?;
        batch.credit(to, breakdown.net_amount)?;
        batch.credit(&self.wallets.charity, breakdown.charity)?;
        batch.credit(&self.wallets.community, breakdown.community)?;
        batch.credit(&self.wallets.marketing, breakdown.marketing)?;
        batch.credit(&self.contract, breakdown.liquidity)?;
        batch.burn(breakdown.burn)?;
        // The instant reward is credited to nobody: its reflected units leave
        // the reflected supply and every included holder's balance grows.
        let changes = batch.finish()?;

        let total_fees = self
            .total_fees
            .checked_add(breakdown.total_tax())
            .ok_or(TokenError::Overflow)?;
        let pending = self
            .liquidity
            .pending_after(breakdown.liquidity)
            .ok_or(TokenError::Overflow)?;

        self.ledger.commit(changes);
        self.total_fees = total_fees;
        self.liquidity.set_pending(pending);

        debug!(
            from = %from,
            to = %to,
            amount = %amount,
            net = %breakdown.net_amount,
            tax = %breakdown.total_tax(),
            "transfer settled"
        );
        self.events.emit(&TokenEvent::Transfer {
            from: *from,
            to: *to,
            amount: breakdown.net_amount,
        });
        if !breakdown.is_zero() {
            self.events.emit(&TokenEvent::TaxApplied {
                from: *from,
                to: *to,
                breakdown,
            });
        }
        Ok(breakdown)
    }

    // ── Auto-liquidity ─────────────────────────────────────────────────

    /// Run a provisioning round if one is due. Never fails the caller: an
    /// exchange failure is logged and signalled, and the transfer that
    /// triggered the round stands.
    fn provision_if_due(&mut self, sender: &Address) {
        if self.pairs.contains(sender) || !self.liquidity.is_due() {
            return;
        }
        let Some(_lock) = self.liquidity.try_lock() else {
            return;
        };
        match self.provision_liquidity() {
            Ok(Some(report)) => {
                info!(
                    tokens_swapped = %report.tokens_swapped,
                    base_received = %report.base_received,
                    tokens_added = %report.tokens_added,
                    base_added = %report.base_added,
                    pool_shares = %report.pool_shares,
                    "liquidity provisioned"
                );
                self.events.emit(&TokenEvent::LiquidityProvisioned {
                    tokens_swapped: report.tokens_swapped,
                    base_received: report.base_received,
                    tokens_added: report.tokens_added,
                    base_added: report.base_added,
                    pool_shares: report.pool_shares,
                });
            }
            Ok(None) => {}
            Err(err) => {
                let pending = self.liquidity.pending();
                warn!(error = %err, pending = %pending, "liquidity provisioning failed");
                self.events.emit(&TokenEvent::LiquidityProvisionFailed {
                    reason: err.to_string(),
                    pending,
                });
            }
        }
    }

    /// Swap half of the pending tokens, then pair the rest with the proceeds.
    ///
    /// Tokens leave the contract only after the exchange accepted them. If
    /// the second step fails the swap proceeds stay in `base_held` for the
    /// next round.
    fn provision_liquidity(&mut self) -> Result<Option<ProvisionReport>, TokenError> {
        let contract = self.contract;
        let pair = self.pair;
        let contract_balance = self.ledger.balance_of(&contract)?;
        let Some(plan) = self.liquidity.plan(contract_balance) else {
            return Ok(None);
        };

        let base_received = if plan.swap_tokens.is_zero() {
            U256::zero()
        } else {
            let base = self.exchange.swap_tokens_for_base(plan.swap_tokens)?;
            self.settle(&contract, &pair, plan.swap_tokens)?;
            self.liquidity.record_swap(plan.swap_tokens, base);
            base
        };

        let receipt = self.exchange.add_liquidity(
            plan.liquidity_tokens,
            self.liquidity.base_held(),
            &self.lp_recipient,
        )?;
        let tokens_added = receipt.tokens_added.min(plan.liquidity_tokens);
        if !tokens_added.is_zero() {
            self.settle(&contract, &pair, tokens_added)?;
        }
        self.liquidity.record_liquidity(tokens_added, receipt.base_added);

        Ok(Some(ProvisionReport {
            tokens_swapped: plan.swap_tokens,
            base_received,
            tokens_added,
            base_added: receipt.base_added,
            pool_shares: receipt.pool_shares,
        }))
    }

    // ── Allowances ─────────────────────────────────────────────────────

    pub fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<bool, TokenError> {
        self.allowances.approve(owner, spender, amount)?;
        self.emit_approval(owner, spender, amount);
        Ok(true)
    }

    pub fn increase_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        added: Amount,
    ) -> Result<bool, TokenError> {
        let updated = self.allowances.increase(owner, spender, added)?;
        self.emit_approval(owner, spender, updated);
        Ok(true)
    }

    pub fn decrease_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        subtracted: Amount,
    ) -> Result<bool, TokenError> {
        let updated = self.allowances.decrease(owner, spender, subtracted)?;
        self.emit_approval(owner, spender, updated);
        Ok(true)
    }

    fn emit_approval(&self, owner: &Address, spender: &Address, amount: Amount) {
        debug!(owner = %owner, spender = %spender, amount = %amount, "allowance set");
        self.events.emit(&TokenEvent::Approval {
            owner: *owner,
            spender: *spender,
            amount,
        });
    }

    // ── Owner operations ───────────────────────────────────────────────

    fn ensure_owner(&self, caller: &Address) -> Result<(), TokenError> {
        if *caller != self.owner {
            return Err(TokenError::NotOwner(*caller));
        }
        Ok(())
    }

    /// Include or exclude `address` from rewards and mark whether it is an
    /// AMM pair. Balances are preserved across the toggle.
    pub fn set_exclusion(
        &mut self,
        caller: &Address,
        address: &Address,
        excluded: bool,
        is_liquidity_pair: bool,
    ) -> Result<(), TokenError> {
        self.ensure_owner(caller)?;
        if address.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let exclusion_changed = self.ledger.set_exclusion(address, excluded)?;
        let pair_changed = if is_liquidity_pair {
            self.pairs.insert(*address)
        } else {
            self.pairs.remove(address)
        };
        if exclusion_changed || pair_changed {
            info!(address = %address, excluded, is_liquidity_pair, "exclusion changed");
            self.events.emit(&TokenEvent::ExclusionChanged {
                address: *address,
                excluded,
                is_liquidity_pair,
            });
        }
        Ok(())
    }

    /// Replace every tax rate at once, effective from the next transfer.
    pub fn update_taxes(&mut self, caller: &Address, rates: TaxRates) -> Result<(), TokenError> {
        self.ensure_owner(caller)?;
        let previous = self.taxes.update(rates)?;
        info!(?previous, current = ?rates, "taxes updated");
        self.events.emit(&TokenEvent::TaxesUpdated {
            previous,
            current: rates,
        });
        Ok(())
    }

    pub fn set_liquidity_provisioning(
        &mut self,
        caller: &Address,
        enabled: bool,
    ) -> Result<(), TokenError> {
        self.ensure_owner(caller)?;
        let previous = self.liquidity.set_enabled(enabled);
        if previous != enabled {
            info!(enabled, "liquidity provisioning switched");
            self.events
                .emit(&TokenEvent::LiquidityProvisioningChanged { enabled });
        }
        Ok(())
    }

    pub fn set_provisioning_threshold(
        &mut self,
        caller: &Address,
        threshold: Amount,
    ) -> Result<(), TokenError> {
        self.ensure_owner(caller)?;
        let previous = self.liquidity.set_threshold(threshold);
        info!(previous = %previous, threshold = %threshold, "provisioning threshold changed");
        Ok(())
    }

    pub fn set_tax_exemption(
        &mut self,
        caller: &Address,
        address: &Address,
        exempt: bool,
    ) -> Result<(), TokenError> {
        self.ensure_owner(caller)?;
        if address.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let changed = if exempt {
            self.tax_exempt.insert(*address)
        } else {
            self.tax_exempt.remove(address)
        };
        if changed {
            info!(address = %address, exempt, "tax exemption changed");
            self.events.emit(&TokenEvent::TaxExemptionChanged {
                address: *address,
                exempt,
            });
        }
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: &Address,
    ) -> Result<(), TokenError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let previous_owner = std::mem::replace(&mut self.owner, *new_owner);
        info!(previous = %previous_owner, new_owner = %new_owner, "ownership transferred");
        self.events.emit(&TokenEvent::OwnershipTransferred {
            previous_owner,
            new_owner: *new_owner,
        });
        Ok(())
    }
}
