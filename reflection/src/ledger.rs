//! Account ledger with staged, all-or-nothing writes.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = ledger.batch()?;
//! batch.debit(&sender, amount)?;
//! batch.credit(&recipient, net)?;
//! batch.burn(burned);
//! let changes = batch.finish()?;
//! ledger.commit(changes);
//! ```
//!
//! Every conversion inside a batch uses the rate snapshot taken when the
//! batch was opened. If any step fails the batch is simply dropped and the
//! ledger is untouched.

use serde::{Deserialize, Serialize};
use solar_types::{Address, U256};
use std::collections::HashMap;

use crate::account::Account;
use crate::error::ReflectionError;
use crate::rate::{Rate, ReflectionTotals};

fn add(a: U256, b: U256) -> Result<U256, ReflectionError> {
    a.checked_add(b).ok_or(ReflectionError::Overflow)
}

fn sub(a: U256, b: U256, what: &'static str) -> Result<U256, ReflectionError> {
    a.checked_sub(b).ok_or(ReflectionError::Underflow(what))
}

/// Per-address balances plus the global totals they are measured against.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountLedger {
    accounts: HashMap<Address, Account>,
    totals: ReflectionTotals,
}

impl AccountLedger {
    /// Mint the whole `supply` to `holder` as an included account.
    pub fn genesis(holder: Address, supply: U256) -> Result<Self, ReflectionError> {
        let totals = ReflectionTotals::genesis(supply)?;
        let mut accounts = HashMap::new();
        accounts.insert(
            holder,
            Account::Included {
                reflected: totals.reflected_supply,
            },
        );
        Ok(Self { accounts, totals })
    }

    /// Rebuild a ledger from previously persisted parts.
    pub fn from_parts(accounts: HashMap<Address, Account>, totals: ReflectionTotals) -> Self {
        Self { accounts, totals }
    }

    pub fn totals(&self) -> &ReflectionTotals {
        &self.totals
    }

    pub fn rate(&self) -> Result<Rate, ReflectionError> {
        self.totals.rate()
    }

    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }

    /// Number of addresses that have ever been credited or toggled.
    pub fn holder_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_excluded(&self, address: &Address) -> bool {
        self.accounts
            .get(address)
            .map(Account::is_excluded)
            .unwrap_or(false)
    }

    /// Token balance of `address`; unknown addresses hold zero.
    pub fn balance_of(&self, address: &Address) -> Result<U256, ReflectionError> {
        match self.accounts.get(address) {
            Some(account) => account.balance(&self.rate()?),
            None => Ok(U256::zero()),
        }
    }

    /// Switch `address` between the included and excluded representations.
    ///
    /// Returns `false` if the account already had the requested kind. The
    /// observable balance is preserved to within one unit of truncation, and
    /// toggling an empty account leaves the rate exactly as it was.
    pub fn set_exclusion(
        &mut self,
        address: &Address,
        excluded: bool,
    ) -> Result<bool, ReflectionError> {
        let account = self.accounts.get(address).copied().unwrap_or_default();
        let (updated, totals) = match (account, excluded) {
            (Account::Included { reflected }, true) => {
                let tokens = self.rate()?.to_tokens(reflected)?;
                let totals = ReflectionTotals {
                    excluded_tokens: add(self.totals.excluded_tokens, tokens)?,
                    excluded_reflected: add(self.totals.excluded_reflected, reflected)?,
                    ..self.totals
                };
                (Account::Excluded { tokens, reflected }, totals)
            }
            (Account::Excluded { tokens, reflected }, false) => {
                let rederived = self.rate()?.to_reflected(tokens)?;
                let totals = ReflectionTotals {
                    excluded_tokens: sub(self.totals.excluded_tokens, tokens, "excluded tokens")?,
                    excluded_reflected: sub(
                        self.totals.excluded_reflected,
                        reflected,
                        "excluded reflected",
                    )?,
                    reflected_supply: add(
                        sub(self.totals.reflected_supply, reflected, "reflected supply")?,
                        rederived,
                    )?,
                    ..self.totals
                };
                (Account::Included { reflected: rederived }, totals)
            }
            _ => return Ok(false),
        };
        self.accounts.insert(*address, updated);
        self.totals = totals;
        Ok(true)
    }

    /// Open a staged batch against the current rate.
    pub fn batch(&self) -> Result<LedgerBatch<'_>, ReflectionError> {
        Ok(LedgerBatch {
            ledger: self,
            rate: self.rate()?,
            staged: HashMap::new(),
            reflected_in: U256::zero(),
            reflected_out: U256::zero(),
            excluded_tokens_in: U256::zero(),
            excluded_tokens_out: U256::zero(),
            excluded_reflected_in: U256::zero(),
            excluded_reflected_out: U256::zero(),
            burned: U256::zero(),
        })
    }

    /// Apply the writes of a finished batch. Infallible: all checks ran in
    /// [`LedgerBatch::finish`].
    pub fn commit(&mut self, changes: LedgerChanges) {
        self.accounts.extend(changes.accounts);
        self.totals = changes.totals;
    }
}

/// Writes staged against a fixed rate snapshot, not yet visible in the ledger.
pub struct LedgerBatch<'a> {
    ledger: &'a AccountLedger,
    rate: Rate,
    staged: HashMap<Address, Account>,
    reflected_in: U256,
    reflected_out: U256,
    excluded_tokens_in: U256,
    excluded_tokens_out: U256,
    excluded_reflected_in: U256,
    excluded_reflected_out: U256,
    burned: U256,
}

impl LedgerBatch<'_> {
    /// The rate snapshot every conversion in this batch uses.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    fn current(&self, address: &Address) -> Account {
        self.staged
            .get(address)
            .or_else(|| self.ledger.accounts.get(address))
            .copied()
            .unwrap_or_default()
    }

    /// Balance of `address` including writes already staged in this batch.
    pub fn balance_of(&self, address: &Address) -> Result<U256, ReflectionError> {
        self.current(address).balance(&self.rate)
    }

    /// Remove `tokens` from `address`.
    ///
    /// Debiting the entire balance clears every reflected unit of the
    /// account, so it ends at exactly zero with no dust left behind.
    pub fn debit(&mut self, address: &Address, tokens: U256) -> Result<(), ReflectionError> {
        if tokens.is_zero() {
            return Ok(());
        }
        let account = self.current(address);
        let available = account.balance(&self.rate)?;
        if tokens > available {
            return Err(ReflectionError::InsufficientBalance {
                needed: tokens,
                available,
            });
        }
        let full = tokens == available;
        let reflected = account.reflected();
        let delta = if full {
            reflected
        } else {
            self.rate.to_reflected(tokens)?.min(reflected)
        };
        self.reflected_out = add(self.reflected_out, delta)?;

        let updated = match account {
            Account::Included { .. } => Account::Included {
                reflected: reflected - delta,
            },
            Account::Excluded { tokens: held, .. } => {
                self.excluded_tokens_out = add(self.excluded_tokens_out, tokens)?;
                self.excluded_reflected_out = add(self.excluded_reflected_out, delta)?;
                Account::Excluded {
                    tokens: held - tokens,
                    reflected: reflected - delta,
                }
            }
        };
        self.staged.insert(*address, updated);
        Ok(())
    }

    /// Add `tokens` to `address`, creating the account on first credit.
    pub fn credit(&mut self, address: &Address, tokens: U256) -> Result<(), ReflectionError> {
        if tokens.is_zero() {
            return Ok(());
        }
        let delta = self.rate.to_reflected(tokens)?;
        self.reflected_in = add(self.reflected_in, delta)?;

        let updated = match self.current(address) {
            Account::Included { reflected } => Account::Included {
                reflected: add(reflected, delta)?,
            },
            Account::Excluded {
                tokens: held,
                reflected,
            } => {
                self.excluded_tokens_in = add(self.excluded_tokens_in, tokens)?;
                self.excluded_reflected_in = add(self.excluded_reflected_in, delta)?;
                Account::Excluded {
                    tokens: add(held, tokens)?,
                    reflected: add(reflected, delta)?,
                }
            }
        };
        self.staged.insert(*address, updated);
        Ok(())
    }

    /// Remove `tokens` from the token supply.
    ///
    /// The matching reflected units leave the reflected supply on their own:
    /// they were debited from the sender and credited to nobody.
    pub fn burn(&mut self, tokens: U256) -> Result<(), ReflectionError> {
        self.burned = add(self.burned, tokens)?;
        Ok(())
    }

    /// Validate the staged writes and produce the changes to commit.
    ///
    /// Reflected units debited but never credited (instant reward, burn,
    /// truncation dust) are removed from the reflected supply here.
    pub fn finish(self) -> Result<LedgerChanges, ReflectionError> {
        let totals = self.ledger.totals;
        let totals = ReflectionTotals {
            token_supply: sub(totals.token_supply, self.burned, "token supply")?,
            // The reflected supply sits just below U256::MAX: debits come off
            // before credits go on.
            reflected_supply: add(
                sub(totals.reflected_supply, self.reflected_out, "reflected supply")?,
                self.reflected_in,
            )?,
            excluded_tokens: add(
                sub(totals.excluded_tokens, self.excluded_tokens_out, "excluded tokens")?,
                self.excluded_tokens_in,
            )?,
            excluded_reflected: add(
                sub(
                    totals.excluded_reflected,
                    self.excluded_reflected_out,
                    "excluded reflected",
                )?,
                self.excluded_reflected_in,
            )?,
        };
        // Burned tokens must have come out of somebody's balance.
        totals.included_tokens()?;
        Ok(LedgerChanges {
            accounts: self.staged,
            totals,
        })
    }
}

/// The result of a finished batch, ready to be committed.
#[derive(Debug)]
pub struct LedgerChanges {
    accounts: HashMap<Address, Account>,
    totals: ReflectionTotals,
}

impl LedgerChanges {
    pub fn totals(&self) -> &ReflectionTotals {
        &self.totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_address(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn supply() -> U256 {
        U256::from(1_000_000_000_000u64)
    }

    fn transfer(ledger: &mut AccountLedger, from: u64, to: u64, amount: u64) {
        let mut batch = ledger.batch().unwrap();
        batch.debit(&test_address(from), U256::from(amount)).unwrap();
        batch.credit(&test_address(to), U256::from(amount)).unwrap();
        let changes = batch.finish().unwrap();
        ledger.commit(changes);
    }

    #[test]
    fn genesis_mints_everything_to_holder() {
        let ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        assert_eq!(ledger.balance_of(&test_address(1)).unwrap(), supply());
        assert_eq!(ledger.balance_of(&test_address(2)).unwrap(), U256::zero());
        assert_eq!(ledger.holder_count(), 1);
    }

    #[test]
    fn plain_transfer_moves_balance() {
        let mut ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        transfer(&mut ledger, 1, 2, 250);
        assert_eq!(ledger.balance_of(&test_address(2)).unwrap(), U256::from(250u64));
        assert_eq!(
            ledger.balance_of(&test_address(1)).unwrap(),
            supply() - U256::from(250u64)
        );
    }

    #[test]
    fn transfer_at_full_reflected_scale_does_not_overflow() {
        // 10 billion tokens with 9 decimals: the reflected supply is within
        // one token supply of U256::MAX.
        let supply = U256::from(10_000_000_000u64) * U256::from(1_000_000_000u64);
        let mut ledger = AccountLedger::genesis(test_address(1), supply).unwrap();
        let before = ledger.totals().reflected_supply;
        assert!(U256::MAX - before < supply);

        let mut batch = ledger.batch().unwrap();
        batch.debit(&test_address(1), U256::from(1u64)).unwrap();
        batch.credit(&test_address(2), U256::from(1u64)).unwrap();
        let changes = batch.finish().unwrap();
        ledger.commit(changes);

        assert_eq!(ledger.totals().reflected_supply, before);
        assert_eq!(ledger.balance_of(&test_address(2)).unwrap(), U256::from(1u64));
        assert_eq!(
            ledger.balance_of(&test_address(1)).unwrap(),
            supply - U256::from(1u64)
        );
    }

    #[test]
    fn debit_beyond_balance_is_rejected() {
        let mut ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        transfer(&mut ledger, 1, 2, 100);
        let mut batch = ledger.batch().unwrap();
        let err = batch.debit(&test_address(2), U256::from(101u64)).unwrap_err();
        assert_eq!(
            err,
            ReflectionError::InsufficientBalance {
                needed: U256::from(101u64),
                available: U256::from(100u64),
            }
        );
    }

    #[test]
    fn dropped_batch_leaves_ledger_untouched() {
        let ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        let before = *ledger.totals();
        {
            let mut batch = ledger.batch().unwrap();
            batch.debit(&test_address(1), U256::from(10u64)).unwrap();
            batch.burn(U256::from(10u64)).unwrap();
        }
        assert_eq!(*ledger.totals(), before);
        assert_eq!(ledger.balance_of(&test_address(1)).unwrap(), supply());
    }

    #[test]
    fn full_balance_debit_leaves_exact_zero() {
        let mut ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        transfer(&mut ledger, 1, 2, 333);
        let balance = ledger.balance_of(&test_address(2)).unwrap();
        let mut batch = ledger.batch().unwrap();
        batch.debit(&test_address(2), balance).unwrap();
        batch.credit(&test_address(3), balance).unwrap();
        let changes = batch.finish().unwrap();
        ledger.commit(changes);
        assert_eq!(ledger.balance_of(&test_address(2)).unwrap(), U256::zero());
        assert!(ledger.account(&test_address(2)).unwrap().reflected().is_zero());
    }

    #[test]
    fn uncredited_reflected_units_raise_included_balances() {
        let mut ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        transfer(&mut ledger, 1, 2, 500_000_000_000);

        // Debit 1000 from holder 1, credit 900 to holder 3, reflect 100.
        let mut batch = ledger.batch().unwrap();
        batch.debit(&test_address(1), U256::from(1000u64)).unwrap();
        batch.credit(&test_address(3), U256::from(900u64)).unwrap();
        let changes = batch.finish().unwrap();
        ledger.commit(changes);

        // Holder 2 owns ~half of the included pool, so gains ~half of 100.
        let holder2 = ledger.balance_of(&test_address(2)).unwrap();
        assert!(holder2 >= U256::from(500_000_000_049u64));
        assert!(holder2 <= U256::from(500_000_000_050u64));
        assert_eq!(ledger.totals().token_supply, supply());
    }

    #[test]
    fn burn_reduces_supply() {
        let mut ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        let mut batch = ledger.batch().unwrap();
        batch.debit(&test_address(1), U256::from(50u64)).unwrap();
        batch.burn(U256::from(50u64)).unwrap();
        let changes = batch.finish().unwrap();
        ledger.commit(changes);
        assert_eq!(ledger.totals().token_supply, supply() - U256::from(50u64));
        assert_eq!(
            ledger.balance_of(&test_address(1)).unwrap(),
            supply() - U256::from(50u64)
        );
    }

    #[test]
    fn burn_without_debit_is_rejected_at_finish() {
        let mut ledger = AccountLedger::genesis(test_address(1), U256::from(100u64)).unwrap();
        ledger.set_exclusion(&test_address(1), true).unwrap();
        let mut batch = ledger.batch().unwrap();
        batch.burn(U256::from(1u64)).unwrap();
        assert!(matches!(batch.finish(), Err(ReflectionError::Underflow(_))));
    }

    #[test]
    fn staged_self_transfer_sees_its_own_debit() {
        let mut ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        transfer(&mut ledger, 1, 2, 100);
        let mut batch = ledger.batch().unwrap();
        batch.debit(&test_address(2), U256::from(100u64)).unwrap();
        assert_eq!(batch.balance_of(&test_address(2)).unwrap(), U256::zero());
        batch.credit(&test_address(2), U256::from(90u64)).unwrap();
        assert_eq!(batch.balance_of(&test_address(2)).unwrap(), U256::from(90u64));
    }

    #[test]
    fn exclusion_freezes_balance() {
        let mut ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        transfer(&mut ledger, 1, 2, 1_000);
        assert!(ledger.set_exclusion(&test_address(2), true).unwrap());
        assert!(ledger.is_excluded(&test_address(2)));
        assert_eq!(ledger.totals().excluded_tokens, U256::from(1_000u64));

        // A reflection between other holders does not reach the excluded account.
        let mut batch = ledger.batch().unwrap();
        batch.debit(&test_address(1), U256::from(10_000u64)).unwrap();
        batch.credit(&test_address(3), U256::from(9_000u64)).unwrap();
        let changes = batch.finish().unwrap();
        ledger.commit(changes);
        assert_eq!(ledger.balance_of(&test_address(2)).unwrap(), U256::from(1_000u64));
    }

    #[test]
    fn repeated_exclusion_is_a_noop() {
        let mut ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        assert!(ledger.set_exclusion(&test_address(2), true).unwrap());
        assert!(!ledger.set_exclusion(&test_address(2), true).unwrap());
        assert!(!ledger.set_exclusion(&test_address(3), false).unwrap());
    }

    #[test]
    fn exclusion_round_trip_preserves_balance() {
        let mut ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        transfer(&mut ledger, 1, 2, 777_777);
        let before = ledger.balance_of(&test_address(2)).unwrap();
        ledger.set_exclusion(&test_address(2), true).unwrap();
        ledger.set_exclusion(&test_address(2), false).unwrap();
        let after = ledger.balance_of(&test_address(2)).unwrap();
        assert!(before - after <= U256::one());
        assert_eq!(ledger.totals().excluded_tokens, U256::zero());
        assert_eq!(ledger.totals().excluded_reflected, U256::zero());
    }

    #[test]
    fn toggling_empty_account_keeps_rate() {
        let mut ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        transfer(&mut ledger, 1, 2, 5_000);
        let rate = ledger.rate().unwrap();
        ledger.set_exclusion(&test_address(9), true).unwrap();
        assert_eq!(ledger.rate().unwrap(), rate);
        ledger.set_exclusion(&test_address(9), false).unwrap();
        assert_eq!(ledger.rate().unwrap(), rate);
    }

    #[test]
    fn excluded_credit_and_debit_track_totals() {
        let mut ledger = AccountLedger::genesis(test_address(1), supply()).unwrap();
        ledger.set_exclusion(&test_address(2), true).unwrap();
        transfer(&mut ledger, 1, 2, 4_000);
        assert_eq!(ledger.totals().excluded_tokens, U256::from(4_000u64));
        let mirrored = ledger.totals().excluded_reflected;
        assert!(!mirrored.is_zero());

        transfer(&mut ledger, 2, 3, 4_000);
        assert_eq!(ledger.totals().excluded_tokens, U256::zero());
        assert_eq!(ledger.totals().excluded_reflected, U256::zero());
        assert_eq!(ledger.balance_of(&test_address(3)).unwrap(), U256::from(4_000u64));
    }
}
