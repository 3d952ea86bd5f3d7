#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use solar_nullables::NullExchange;
use solar_tax::TaxRates;
use solar_token::{LiquidityConfig, ReflectionToken, TokenConfig};
use solar_types::{Address, U256};

#[derive(Arbitrary, Debug)]
enum Op {
    Transfer { from: u8, to: u8, amount: u64 },
    TransferFrom { spender: u8, from: u8, to: u8, amount: u64 },
    Approve { owner: u8, spender: u8, amount: u64 },
    Exclude { who: u8, excluded: bool, pair: bool },
    Taxes { instant: u8, liquidity: u8, burn: u8 },
    Provisioning { enabled: bool },
    FailExchange { swaps: bool, add: bool },
}

// Small address space so operations collide on the same accounts.
fn addr(n: u8) -> Address {
    Address::from_low_u64(u64::from(n % 8) + 1)
}

// Replay arbitrary operation sequences. Nothing may panic.
fuzz_target!(|ops: Vec<Op>| {
    let config = TokenConfig {
        initial_supply: 1_000_000,
        liquidity: LiquidityConfig {
            enabled: true,
            threshold: 1,
        },
        ..TokenConfig::default()
    };
    let owner = config.owner;
    let Ok(mut token) = ReflectionToken::new(&config, NullExchange::new()) else {
        return;
    };

    for op in ops.into_iter().take(64) {
        match op {
            Op::Transfer { from, to, amount } => {
                let _ = token.transfer(&addr(from), &addr(to), U256::from(amount));
            }
            Op::TransferFrom { spender, from, to, amount } => {
                let _ = token.transfer_from(&addr(spender), &addr(from), &addr(to), U256::from(amount));
            }
            Op::Approve { owner, spender, amount } => {
                let _ = token.approve(&addr(owner), &addr(spender), U256::from(amount));
            }
            Op::Exclude { who, excluded, pair } => {
                let _ = token.set_exclusion(&owner, &addr(who), excluded, pair);
            }
            Op::Taxes { instant, liquidity, burn } => {
                let (instant, liquidity) = (u32::from(instant % 40), u32::from(liquidity % 40));
                let rates = TaxRates {
                    instant_reward: instant,
                    charity: 0,
                    community: 0,
                    marketing: 0,
                    liquidity,
                    burn: u32::from(burn % 40),
                    total: instant + liquidity,
                };
                let _ = token.update_taxes(&owner, rates);
            }
            Op::Provisioning { enabled } => {
                let _ = token.set_liquidity_provisioning(&owner, enabled);
            }
            Op::FailExchange { swaps, add } => {
                token.exchange_mut().fail_swaps(swaps);
                token.exchange_mut().fail_add_liquidity(add);
            }
        }
    }

    let _ = token.holders();
    let _ = token.rate();
});
