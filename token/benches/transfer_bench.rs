use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use solar_nullables::NullExchange;
use solar_tax::TaxPolicy;
use solar_token::{LiquidityConfig, ReflectionToken, TokenConfig};
use solar_types::{Address, U256};

fn token_with_holders(n: u64) -> ReflectionToken<NullExchange> {
    let config = TokenConfig {
        liquidity: LiquidityConfig {
            enabled: false,
            threshold: 0,
        },
        ..TokenConfig::default()
    };
    let owner = config.owner;
    let mut token = ReflectionToken::new(&config, NullExchange::new()).unwrap();
    for i in 0..n {
        token
            .transfer(&owner, &Address::from_low_u64(0x1000 + i), U256::from(1_000_000_000_000u64))
            .unwrap();
    }
    token
}

fn bench_taxed_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("taxed_transfer");
    let from = Address::from_low_u64(0x1000);
    let to = Address::from_low_u64(0x1001);

    // Reward distribution must not depend on the number of holders.
    for holder_count in [10u64, 1_000, 10_000] {
        let mut token = token_with_holders(holder_count);
        group.bench_with_input(
            BenchmarkId::new("transfer", holder_count),
            &holder_count,
            |b, _| {
                b.iter(|| {
                    let _ = token.transfer(black_box(&from), black_box(&to), black_box(U256::from(1_000_000u64)));
                    let _ = token.transfer(black_box(&to), black_box(&from), black_box(U256::from(1_000_000u64)));
                });
            },
        );
    }

    group.finish();
}

fn bench_balance_of(c: &mut Criterion) {
    let mut group = c.benchmark_group("balance_of");
    let holder = Address::from_low_u64(0x1000);

    for holder_count in [10u64, 10_000] {
        let token = token_with_holders(holder_count);
        group.bench_with_input(
            BenchmarkId::new("balance_of", holder_count),
            &holder_count,
            |b, _| {
                b.iter(|| black_box(token.balance_of(black_box(&holder))));
            },
        );
    }

    group.finish();
}

fn bench_tax_apply(c: &mut Criterion) {
    let policy = TaxPolicy::default();
    c.bench_function("tax_apply", |b| {
        b.iter(|| black_box(policy.apply(black_box(U256::from(123_456_789_000u64)))));
    });
}

criterion_group!(benches, bench_taxed_transfer, bench_balance_of, bench_tax_apply);
criterion_main!(benches);
