//! benches/sim_engine.rs
//! Run with:  cargo bench --bench sim_engine
//! HTML:      target/criterion/report/index.html

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use token_economy_sim::{
    Pool, SimStrategy, TokenId, WeightedPool, build_sustainability_loop, constants::S_PER_HOUR, pool::to_base18,
};

// ────────────────────────────────────────────────────────────────────────────
//  Parameter grids
// ────────────────────────────────────────────────────────────────────────────
const TICK_COUNTS: &[u64] = &[100, 1_000, 5_000];
const SWAP_COUNTS: &[usize] = &[1_000, 10_000];

fn strategy(ticks: u64, with_data_ecosystem: bool) -> SimStrategy {
    SimStrategy {
        time_step: S_PER_HOUR,
        max_ticks: ticks,
        with_data_ecosystem,
        ..SimStrategy::default()
    }
}

pub fn bench_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("sustainability_loop_ticks");
    group.sample_size(10);

    for &ticks in TICK_COUNTS {
        group.throughput(Throughput::Elements(ticks));
        for with_data in [false, true] {
            let id = BenchmarkId::from_parameter(format!("ticks_{ticks}_data_{with_data}"));
            group.bench_function(id, |b| {
                b.iter_batched(
                    || build_sustainability_loop(strategy(ticks, with_data)).expect("netlist builds"),
                    |mut state| {
                        state.run().expect("run completes");
                        black_box(state.token_price().expect("price is positive"));
                    },
                    BatchSize::LargeInput,
                )
            });
        }
    }

    group.finish();
}

/// A deep pool: 1e6 DT at weight 3, 1e7 token at weight 7.
fn setup_pool() -> WeightedPool {
    let mut pool = WeightedPool::default();
    pool.bind(&TokenId::datatoken(0), to_base18(1e6), to_base18(3.0))
        .expect("bind datatoken");
    pool.bind(&TokenId::native(), to_base18(1e7), to_base18(7.0))
        .expect("bind token");
    pool.finalize("bench").expect("finalize");
    pool
}

pub fn bench_swaps(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighted_pool_swaps");

    for &n in SWAP_COUNTS {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(42);
                    let amounts: Vec<u128> = (0..n).map(|_| to_base18(rng.gen_range(1.0..100.0))).collect();
                    (setup_pool(), amounts)
                },
                |(mut pool, amounts)| {
                    let dt = TokenId::datatoken(0);
                    let token = TokenId::native();
                    for (i, amount) in amounts.into_iter().enumerate() {
                        // alternate directions so reserves stay balanced
                        let out = if i % 2 == 0 {
                            pool.swap_exact_amount_in(&token, amount, &dt, 0)
                        } else {
                            pool.swap_exact_amount_in(&dt, amount / 10, &token, 0)
                        };
                        let _ = black_box(out);
                    }
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ticks, bench_swaps);
criterion_main!(benches);
