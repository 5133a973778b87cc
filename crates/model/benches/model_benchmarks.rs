//! Benchmarks for the bab-model strategy stages.
#![allow(missing_docs)]

use std::collections::BTreeMap;

use bab_model::{BabPipeline, CrossSectionalRanker, RollingBetaEstimator, StrategyConfig};
use bab_primitives::{Date, Symbol, TimeSeries};
use bab_traits::AcquiredUniverse;
use chrono::Months;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

fn month_end(i: usize) -> Date {
    let first = Date::from_ymd_opt(2000, 1, 1).unwrap();
    first.checked_add_months(Months::new(i as u32 + 1)).unwrap().pred_opt().unwrap()
}

/// One-factor universe with betas spread evenly over `[0.2, 2.0]`.
fn simulated_universe(n_entities: usize, n_months: usize) -> AcquiredUniverse {
    let mut rng = StdRng::seed_from_u64(7);
    let market = Normal::new(0.008, 0.045).unwrap();
    let noise = Normal::new(0.0, 0.06).unwrap();

    let m: Vec<f64> = (0..n_months).map(|_| market.sample(&mut rng)).collect();
    let benchmark: TimeSeries =
        m.iter().enumerate().map(|(i, &x)| (month_end(i), Some(x))).collect();

    let returns: BTreeMap<Symbol, TimeSeries> = (0..n_entities)
        .map(|j| {
            let beta = 0.2 + 1.8 * j as f64 / n_entities.max(2) as f64;
            let series = m
                .iter()
                .enumerate()
                .map(|(i, &x)| (month_end(i), Some(beta * x + noise.sample(&mut rng))))
                .collect();
            (Symbol::new(format!("S{j:04}")), series)
        })
        .collect();

    let resolved = returns.keys().cloned().collect();
    AcquiredUniverse { returns, benchmark, resolved, failed: vec![] }
}

fn bench_estimate_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_all");
    group.sample_size(20);

    for n_entities in [50, 200, 500] {
        let universe = simulated_universe(n_entities, 240);
        group.throughput(Throughput::Elements(n_entities as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n_entities), &universe, |b, u| {
            let estimator = RollingBetaEstimator::new(36);
            b.iter(|| estimator.estimate_all(black_box(&u.returns), black_box(&u.benchmark)));
        });
    }

    group.finish();
}

fn bench_rank_panel(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_panel");
    group.sample_size(20);

    for n_entities in [50, 500] {
        let universe = simulated_universe(n_entities, 240);
        let betas =
            RollingBetaEstimator::new(36).estimate_all(&universe.returns, &universe.benchmark);
        group.bench_with_input(BenchmarkId::from_parameter(n_entities), &betas, |b, betas| {
            let ranker = CrossSectionalRanker::default();
            b.iter(|| ranker.rank_panel(black_box(betas)));
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    for (n_entities, n_months) in [(100, 180), (500, 300)] {
        let universe = simulated_universe(n_entities, n_months);
        let config = StrategyConfig {
            start: month_end(0),
            end: month_end(n_months),
            ..StrategyConfig::default()
        };
        let pipeline = BabPipeline::new(config).unwrap();
        group.bench_with_input(
            BenchmarkId::new("entities_months", format!("{n_entities}x{n_months}")),
            &universe,
            |b, u| b.iter(|| pipeline.run(black_box(u))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_estimate_all, bench_rank_panel, bench_pipeline);
criterion_main!(benches);
