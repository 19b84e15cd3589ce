//! Benchmarks for indicator implementations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use screener_core::traits::{Indicator, MultiOutputIndicator, OhlcvIndicator};
use screener_core::types::{Bar, BarSeries, Timeframe};
use screener_indicators::{
    BollingerBands, Ema, IndicatorParams, IndicatorSnapshot, Macd, Rsi, Supertrend,
};

fn generate_test_data(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
        .collect()
}

fn generate_bars(size: usize) -> Vec<Bar> {
    generate_test_data(size)
        .into_iter()
        .enumerate()
        .map(|(i, c)| Bar::new(i as i64 * 60_000, c, c + 0.5, c - 0.5, c, 1000.0))
        .collect()
}

fn benchmark_ema(c: &mut Criterion) {
    let mut group = c.benchmark_group("EMA");

    for size in [100, 1000, 10000].iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("adjusted", size), &data, |b, data| {
            let ema = Ema::new(20);
            b.iter(|| ema.calculate(black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_momentum(c: &mut Criterion) {
    let mut group = c.benchmark_group("Momentum");

    for size in [100, 1000, 10000].iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("rsi", size), &data, |b, data| {
            let rsi = Rsi::new(14);
            b.iter(|| rsi.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("macd", size), &data, |b, data| {
            let macd = Macd::new();
            b.iter(|| macd.calculate(black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_bands(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bands");

    for size in [100, 1000, 10000].iter() {
        let data = generate_test_data(*size);
        let bars = generate_bars(*size);

        group.bench_with_input(BenchmarkId::new("bollinger", size), &data, |b, data| {
            let bb = BollingerBands::with_params(20, 1.0);
            b.iter(|| bb.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("supertrend", size), &bars, |b, bars| {
            let st = Supertrend::new();
            b.iter(|| st.calculate(black_box(bars)))
        });
    }

    group.finish();
}

fn benchmark_snapshot(c: &mut Criterion) {
    // a typical 15-day intraday window
    let series = BarSeries::from_bars("BENCH", Timeframe::Minute15, generate_bars(375));
    let params = IndicatorParams::default();

    c.bench_function("snapshot_375_bars", |b| {
        b.iter(|| IndicatorSnapshot::compute(black_box(&series), black_box(&params)))
    });
}

criterion_group!(
    benches,
    benchmark_ema,
    benchmark_momentum,
    benchmark_bands,
    benchmark_snapshot
);
criterion_main!(benches);
