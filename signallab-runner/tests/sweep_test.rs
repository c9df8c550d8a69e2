//! Integration tests for the parameter sweep.
//!
//! Tests:
//! 1. Determinism: identical reports for 1, 2 and 4 workers.
//! 2. Cancellation: a pre-set flag skips every unit.
//! 3. Deadline: a zero timeout skips every unit.
//! 4. Ranking: a different metric reorders the same results.
//! 5. Failures: an erroring unit is recorded, not fatal.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use signallab_core::engine::BacktestConfig;
use signallab_core::signal::SignalMode;
use signallab_runner::ranking::RankingMetric;
use signallab_runner::sweep::{run_sweep, ParamGrid, SweepOptions, SweepReport};
use signallab_runner::synthetic::{generate_candles, SyntheticConfig};

fn candles() -> Vec<signallab_core::domain::Candle> {
    generate_candles(&SyntheticConfig {
        count: 400,
        seed: 11,
        volatility: 0.03,
        ..Default::default()
    })
}

fn grid() -> ParamGrid {
    ParamGrid {
        fast_periods: vec![3, 5, 8, 13],
        slow_periods: vec![21, 34],
        modes: vec![SignalMode::Crossover, SignalMode::Trend, SignalMode::Combined],
        use_exponential: vec![false, true],
    }
}

fn base() -> BacktestConfig {
    BacktestConfig {
        window_size: 1,
        ..Default::default()
    }
}

fn options(workers: usize) -> SweepOptions {
    SweepOptions {
        workers,
        ..Default::default()
    }
}

fn ranking_key(report: &SweepReport) -> Vec<(usize, String)> {
    report
        .entries
        .iter()
        .map(|e| (e.grid_index, serde_json::to_string(&e.result).unwrap()))
        .collect()
}

#[test]
fn results_do_not_depend_on_worker_count() {
    let candles = candles();
    let one = run_sweep(&candles, &base(), &grid(), &options(1), None).unwrap();
    let two = run_sweep(&candles, &base(), &grid(), &options(2), None).unwrap();
    let four = run_sweep(&candles, &base(), &grid(), &options(4), None).unwrap();

    assert_eq!(one.total_units, 48);
    assert_eq!(one.entries.len(), 48);
    assert_eq!(ranking_key(&one), ranking_key(&two));
    assert_eq!(ranking_key(&one), ranking_key(&four));
}

#[test]
fn preset_cancel_flag_skips_everything() {
    let candles = candles();
    let cancel = AtomicBool::new(true);
    let report = run_sweep(&candles, &base(), &grid(), &options(2), Some(&cancel)).unwrap();

    assert!(report.cancelled);
    assert_eq!(report.completed(), 0);
    assert_eq!(report.skipped, report.total_units);
    assert!(report.best().is_none());
}

#[test]
fn unset_cancel_flag_runs_everything() {
    let candles = candles();
    let cancel = AtomicBool::new(false);
    let report = run_sweep(&candles, &base(), &grid(), &options(2), Some(&cancel)).unwrap();

    assert!(!report.cancelled);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.completed(), report.total_units);
}

#[test]
fn zero_timeout_skips_everything() {
    let candles = candles();
    let opts = SweepOptions {
        workers: 2,
        timeout: Some(Duration::ZERO),
        ..Default::default()
    };
    let report = run_sweep(&candles, &base(), &grid(), &opts, None).unwrap();

    assert!(report.cancelled);
    assert_eq!(report.entries.len(), 0);
    assert_eq!(report.skipped, report.total_units);
}

#[test]
fn drawdown_ranking_puts_smallest_first() {
    let candles = candles();
    let opts = SweepOptions {
        workers: 2,
        ranking: RankingMetric::MaxDrawdown,
        ..Default::default()
    };
    let report = run_sweep(&candles, &base(), &grid(), &opts, None).unwrap();

    assert_eq!(report.ranking, RankingMetric::MaxDrawdown);
    for pair in report.entries.windows(2) {
        assert!(pair[0].score <= pair[1].score);
    }
    let best = report.best().unwrap();
    assert_eq!(best.score, best.result.metrics.max_drawdown);
}

#[test]
fn failing_units_are_reported_without_aborting() {
    let mut bad = candles();
    bad[7].close = f64::NAN;
    let report = run_sweep(&bad, &base(), &grid(), &options(2), None).unwrap();

    assert!(report.entries.is_empty());
    assert_eq!(report.failures.len(), report.total_units);
    assert!(!report.cancelled);
    assert!(report.failures[0].error.contains("malformed candle at index 7"));
}

#[test]
fn too_short_history_completes_without_trades() {
    let short = generate_candles(&SyntheticConfig {
        count: 10,
        ..Default::default()
    });
    let report = run_sweep(&short, &base(), &grid(), &options(2), None).unwrap();
    assert_eq!(report.completed(), report.total_units);
    assert!(report.entries.iter().all(|e| e.result.trades.is_empty()));
}
