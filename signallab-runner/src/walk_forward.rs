//! Walk-forward validation — rolling train/test folds with out-of-sample chaining.
//!
//! Candles are split into consecutive `(train, test)` folds of fixed size,
//! advancing by `step` candles (default `test_size`). For each fold the grid
//! is swept on the train span, the winning configuration is run on the test
//! span, and capital carries over from one fold's test run into the next.
//! `step` may not be smaller than `test_size`, so test spans never overlap
//! and the out-of-sample curve moves forward in time.
//!
//! The test run is handed `window_size` candles from before the test span as
//! warm-up, so its first acting candle is the first test candle.
//!
//! Cancellation is checked at fold boundaries against the caller's flag and a
//! single deadline for the whole run. A fold whose sweep was cut short is
//! dropped; the folds completed before it are returned with `cancelled` set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use signallab_core::domain::{Candle, EquityPoint, Trade};
use signallab_core::engine::{run_backtest, BacktestConfig, BacktestResult, EngineError};
use signallab_core::metrics::PerformanceMetrics;

use crate::sweep::{run_sweep, ParamGrid, SweepError, SweepOptions};

// ─── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkForwardConfig {
    /// Candles per in-sample (train) span.
    pub train_size: usize,
    /// Candles per out-of-sample (test) span.
    pub test_size: usize,
    /// Advance between fold starts; `None` means `test_size`.
    pub step: Option<usize>,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            train_size: 250,
            test_size: 50,
            step: None,
        }
    }
}

impl WalkForwardConfig {
    pub fn step(&self) -> usize {
        self.step.unwrap_or(self.test_size)
    }

    pub fn validate(&self) -> Result<(), WalkForwardError> {
        if self.train_size == 0 {
            return Err(invalid("train_size", "must be >= 1".into()));
        }
        if self.test_size == 0 {
            return Err(invalid("test_size", "must be >= 1".into()));
        }
        if self.step() < self.test_size {
            return Err(invalid(
                "step",
                format!(
                    "must be >= test_size ({}) so test spans do not overlap, got {}",
                    self.test_size,
                    self.step()
                ),
            ));
        }
        Ok(())
    }
}

// ─── Result types ────────────────────────────────────────────────────

/// Candle index ranges of one fold (start inclusive, end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldSpec {
    pub fold_index: usize,
    pub train_start: usize,
    pub train_end: usize,
    pub test_start: usize,
    pub test_end: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoldResult {
    pub spec: FoldSpec,
    /// Winning configuration of the train sweep, with the fold's starting capital.
    pub config: BacktestConfig,
    pub train_score: f64,
    pub train_metrics: PerformanceMetrics,
    /// Train sweep units that produced a result.
    pub sweep_entries: usize,
    /// Train sweep units whose backtest returned an error.
    pub sweep_failures: usize,
    /// Test run; trade indices are absolute candle indices.
    pub test: BacktestResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalkForwardReport {
    pub folds: Vec<FoldResult>,
    /// Concatenated out-of-sample ledger.
    pub oos_trades: Vec<Trade>,
    /// Concatenated out-of-sample equity; capital chains across folds.
    pub oos_equity_curve: Vec<EquityPoint>,
    pub oos_metrics: PerformanceMetrics,
    pub initial_capital: f64,
    pub final_equity: f64,
    /// Folds the candle range allows; `folds.len()` is smaller when cancelled.
    pub planned_folds: usize,
    /// The run stopped early on the cancel flag or the deadline.
    pub cancelled: bool,
}

#[derive(Debug, Error)]
pub enum WalkForwardError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("insufficient data: {total} candles < one fold of {required}")]
    InsufficientData { total: usize, required: usize },
    #[error("no configuration completed on the train span of fold {fold}")]
    NoViableConfig { fold: usize },
    #[error("sweep failed on fold {fold}: {source}")]
    Sweep {
        fold: usize,
        #[source]
        source: SweepError,
    },
    #[error("test backtest failed on fold {fold}: {source}")]
    Backtest {
        fold: usize,
        #[source]
        source: EngineError,
    },
}

// ─── Fold creation ───────────────────────────────────────────────────

/// Split `total` candles into folds.
pub fn make_folds(total: usize, config: &WalkForwardConfig) -> Result<Vec<FoldSpec>, WalkForwardError> {
    config.validate()?;
    let span = config.train_size + config.test_size;
    if total < span {
        return Err(WalkForwardError::InsufficientData {
            total,
            required: span,
        });
    }

    let mut folds = Vec::new();
    let mut start = 0;
    while start + span <= total {
        folds.push(FoldSpec {
            fold_index: folds.len(),
            train_start: start,
            train_end: start + config.train_size,
            test_start: start + config.train_size,
            test_end: start + span,
        });
        start += config.step();
    }
    Ok(folds)
}

fn invalid(name: &'static str, reason: String) -> WalkForwardError {
    WalkForwardError::InvalidParameter { name, reason }
}

// ─── Evaluation ──────────────────────────────────────────────────────

/// Optimize on each train span, evaluate on the following test span, and
/// concatenate the out-of-sample results.
///
/// - `progress_cb`: called after each completed fold.
/// - `cancel`: optional flag; once set, no further fold starts.
/// - `options.timeout`: one deadline for the whole run, measured from the call.
pub fn run_walk_forward(
    candles: &[Candle],
    base: &BacktestConfig,
    grid: &ParamGrid,
    config: &WalkForwardConfig,
    options: &SweepOptions,
    progress_cb: Option<&dyn Fn(&FoldResult)>,
    cancel: Option<&AtomicBool>,
) -> Result<WalkForwardReport, WalkForwardError> {
    let folds = make_folds(candles.len(), config)?;
    let planned_folds = folds.len();
    let deadline = options.timeout.map(|t| Instant::now() + t);
    let stop = || {
        cancel.is_some_and(|f| f.load(Ordering::Relaxed))
            || deadline.is_some_and(|d| Instant::now() >= d)
    };

    let mut capital = base.initial_capital;
    let mut results = Vec::with_capacity(planned_folds);
    let mut oos_trades = Vec::new();
    let mut oos_equity_curve = Vec::new();
    let mut bars_in_market = 0;
    let mut cancelled = false;

    for spec in folds {
        let fold = spec.fold_index;
        if stop() {
            cancelled = true;
            break;
        }

        let mut fold_base = base.clone();
        fold_base.initial_capital = capital;
        let fold_options = SweepOptions {
            timeout: deadline.map(|d| d.saturating_duration_since(Instant::now())),
            ..options.clone()
        };

        let train = &candles[spec.train_start..spec.train_end];
        let sweep = run_sweep(train, &fold_base, grid, &fold_options, cancel)
            .map_err(|source| WalkForwardError::Sweep { fold, source })?;
        if sweep.skipped > 0 {
            warn!(fold, skipped = sweep.skipped, "walk-forward fold sweep cut short; fold dropped");
            cancelled = true;
            break;
        }
        let best = sweep
            .best()
            .ok_or(WalkForwardError::NoViableConfig { fold })?;

        let winner = best.config.clone();
        if winner.window_size > spec.test_start {
            return Err(invalid(
                "train_size",
                format!(
                    "window_size {} exceeds the {} candles before fold {fold}'s test span",
                    winner.window_size, spec.test_start
                ),
            ));
        }
        let offset = spec.test_start - winner.window_size;
        let mut test = run_backtest(&candles[offset..spec.test_end], &winner)
            .map_err(|source| WalkForwardError::Backtest { fold, source })?;

        for trade in &mut test.trades {
            trade.entry_index += offset;
            trade.exit_index += offset;
        }
        for record in &mut test.signals {
            record.index += offset;
        }

        info!(
            fold,
            fast = winner.signal.fast_period,
            slow = winner.signal.slow_period,
            train_score = best.score,
            test_pnl = test.total_pnl,
            "walk-forward fold evaluated"
        );

        capital = test.final_equity;
        bars_in_market += test.bars_in_market;
        oos_trades.extend(test.trades.iter().cloned());
        oos_equity_curve.extend(test.equity_curve.iter().copied());
        let result = FoldResult {
            spec,
            config: winner,
            train_score: best.score,
            train_metrics: best.result.metrics.clone(),
            sweep_entries: sweep.entries.len(),
            sweep_failures: sweep.failures.len(),
            test,
        };
        if let Some(cb) = progress_cb {
            cb(&result);
        }
        results.push(result);
    }

    if cancelled {
        info!(completed = results.len(), planned_folds, "walk-forward cancelled");
    }

    let oos_metrics = PerformanceMetrics::compute(
        &oos_trades,
        &oos_equity_curve,
        base.initial_capital,
        base.timeframe,
        bars_in_market,
    );

    Ok(WalkForwardReport {
        folds: results,
        oos_trades,
        oos_equity_curve,
        oos_metrics,
        initial_capital: base.initial_capital,
        final_equity: capital,
        planned_folds,
        cancelled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_tile_without_overlap_by_default() {
        let config = WalkForwardConfig {
            train_size: 100,
            test_size: 20,
            step: None,
        };
        let folds = make_folds(160, &config).unwrap();
        assert_eq!(folds.len(), 3);
        assert_eq!(folds[0].test_start, 100);
        assert_eq!(folds[1].test_start, 120);
        assert_eq!(folds[2].test_end, 160);
        for pair in folds.windows(2) {
            assert_eq!(pair[0].test_end, pair[1].test_start);
        }
    }

    #[test]
    fn step_longer_than_test_leaves_gaps() {
        let config = WalkForwardConfig {
            train_size: 50,
            test_size: 20,
            step: Some(30),
        };
        let folds = make_folds(140, &config).unwrap();
        assert_eq!(folds.len(), 3);
        assert_eq!(folds[2].train_start, 60);
        assert!(folds[0].test_end < folds[1].test_start);
    }

    #[test]
    fn step_shorter_than_test_is_rejected() {
        let config = WalkForwardConfig {
            train_size: 200,
            test_size: 50,
            step: Some(10),
        };
        assert!(matches!(
            make_folds(400, &config),
            Err(WalkForwardError::InvalidParameter { name: "step", .. })
        ));
    }

    #[test]
    fn too_few_candles_is_insufficient() {
        let err = make_folds(50, &WalkForwardConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            WalkForwardError::InsufficientData {
                total: 50,
                required: 300
            }
        ));
    }

    #[test]
    fn zero_sizes_rejected() {
        let config = WalkForwardConfig {
            test_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            make_folds(1_000, &config),
            Err(WalkForwardError::InvalidParameter { name: "test_size", .. })
        ));
    }
}
