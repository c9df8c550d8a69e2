//! Parameter sweep — grid search over signal parameters on a fixed worker pool.
//!
//! Every grid point is an independent unit: a full backtest over the shared,
//! read-only candle slice. Units run on a dedicated `rayon` pool of
//! `SweepOptions::workers` threads. Cancellation is cooperative: a unit checks
//! the cancel flag and the deadline before it starts, so in-flight units always
//! finish, and each unit's outcome is written to its own slot only once it
//! completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use signallab_core::domain::Candle;
use signallab_core::engine::{run_backtest, BacktestConfig, BacktestResult, EngineError};
use signallab_core::signal::SignalMode;

use crate::ranking::RankingMetric;

/// Parameter grid over the signal settings.
///
/// An empty axis keeps the base configuration's value for that parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    pub fast_periods: Vec<usize>,
    pub slow_periods: Vec<usize>,
    pub modes: Vec<SignalMode>,
    pub use_exponential: Vec<bool>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            fast_periods: vec![5, 10, 20],
            slow_periods: vec![20, 50, 100],
            modes: vec![SignalMode::Crossover],
            use_exponential: vec![false],
        }
    }
}

impl ParamGrid {
    /// Number of raw combinations, before skipping `fast >= slow`.
    pub fn size(&self) -> usize {
        self.fast_periods.len().max(1)
            * self.slow_periods.len().max(1)
            * self.modes.len().max(1)
            * self.use_exponential.len().max(1)
    }

    /// Expand the grid over `base`, in axis order (fast, slow, mode, exponential).
    ///
    /// Combinations with `fast >= slow` are skipped. `window_size` is raised
    /// to the slow period + 1 where the base window is too short.
    pub fn generate_configs(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        let fasts = axis(&self.fast_periods, base.signal.fast_period);
        let slows = axis(&self.slow_periods, base.signal.slow_period);
        let modes = axis(&self.modes, base.signal.mode);
        let exps = axis(&self.use_exponential, base.signal.use_exponential);

        let mut configs = Vec::new();
        for &fast in &fasts {
            for &slow in &slows {
                if fast >= slow {
                    continue;
                }
                for &mode in &modes {
                    for &use_exponential in &exps {
                        let mut config = base.clone();
                        config.signal.fast_period = fast;
                        config.signal.slow_period = slow;
                        config.signal.mode = mode;
                        config.signal.use_exponential = use_exponential;
                        config.window_size = config.window_size.max(config.signal.required_candles());
                        configs.push(config);
                    }
                }
            }
        }
        configs
    }
}

fn axis<T: Copy>(values: &[T], fallback: T) -> Vec<T> {
    if values.is_empty() {
        vec![fallback]
    } else {
        values.to_vec()
    }
}

/// Execution options for a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOptions {
    /// Worker threads; 0 lets rayon pick one per core.
    pub workers: usize,
    /// Units not started before this elapses are skipped.
    pub timeout: Option<Duration>,
    pub ranking: RankingMetric,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            timeout: None,
            ranking: RankingMetric::TotalPnl,
        }
    }
}

/// One completed grid point.
#[derive(Debug, Clone, Serialize)]
pub struct SweepEntry {
    /// Position in `ParamGrid::generate_configs` order.
    pub grid_index: usize,
    pub score: f64,
    pub config: BacktestConfig,
    pub result: BacktestResult,
}

/// A grid point whose backtest returned an error.
#[derive(Debug, Clone, Serialize)]
pub struct SweepFailure {
    pub grid_index: usize,
    pub config: BacktestConfig,
    pub error: String,
}

/// Outcome of a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// Best first; ties keep grid order.
    pub entries: Vec<SweepEntry>,
    pub failures: Vec<SweepFailure>,
    /// Units never started because of cancellation or timeout.
    pub skipped: usize,
    pub cancelled: bool,
    pub total_units: usize,
    pub ranking: RankingMetric,
}

impl SweepReport {
    pub fn best(&self) -> Option<&SweepEntry> {
        self.entries.first()
    }

    pub fn completed(&self) -> usize {
        self.entries.len() + self.failures.len()
    }
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("parameter grid produced no valid configurations")]
    EmptyGrid,
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Outcome slot of a single unit.
enum UnitOutcome {
    Skipped,
    Finished(Box<Result<BacktestResult, EngineError>>),
}

/// Run every grid configuration over `candles` and rank the results.
///
/// - `cancel`: optional flag; once set, units not yet started are skipped.
/// - `options.timeout`: same, measured from the call.
///
/// Results are independent of `options.workers`.
pub fn run_sweep(
    candles: &[Candle],
    base: &BacktestConfig,
    grid: &ParamGrid,
    options: &SweepOptions,
    cancel: Option<&AtomicBool>,
) -> Result<SweepReport, SweepError> {
    let configs = grid.generate_configs(base);
    if configs.is_empty() {
        return Err(SweepError::EmptyGrid);
    }

    let pool = build_pool(options.workers)?;
    let deadline = options.timeout.map(|t| Instant::now() + t);
    let stop = || {
        cancel.is_some_and(|f| f.load(Ordering::Relaxed))
            || deadline.is_some_and(|d| Instant::now() >= d)
    };

    info!(units = configs.len(), workers = pool.current_num_threads(), "sweep started");

    let outcomes: Vec<UnitOutcome> = pool.install(|| {
        configs
            .par_iter()
            .map(|config| {
                if stop() {
                    UnitOutcome::Skipped
                } else {
                    UnitOutcome::Finished(Box::new(run_backtest(candles, config)))
                }
            })
            .collect()
    });

    let total_units = configs.len();
    let mut entries = Vec::new();
    let mut failures = Vec::new();
    let mut skipped = 0;
    for (grid_index, (config, outcome)) in configs.into_iter().zip(outcomes).enumerate() {
        match outcome {
            UnitOutcome::Skipped => skipped += 1,
            UnitOutcome::Finished(result) => match *result {
                Ok(result) => entries.push(SweepEntry {
                    grid_index,
                    score: options.ranking.extract(&result.metrics),
                    config,
                    result,
                }),
                Err(err) => {
                    warn!(grid_index, error = %err, "sweep unit failed");
                    failures.push(SweepFailure {
                        grid_index,
                        config,
                        error: err.to_string(),
                    });
                }
            },
        }
    }

    entries.sort_by(|a, b| {
        options
            .ranking
            .compare(a.score, b.score)
            .then(a.grid_index.cmp(&b.grid_index))
    });

    let cancelled = skipped > 0 || cancel.is_some_and(|f| f.load(Ordering::Relaxed));
    info!(
        completed = entries.len(),
        failed = failures.len(),
        skipped,
        cancelled,
        "sweep finished"
    );

    Ok(SweepReport {
        entries,
        failures,
        skipped,
        cancelled,
        total_units,
        ranking: options.ranking,
    })
}

pub(crate) fn build_pool(workers: usize) -> Result<rayon::ThreadPool, SweepError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| SweepError::ThreadPool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{generate_candles, SyntheticConfig};

    fn base() -> BacktestConfig {
        BacktestConfig {
            window_size: 1,
            initial_capital: 10_000.0,
            ..Default::default()
        }
    }

    #[test]
    fn grid_size_counts_raw_combinations() {
        let grid = ParamGrid {
            fast_periods: vec![5, 10],
            slow_periods: vec![10, 20, 30],
            modes: vec![SignalMode::Crossover, SignalMode::Trend],
            use_exponential: vec![false],
        };
        assert_eq!(grid.size(), 12);
    }

    #[test]
    fn generate_configs_skips_fast_not_below_slow() {
        let grid = ParamGrid {
            fast_periods: vec![5, 10, 20],
            slow_periods: vec![10, 20],
            modes: vec![SignalMode::Crossover],
            use_exponential: vec![false],
        };
        let pairs: Vec<(usize, usize)> = grid
            .generate_configs(&base())
            .iter()
            .map(|c| (c.signal.fast_period, c.signal.slow_period))
            .collect();
        assert_eq!(pairs, vec![(5, 10), (5, 20), (10, 20)]);
    }

    #[test]
    fn generate_configs_widens_short_windows() {
        let grid = ParamGrid {
            fast_periods: vec![3],
            slow_periods: vec![40],
            ..Default::default()
        };
        let configs = grid.generate_configs(&base());
        assert_eq!(configs[0].window_size, 41);
    }

    #[test]
    fn empty_axes_fall_back_to_base() {
        let grid = ParamGrid {
            fast_periods: vec![],
            slow_periods: vec![],
            modes: vec![],
            use_exponential: vec![],
        };
        let configs = grid.generate_configs(&base());
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].signal, base().signal);
    }

    #[test]
    fn empty_grid_is_an_error() {
        let grid = ParamGrid {
            fast_periods: vec![50],
            slow_periods: vec![10],
            ..Default::default()
        };
        let candles = generate_candles(&SyntheticConfig::default());
        assert!(matches!(
            run_sweep(&candles, &base(), &grid, &SweepOptions::default(), None),
            Err(SweepError::EmptyGrid)
        ));
    }

    #[test]
    fn entries_are_ranked_best_first() {
        let candles = generate_candles(&SyntheticConfig {
            count: 300,
            ..Default::default()
        });
        let grid = ParamGrid {
            fast_periods: vec![3, 5, 8],
            slow_periods: vec![13, 21],
            modes: vec![SignalMode::Crossover, SignalMode::Combined],
            use_exponential: vec![false, true],
        };
        let options = SweepOptions {
            workers: 2,
            ..Default::default()
        };
        let report = run_sweep(&candles, &base(), &grid, &options, None).unwrap();
        assert_eq!(report.total_units, 24);
        assert_eq!(report.entries.len(), 24);
        assert!(!report.cancelled);
        for pair in report.entries.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].grid_index < pair[1].grid_index);
            }
        }
        let best = report.best().unwrap();
        assert_eq!(best.score, best.result.total_pnl);
    }
}
