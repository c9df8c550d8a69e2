//! SignalLab Runner — parameter sweeps, walk-forward validation, trade-order robustness.
//!
//! This crate builds on `signallab-core` to provide:
//! - Grid sweeps of signal parameters on a bounded worker pool, with
//!   cooperative cancellation and deadlines
//! - Ranking of sweep results by a selectable metric
//! - Walk-forward validation with capital chained across out-of-sample folds
//! - Trade-order reshuffle for drawdown robustness
//! - Seeded synthetic candle generation
//! - TOML configuration for all of the above
//!
//! Parallel results are independent of the worker count: every unit reads
//! shared immutable inputs and derives any randomness from its own seed.

pub mod config;
pub mod ranking;
pub mod reshuffle;
pub mod rng;
pub mod sweep;
pub mod synthetic;
pub mod walk_forward;

pub use config::{ConfigError, RunnerConfig, SweepSection};
pub use ranking::RankingMetric;
pub use reshuffle::{run_reshuffle, ReshuffleConfig, ReshuffleError, ReshuffleReport};
pub use rng::RngHierarchy;
pub use sweep::{
    run_sweep, ParamGrid, SweepEntry, SweepError, SweepFailure, SweepOptions, SweepReport,
};
pub use synthetic::{generate_candles, SyntheticConfig};
pub use walk_forward::{
    make_folds, run_walk_forward, FoldResult, FoldSpec, WalkForwardConfig, WalkForwardError,
    WalkForwardReport,
};
