//! SignalLab Core — indicators, signal processor, backtest engine, performance analyzer.
//!
//! This crate is the deterministic heart of SignalLab:
//! - Domain types (candles, signals, positions, trades, equity points)
//! - Indicator library (SMA, EMA, RSI, ATR) as immutable value objects
//! - Moving-average signal processor with crossover, trend and combined modes
//! - Sliding-window, single-position backtest engine with fees and slippage
//! - Performance analyzer reducing a run to summary statistics
//!
//! Everything here is single-threaded and free of clocks and randomness:
//! identical inputs give byte-identical serialized results.
//!
//! Collaborator boundary: [`run_backtest`], [`compute_indicator`] and
//! [`process_signal`].

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod metrics;
pub mod signal;

pub use engine::{run_backtest, BacktestConfig, BacktestResult, EngineError, TradingMode};
pub use indicators::{compute_indicator, IndicatorKind, IndicatorParams};
pub use metrics::{PerformanceMetrics, Timeframe};
pub use signal::{process_signal, SignalConfig, SignalMode};
