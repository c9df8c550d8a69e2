//! Backtesting engine — sliding-window, single-position simulation.
//!
//! For each candle `i` from `window_size` onwards the engine hands the
//! preceding `window_size` candles to the signal processor and acts on the
//! result at candle `i`'s fill price:
//!
//! 1. Opposite position open: close it
//! 2. Flat and the mode allows the direction: open a new position
//! 3. Mark-to-market at candle `i`'s close and append an equity point
//!
//! A position still open after the last candle is liquidated at its close.

pub mod config;
pub mod run;

pub use config::{BacktestConfig, TradingMode};
pub use run::{run_backtest, BacktestResult};

use thiserror::Error;

use crate::signal::SignalError;

/// Errors that abort a backtest before or during simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("malformed candle at index {index}: {reason}")]
    MalformedCandle { index: usize, reason: String },
    #[error("signal error: {0}")]
    Signal(#[from] SignalError),
}
