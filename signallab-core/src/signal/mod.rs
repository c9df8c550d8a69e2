//! Signal processor — turns a candle window into a buy/sell/hold signal.
//!
//! Fast and slow moving averages (simple or exponential) are computed over
//! the configured price source and compared at the last two points. Three
//! closed modes are supported: [`SignalMode::Crossover`],
//! [`SignalMode::Trend`] and [`SignalMode::Combined`]. Candidates whose
//! confidence or fast/slow spread falls short of the configured minimums are
//! demoted to hold.

pub mod config;
pub mod processor;

pub use config::{ConfidenceModel, SignalConfig, SignalError, SignalMode};
pub use processor::{process_signal, SignalProcessor};
