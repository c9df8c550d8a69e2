//! Domain types for SignalLab

pub mod candle;
pub mod position;
pub mod signal;
pub mod trade;

pub use candle::{prices, Candle, PriceSource};
pub use position::{Position, PositionSide};
pub use signal::{Signal, SignalDirection, SignalRecord};
pub use trade::{ExitReason, Trade};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mark-to-market snapshot taken once per processed candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}
