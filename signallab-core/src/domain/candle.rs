//! Candle — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single period.
///
/// Sequences handed to the engine must be ordered by non-decreasing
/// `timestamp` and contain only finite values. The core never mutates a candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Name of the first non-finite OHLCV field, if any.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }

    /// Returns true if every OHLCV field is finite.
    pub fn is_finite(&self) -> bool {
        self.non_finite_field().is_none()
    }

    /// Price for the given source column.
    pub fn price(&self, source: PriceSource) -> f64 {
        match source {
            PriceSource::Open => self.open,
            PriceSource::High => self.high,
            PriceSource::Low => self.low,
            PriceSource::Close => self.close,
        }
    }
}

/// Which candle column feeds an indicator or a simulated fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Open,
    High,
    Low,
    #[default]
    Close,
}

/// Extract one price column from a candle slice.
pub fn prices(candles: &[Candle], source: PriceSource) -> Vec<f64> {
    candles.iter().map(|c| c.price(source)).collect()
}
