//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = EMA[t-1] + multiplier * (price[t] - EMA[t-1])
//! Seed: EMA[0] = price[0].
//! Multiplier: smoothing / (period + 1), i.e. 2 / (period + 1) by default.
//! Output length: n.

use super::{ensure_finite, ensure_len, validate_period, Indicator, IndicatorError};

/// Default smoothing constant.
pub const DEFAULT_SMOOTHING: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Ema {
    period: usize,
    smoothing: f64,
    multiplier: f64,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Self::with_smoothing(period, DEFAULT_SMOOTHING)
    }

    pub fn with_smoothing(period: usize, smoothing: f64) -> Result<Self, IndicatorError> {
        validate_period(period)?;
        if !smoothing.is_finite() || smoothing <= 0.0 {
            return Err(IndicatorError::InvalidParameter {
                name: "smoothing",
                reason: format!("must be finite and > 0, got {smoothing}"),
            });
        }
        let multiplier = smoothing / (period as f64 + 1.0);
        if multiplier > 1.0 {
            return Err(IndicatorError::InvalidParameter {
                name: "smoothing",
                reason: format!(
                    "multiplier {multiplier} exceeds 1 for period {period}; smoothing must be <= {}",
                    period + 1
                ),
            });
        }
        Ok(Self {
            period,
            smoothing,
            multiplier,
            name: format!("ema_{period}"),
        })
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn period(&self) -> usize {
        self.period
    }

    fn min_input_len(&self) -> usize {
        self.period
    }

    fn calculate(&self, prices: &[f64]) -> Result<Vec<f64>, IndicatorError> {
        ensure_len(&self.name, self.period, prices.len())?;
        ensure_finite(prices)?;

        let mut result = Vec::with_capacity(prices.len());
        let mut prev = prices[0];
        result.push(prev);
        for &price in &prices[1..] {
            prev += self.multiplier * (price - prev);
            result.push(prev);
        }
        Ok(result)
    }

    fn with_period(&self, period: usize) -> Result<Self, IndicatorError> {
        Self::with_smoothing(period, self.smoothing)
    }
}
