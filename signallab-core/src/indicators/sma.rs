//! Simple Moving Average (SMA).
//!
//! Arithmetic mean of each trailing window of `period` prices.
//! Output length: n - period + 1 (first value covers inputs 0..period).

use super::{ensure_finite, ensure_len, validate_period, Indicator, IndicatorError};

#[derive(Debug, Clone, PartialEq)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        validate_period(period)?;
        Ok(Self {
            period,
            name: format!("sma_{period}"),
        })
    }
}

impl Indicator for Sma {
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

        // Each window is summed on its own: identical windows always produce
        // bit-identical means, which a running sum cannot promise.
        let divisor = self.period as f64;
        Ok(prices
            .windows(self.period)
            .map(|w| w.iter().sum::<f64>() / divisor)
            .collect())
    }

    fn with_period(&self, period: usize) -> Result<Self, IndicatorError> {
        Self::new(period)
    }
}
