//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Seed: simple mean of the first `period` gains/losses.
//! Output length: n - period.
//! Edge case: avg_loss == 0 → RSI saturates at 100.

use super::atr::wilder_smooth;
use super::{ensure_finite, ensure_len, validate_period, Indicator, IndicatorError};

#[derive(Debug, Clone, PartialEq)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        validate_period(period)?;
        Ok(Self {
            period,
            name: format!("rsi_{period}"),
        })
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn period(&self) -> usize {
        self.period
    }

    fn min_input_len(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, prices: &[f64]) -> Result<Vec<f64>, IndicatorError> {
        ensure_len(&self.name, self.min_input_len(), prices.len())?;
        ensure_finite(prices)?;

        let (gains, losses): (Vec<f64>, Vec<f64>) = prices
            .windows(2)
            .map(|w| {
                let change = w[1] - w[0];
                (change.max(0.0), (-change).max(0.0))
            })
            .unzip();

        let avg_gains = wilder_smooth(&gains, self.period);
        let avg_losses = wilder_smooth(&losses, self.period);

        Ok(avg_gains
            .iter()
            .zip(&avg_losses)
            .map(|(&g, &l)| compute_rsi(g, l))
            .collect())
    }

    fn with_period(&self, period: usize) -> Result<Self, IndicatorError> {
        Self::new(period)
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
