//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! The first candle has no previous close, so TR[0] = high - low.
//! ATR[0] = mean(TR[0..period]); afterwards Wilder smoothing:
//! ATR[t] = (ATR[t-1] * (period-1) + TR[t]) / period.
//! Output length: n - period + 1.

use super::{ensure_len, validate_period, Indicator, IndicatorError};

#[derive(Debug, Clone, PartialEq)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        validate_period(period)?;
        Ok(Self {
            period,
            name: format!("atr_{period}"),
        })
    }

    /// Compute ATR from separate high, low and close columns.
    pub fn calculate_hlc(
        &self,
        highs: &[f64],
        lows: &[f64],
        closes: &[f64],
    ) -> Result<Vec<f64>, IndicatorError> {
        let tr = true_range(highs, lows, closes)?;
        ensure_len(&self.name, self.period, tr.len())?;
        Ok(wilder_smooth(&tr, self.period))
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn period(&self) -> usize {
        self.period
    }

    /// Measured in candles; the flat input needs three values per candle.
    fn min_input_len(&self) -> usize {
        self.period
    }

    /// Flat interleaved input: `[h0, l0, c0, h1, l1, c1, ...]`.
    fn calculate(&self, prices: &[f64]) -> Result<Vec<f64>, IndicatorError> {
        if prices.len() % 3 != 0 {
            let n = prices.len();
            return Err(IndicatorError::MismatchedLength {
                highs: n.div_ceil(3),
                lows: (n + 1) / 3,
                closes: n / 3,
            });
        }
        let highs: Vec<f64> = prices.iter().step_by(3).copied().collect();
        let lows: Vec<f64> = prices.iter().skip(1).step_by(3).copied().collect();
        let closes: Vec<f64> = prices.iter().skip(2).step_by(3).copied().collect();
        self.calculate_hlc(&highs, &lows, &closes)
    }

    fn with_period(&self, period: usize) -> Result<Self, IndicatorError> {
        Self::new(period)
    }
}

/// Compute the True Range series.
///
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Result<Vec<f64>, IndicatorError> {
    if highs.len() != lows.len() || lows.len() != closes.len() {
        return Err(IndicatorError::MismatchedLength {
            highs: highs.len(),
            lows: lows.len(),
            closes: closes.len(),
        });
    }
    // Report the candle index, not the column offset.
    for i in 0..highs.len() {
        if !highs[i].is_finite() || !lows[i].is_finite() || !closes[i].is_finite() {
            return Err(IndicatorError::MalformedInput { index: i });
        }
    }

    let mut tr = Vec::with_capacity(highs.len());
    for i in 0..highs.len() {
        let (h, l) = (highs[i], lows[i]);
        if i == 0 {
            tr.push(h - l);
        } else {
            let pc = closes[i - 1];
            tr.push((h - l).max((h - pc).abs()).max((l - pc).abs()));
        }
    }
    Ok(tr)
}

/// Wilder smoothing (recursive average with weight 1/period).
///
/// Seed: mean of the first `period` values. Output length n - period + 1;
/// empty when the input is shorter than `period`.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let p = period as f64;
    let mut result = Vec::with_capacity(values.len() - period + 1);
    let mut prev = values[..period].iter().sum::<f64>() / p;
    result.push(prev);
    for &v in &values[period..] {
        prev = (prev * (p - 1.0) + v) / p;
        result.push(prev);
    }
    result
}
