//! Indicator selection by kind — the boundary used by collaborators that
//! pick an indicator at runtime (strategy plugins, reporting).

use serde::{Deserialize, Serialize};

use super::{Atr, Ema, Indicator, IndicatorError, Rsi, Sma};

/// Closed set of supported indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    /// Expects flat `[h, l, c, h, l, c, ...]` input.
    Atr,
}

/// Parameters for `compute_indicator`.
///
/// `smoothing` is only read by EMA; `None` means the default of 2.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub period: usize,
    #[serde(default)]
    pub smoothing: Option<f64>,
}

impl IndicatorParams {
    pub fn period(period: usize) -> Self {
        Self {
            period,
            smoothing: None,
        }
    }
}

/// Build the requested indicator and run it over `prices`.
pub fn compute_indicator(
    kind: IndicatorKind,
    params: &IndicatorParams,
    prices: &[f64],
) -> Result<Vec<f64>, IndicatorError> {
    match kind {
        IndicatorKind::Sma => Sma::new(params.period)?.calculate(prices),
        IndicatorKind::Ema => match params.smoothing {
            Some(smoothing) => Ema::with_smoothing(params.period, smoothing)?.calculate(prices),
            None => Ema::new(params.period)?.calculate(prices),
        },
        IndicatorKind::Rsi => Rsi::new(params.period)?.calculate(prices),
        IndicatorKind::Atr => Atr::new(params.period)?.calculate(prices),
    }
}
