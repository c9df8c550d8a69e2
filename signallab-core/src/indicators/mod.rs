//! Indicator library.
//!
//! Indicators are immutable value objects: parameters are fixed at
//! construction and validated there, `calculate` is a pure function of its
//! input slice, and `with_period` builds a new instance instead of mutating
//! the existing one. Output series are trimmed (no warmup padding):
//!
//! | indicator | minimum input | output length |
//! |-----------|---------------|---------------|
//! | SMA       | `period`      | `n - period + 1` |
//! | EMA       | `period`      | `n` |
//! | RSI       | `period + 1`  | `n - period` |
//! | ATR       | `period`      | `n - period + 1` |

pub mod atr;
pub mod ema;
pub mod kind;
pub mod rsi;
pub mod sma;

pub use atr::{true_range, wilder_smooth, Atr};
pub use ema::Ema;
pub use kind::{compute_indicator, IndicatorKind, IndicatorParams};
pub use rsi::Rsi;
pub use sma::Sma;

use thiserror::Error;

/// Errors raised by indicator construction and calculation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("insufficient data for {indicator}: need {required} values, got {actual}")]
    InsufficientData {
        indicator: String,
        required: usize,
        actual: usize,
    },
    #[error("malformed input: non-finite value at index {index}")]
    MalformedInput { index: usize },
    #[error("mismatched input lengths: high={highs}, low={lows}, close={closes}")]
    MismatchedLength {
        highs: usize,
        lows: usize,
        closes: usize,
    },
}

/// Trait for indicators over a numeric series.
///
/// # Look-ahead guard
/// Output value `k` depends only on inputs up to and including the input
/// index it is aligned with; truncating the input never changes earlier
/// outputs.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    fn period(&self) -> usize;

    /// Minimum input length accepted by `calculate`.
    fn min_input_len(&self) -> usize;

    /// Compute the indicator over the whole input.
    fn calculate(&self, prices: &[f64]) -> Result<Vec<f64>, IndicatorError>;

    /// A new instance with a different period and all other parameters kept.
    fn with_period(&self, period: usize) -> Result<Self, IndicatorError>
    where
        Self: Sized;
}

pub(crate) fn validate_period(period: usize) -> Result<(), IndicatorError> {
    if period < 1 {
        return Err(IndicatorError::InvalidParameter {
            name: "period",
            reason: format!("must be >= 1, got {period}"),
        });
    }
    Ok(())
}

pub(crate) fn ensure_len(indicator: &str, required: usize, actual: usize) -> Result<(), IndicatorError> {
    if actual < required {
        return Err(IndicatorError::InsufficientData {
            indicator: indicator.to_string(),
            required,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn ensure_finite(values: &[f64]) -> Result<(), IndicatorError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(IndicatorError::MalformedInput { index }),
        None => Ok(()),
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
