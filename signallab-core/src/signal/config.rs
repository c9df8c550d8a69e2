//! Signal processor configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PriceSource;
use crate::indicators::IndicatorError;

/// How fast/slow moving averages are turned into a direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalMode {
    /// Fire only on the bar where fast crosses slow.
    #[default]
    Crossover,
    /// Fire while fast is on one side of slow and moving away in that direction.
    Trend,
    /// Crossover first; otherwise trend at reduced confidence.
    Combined,
}

/// Tunable constants of the confidence score.
///
/// confidence = min(1, |fast - slow| / last_price * scale + base)
///
/// In combined mode a trend fallback is further multiplied by `trend_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceModel {
    pub base: f64,
    pub scale: f64,
    pub trend_factor: f64,
}

impl Default for ConfidenceModel {
    fn default() -> Self {
        Self {
            base: 0.5,
            scale: 10.0,
            trend_factor: 0.6,
        }
    }
}

impl ConfidenceModel {
    /// Raw score for a fast/slow separation at `last_price`, clamped to [0, 1].
    pub fn score(&self, fast: f64, slow: f64, last_price: f64) -> f64 {
        let distance = if last_price != 0.0 {
            (fast - slow).abs() / last_price.abs() * self.scale
        } else {
            0.0
        };
        (distance + self.base).clamp(0.0, 1.0)
    }
}

/// Configuration for one signal processor instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub price_source: PriceSource,
    pub mode: SignalMode,
    pub use_exponential: bool,
    /// Minimum fast/slow spread, in percent of the slow value.
    pub min_change_percent: f64,
    pub confidence_threshold: f64,
    pub confidence: ConfidenceModel,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            fast_period: 10,
            slow_period: 30,
            price_source: PriceSource::Close,
            mode: SignalMode::Crossover,
            use_exponential: false,
            min_change_percent: 0.0,
            confidence_threshold: 0.0,
            confidence: ConfidenceModel::default(),
        }
    }
}

impl SignalConfig {
    /// Number of candles a window must hold before any signal can fire.
    pub fn required_candles(&self) -> usize {
        self.slow_period + 1
    }

    pub fn validate(&self) -> Result<(), SignalError> {
        if self.fast_period < 1 {
            return Err(invalid("fast_period", format!("must be >= 1, got {}", self.fast_period)));
        }
        if self.slow_period <= self.fast_period {
            return Err(invalid(
                "slow_period",
                format!(
                    "must be > fast_period ({}), got {}",
                    self.fast_period, self.slow_period
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(invalid(
                "confidence_threshold",
                format!("must be within [0, 1], got {}", self.confidence_threshold),
            ));
        }
        if !self.min_change_percent.is_finite() || self.min_change_percent < 0.0 {
            return Err(invalid(
                "min_change_percent",
                format!("must be finite and >= 0, got {}", self.min_change_percent),
            ));
        }
        let c = &self.confidence;
        if !c.base.is_finite() || c.base < 0.0 {
            return Err(invalid("confidence.base", format!("must be finite and >= 0, got {}", c.base)));
        }
        if !c.scale.is_finite() || c.scale < 0.0 {
            return Err(invalid("confidence.scale", format!("must be finite and >= 0, got {}", c.scale)));
        }
        if !(0.0..=1.0).contains(&c.trend_factor) {
            return Err(invalid(
                "confidence.trend_factor",
                format!("must be within [0, 1], got {}", c.trend_factor),
            ));
        }
        Ok(())
    }
}

/// Errors raised by the signal processor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("malformed input: non-finite price at window index {index}")]
    MalformedInput { index: usize },
    #[error("indicator error: {0}")]
    Indicator(#[from] IndicatorError),
}

fn invalid(name: &'static str, reason: String) -> SignalError {
    SignalError::InvalidParameter { name, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SignalConfig::default().validate().is_ok());
        assert_eq!(SignalConfig::default().required_candles(), 31);
    }

    #[test]
    fn slow_must_exceed_fast() {
        let config = SignalConfig {
            fast_period: 20,
            slow_period: 20,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SignalError::InvalidParameter { name: "slow_period", .. })
        ));
    }

    #[test]
    fn zero_fast_period_rejected() {
        let config = SignalConfig {
            fast_period: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let config = SignalConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = SignalConfig {
            confidence_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn confidence_score_is_clamped() {
        let model = ConfidenceModel::default();
        // 1 / 100 * 10 + 0.5 = 0.6
        assert!((model.score(101.0, 100.0, 100.0) - 0.6).abs() < 1e-12);
        assert_eq!(model.score(150.0, 100.0, 100.0), 1.0);
        assert_eq!(model.score(100.0, 100.0, 100.0), 0.5);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: SignalConfig =
            serde_json::from_str(r#"{"fast_period": 5, "mode": "combined"}"#).unwrap();
        assert_eq!(config.fast_period, 5);
        assert_eq!(config.slow_period, 30);
        assert_eq!(config.mode, SignalMode::Combined);
        assert_eq!(config.confidence, ConfidenceModel::default());
    }
}
