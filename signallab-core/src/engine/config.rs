//! Backtest configuration and fingerprinting.

use serde::{Deserialize, Serialize};

use crate::domain::PriceSource;
use crate::metrics::Timeframe;
use crate::signal::SignalConfig;

use super::EngineError;

/// Which directions the engine may open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingMode {
    /// Sell signals only close longs.
    LongOnly,
    #[default]
    LongShort,
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub signal: SignalConfig,
    /// Candles handed to the signal processor per step.
    pub window_size: usize,
    pub initial_capital: f64,
    /// Fraction of notional charged on every fill.
    pub fee_rate: f64,
    /// Adverse fill adjustment: buys at `price * (1 + s)`, sells at `price * (1 - s)`.
    pub slippage_rate: f64,
    /// Fraction of equity allocated per position (default 1.0 = 100%).
    pub position_size_pct: f64,
    pub trading_mode: TradingMode,
    /// Price of the acting candle used for signal fills.
    pub fill_price: PriceSource,
    pub timeframe: Timeframe,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            signal: SignalConfig::default(),
            window_size: 50,
            initial_capital: 10_000.0,
            fee_rate: 0.001,
            slippage_rate: 0.0,
            position_size_pct: 1.0,
            trading_mode: TradingMode::LongShort,
            fill_price: PriceSource::Open,
            timeframe: Timeframe::Day1,
        }
    }
}

impl BacktestConfig {
    /// Reject a configuration before any simulation starts.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.window_size < 1 {
            return Err(invalid("window_size", format!("must be >= 1, got {}", self.window_size)));
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(invalid(
                "initial_capital",
                format!("must be finite and > 0, got {}", self.initial_capital),
            ));
        }
        if !(0.0..1.0).contains(&self.fee_rate) {
            return Err(invalid("fee_rate", format!("must be within [0, 1), got {}", self.fee_rate)));
        }
        if !(0.0..1.0).contains(&self.slippage_rate) {
            return Err(invalid(
                "slippage_rate",
                format!("must be within [0, 1), got {}", self.slippage_rate),
            ));
        }
        if !(self.position_size_pct > 0.0 && self.position_size_pct <= 1.0) {
            return Err(invalid(
                "position_size_pct",
                format!("must be within (0, 1], got {}", self.position_size_pct),
            ));
        }
        self.signal.validate()?;
        Ok(())
    }

    /// BLAKE3 hex digest of the canonical JSON serialization.
    ///
    /// Struct fields serialize in declaration order, so equal configs hash equally.
    pub fn config_hash(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}

fn invalid(name: &'static str, reason: String) -> EngineError {
    EngineError::InvalidParameter { name, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(BacktestConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_window_rejected() {
        let config = BacktestConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidParameter { name: "window_size", .. })
        ));
    }

    #[test]
    fn non_positive_capital_rejected() {
        for capital in [0.0, -100.0, f64::NAN] {
            let config = BacktestConfig {
                initial_capital: capital,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "capital {capital} accepted");
        }
    }

    #[test]
    fn rates_must_be_fractions() {
        let config = BacktestConfig {
            fee_rate: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = BacktestConfig {
            slippage_rate: -0.01,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = BacktestConfig {
            position_size_pct: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_signal_config_surfaces() {
        let mut config = BacktestConfig::default();
        config.signal.slow_period = config.signal.fast_period;
        assert!(matches!(config.validate(), Err(EngineError::Signal(_))));
    }

    #[test]
    fn config_hash_is_deterministic_and_sensitive() {
        let a = BacktestConfig::default();
        let b = BacktestConfig::default();
        assert_eq!(a.config_hash(), b.config_hash());
        assert_eq!(a.config_hash().len(), 64);

        let mut c = BacktestConfig::default();
        c.signal.fast_period = 11;
        assert_ne!(a.config_hash(), c.config_hash());
    }

    #[test]
    fn trading_mode_serialization() {
        let json = serde_json::to_string(&TradingMode::LongOnly).unwrap();
        assert_eq!(json, "\"long_only\"");
        let back: TradingMode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TradingMode::LongOnly);
    }
}
