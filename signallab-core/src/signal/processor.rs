//! Moving-average signal processor — crossover and trend classification.
//!
//! Classifies the latest point of a candle window. Let `f0, f1` be the last
//! two fast values and `s0, s1` the last two slow values (`f1`, `s1` most
//! recent):
//! - Crossover: Buy when `f1 > s1 && f0 <= s0`, Sell when `f1 < s1 && f0 >= s0`.
//! - Trend: Buy when `f1 > s1 && f1 > f0`, Sell when `f1 < s1 && f1 < f0`.
//! - Combined: crossover, else trend at `trend_factor` confidence.
//!
//! `f1 == s1` never classifies. The processor keeps no state between calls.

use crate::domain::{prices, Candle, Signal, SignalDirection};
use crate::indicators::{Ema, Indicator, IndicatorError, Sma};

use super::config::{SignalConfig, SignalError, SignalMode};

/// Classify the latest point of `window` under `config`.
///
/// Returns a hold signal (never an error) when the window is shorter than
/// `slow_period + 1`; returns an error for an invalid configuration or a
/// non-finite price.
pub fn process_signal(window: &[Candle], config: &SignalConfig) -> Result<Signal, SignalError> {
    SignalProcessor::new(config.clone())?.process(window)
}

/// Moving average flavour selected by `use_exponential`.
#[derive(Debug, Clone, PartialEq)]
enum MovingAverage {
    Simple(Sma),
    Exponential(Ema),
}

impl MovingAverage {
    fn build(period: usize, exponential: bool) -> Result<Self, IndicatorError> {
        if exponential {
            Ok(Self::Exponential(Ema::new(period)?))
        } else {
            Ok(Self::Simple(Sma::new(period)?))
        }
    }

    fn calculate(&self, values: &[f64]) -> Result<Vec<f64>, IndicatorError> {
        match self {
            Self::Simple(sma) => sma.calculate(values),
            Self::Exponential(ema) => ema.calculate(values),
        }
    }
}

/// Per-run signal processor built from a validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalProcessor {
    config: SignalConfig,
    fast: MovingAverage,
    slow: MovingAverage,
}

/// Mode output before confidence filtering.
struct Candidate {
    direction: SignalDirection,
    confidence: f64,
    reason: String,
}

impl SignalProcessor {
    pub fn new(config: SignalConfig) -> Result<Self, SignalError> {
        config.validate()?;
        let fast = MovingAverage::build(config.fast_period, config.use_exponential)?;
        let slow = MovingAverage::build(config.slow_period, config.use_exponential)?;
        Ok(Self { config, fast, slow })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn process(&self, window: &[Candle]) -> Result<Signal, SignalError> {
        let timestamp = window.last().map(|c| c.timestamp);
        let required = self.config.required_candles();
        if window.len() < required {
            return Ok(Signal::no_signal(
                format!(
                    "insufficient data: need {required} candles, have {}",
                    window.len()
                ),
                timestamp,
            ));
        }

        let values = prices(window, self.config.price_source);
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(SignalError::MalformedInput { index });
        }

        let fast = self.fast.calculate(&values)?;
        let slow = self.slow.calculate(&values)?;
        let (f0, f1) = last_two(&fast);
        let (s0, s1) = last_two(&slow);
        let last_price = values[values.len() - 1];

        let mut signal = Signal {
            direction: SignalDirection::Hold,
            raw_direction: SignalDirection::Hold,
            confidence: 0.0,
            reason: String::new(),
            fast_value: Some(f1),
            slow_value: Some(s1),
            timestamp,
        };

        let Some(candidate) = self.classify(f0, f1, s0, s1, last_price) else {
            signal.reason = self.hold_reason(f1, s1);
            return Ok(signal);
        };

        signal.raw_direction = candidate.direction;
        signal.confidence = candidate.confidence;

        let spread_pct = if s1 != 0.0 {
            (f1 - s1).abs() / s1.abs() * 100.0
        } else {
            0.0
        };

        if candidate.confidence < self.config.confidence_threshold {
            signal.reason = format!(
                "{}; demoted to hold: confidence {:.4} below threshold {:.4}",
                candidate.reason, candidate.confidence, self.config.confidence_threshold
            );
        } else if spread_pct < self.config.min_change_percent {
            signal.reason = format!(
                "{}; demoted to hold: spread {:.4}% below minimum {:.4}%",
                candidate.reason, spread_pct, self.config.min_change_percent
            );
        } else {
            signal.direction = candidate.direction;
            signal.reason = candidate.reason;
        }
        Ok(signal)
    }

    fn classify(&self, f0: f64, f1: f64, s0: f64, s1: f64, last_price: f64) -> Option<Candidate> {
        let score = self.config.confidence.score(f1, s1, last_price);
        match self.config.mode {
            SignalMode::Crossover => crossover(f0, f1, s0, s1).map(|d| Candidate {
                direction: d,
                confidence: score,
                reason: crossover_reason(d),
            }),
            SignalMode::Trend => trend(f0, f1, s1).map(|d| Candidate {
                direction: d,
                confidence: score,
                reason: trend_reason(d),
            }),
            SignalMode::Combined => match crossover(f0, f1, s0, s1) {
                Some(d) => Some(Candidate {
                    direction: d,
                    confidence: score,
                    reason: crossover_reason(d),
                }),
                None => trend(f0, f1, s1).map(|d| Candidate {
                    direction: d,
                    confidence: score * self.config.confidence.trend_factor,
                    reason: format!("{} (no crossover)", trend_reason(d)),
                }),
            },
        }
    }

    fn hold_reason(&self, f1: f64, s1: f64) -> String {
        if f1 == s1 {
            return "fast equals slow".to_string();
        }
        match self.config.mode {
            SignalMode::Crossover => "no crossover".to_string(),
            SignalMode::Trend => "no trend".to_string(),
            SignalMode::Combined => "no crossover or trend".to_string(),
        }
    }
}

fn last_two(series: &[f64]) -> (f64, f64) {
    let n = series.len();
    (series[n - 2], series[n - 1])
}

fn crossover(f0: f64, f1: f64, s0: f64, s1: f64) -> Option<SignalDirection> {
    if f1 > s1 && f0 <= s0 {
        Some(SignalDirection::Buy)
    } else if f1 < s1 && f0 >= s0 {
        Some(SignalDirection::Sell)
    } else {
        None
    }
}

fn trend(f0: f64, f1: f64, s1: f64) -> Option<SignalDirection> {
    if f1 > s1 && f1 > f0 {
        Some(SignalDirection::Buy)
    } else if f1 < s1 && f1 < f0 {
        Some(SignalDirection::Sell)
    } else {
        None
    }
}

fn crossover_reason(direction: SignalDirection) -> String {
    match direction {
        SignalDirection::Buy => "bullish crossover: fast crossed above slow".to_string(),
        _ => "bearish crossover: fast crossed below slow".to_string(),
    }
}

fn trend_reason(direction: SignalDirection) -> String {
    match direction {
        SignalDirection::Buy => "bullish trend: fast above slow and rising".to_string(),
        _ => "bearish trend: fast below slow and falling".to_string(),
    }
}
