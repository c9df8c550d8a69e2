//! Integration tests for the signal processor.
//!
//! Tests:
//! 1. A two-segment dataset (flat, then rising) crosses exactly once, at a
//!    known index, in crossover mode.
//! 2. The same data yields zero actionable signals at confidence threshold 1.0.
//! 3. Look-ahead: truncating the window never changes an earlier signal.
//! 4. Boundary behaviour of `process_signal` (short windows, bad configs).

use chrono::{DateTime, Duration, TimeZone, Utc};
use signallab_core::domain::{Candle, SignalDirection};
use signallab_core::engine::{run_backtest, BacktestConfig};
use signallab_core::signal::{process_signal, SignalConfig, SignalError, SignalMode};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

fn candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            Candle::new(base_time() + Duration::hours(i as i64), c, c + 0.5, c - 0.5, c, 10.0)
        })
        .collect()
}

/// 40 flat candles at 100, then 20 candles rising by 1.
fn flat_then_rising() -> Vec<f64> {
    let mut closes = vec![100.0; 40];
    closes.extend((1..=20).map(|k| 100.0 + k as f64));
    closes
}

fn crossover_config() -> SignalConfig {
    SignalConfig {
        fast_period: 5,
        slow_period: 20,
        mode: SignalMode::Crossover,
        ..Default::default()
    }
}

fn backtest_config(signal: SignalConfig) -> BacktestConfig {
    BacktestConfig {
        window_size: signal.required_candles(),
        signal,
        fee_rate: 0.0,
        ..Default::default()
    }
}

// ──────────────────────────────────────────────
// Engineered crossover
// ──────────────────────────────────────────────

#[test]
fn single_crossover_fires_once_at_known_index() {
    let data = candles(&flat_then_rising());
    let result = run_backtest(&data, &backtest_config(crossover_config())).unwrap();

    // The first rising candle (40) is the last candle of the window acted on at 41.
    assert_eq!(result.signals.len(), 1);
    let record = &result.signals[0];
    assert_eq!(record.index, 41);
    assert_eq!(record.signal.direction, SignalDirection::Buy);
    assert_eq!(record.signal.timestamp, Some(data[40].timestamp));
    assert!(record.signal.fast_value.unwrap() > record.signal.slow_value.unwrap());
}

#[test]
fn confidence_threshold_one_silences_every_signal() {
    let data = candles(&flat_then_rising());
    let signal = SignalConfig {
        confidence_threshold: 1.0,
        ..crossover_config()
    };
    let result = run_backtest(&data, &backtest_config(signal)).unwrap();
    assert!(result.signals.is_empty());
    assert!(result.trades.is_empty());
}

#[test]
fn demoted_crossover_keeps_raw_direction() {
    let data = candles(&flat_then_rising());
    let config = SignalConfig {
        confidence_threshold: 1.0,
        ..crossover_config()
    };
    let s = process_signal(&data[20..41], &config).unwrap();
    assert_eq!(s.direction, SignalDirection::Hold);
    assert_eq!(s.raw_direction, SignalDirection::Buy);
    assert!(s.reason.contains("demoted"));
}

#[test]
fn trend_mode_fires_throughout_the_rise() {
    let data = candles(&flat_then_rising());
    let signal = SignalConfig {
        mode: SignalMode::Trend,
        ..crossover_config()
    };
    let result = run_backtest(&data, &backtest_config(signal)).unwrap();
    // Every step whose window ends on a rising candle: indices 41..=59.
    assert_eq!(result.signals.len(), 19);
    assert!(result
        .signals
        .iter()
        .all(|r| r.signal.direction == SignalDirection::Buy));
}

// ──────────────────────────────────────────────
// Look-ahead
// ──────────────────────────────────────────────

#[test]
fn signal_depends_only_on_window() {
    let closes: Vec<f64> = (0..80)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0)
        .collect();
    let data = candles(&closes);
    let config = SignalConfig {
        fast_period: 3,
        slow_period: 8,
        mode: SignalMode::Combined,
        ..Default::default()
    };
    for end in 9..data.len() {
        let a = process_signal(&data[..end], &config).unwrap();
        let b = process_signal(&data[end - 9..end], &config).unwrap();
        assert_eq!(a.direction, b.direction, "divergence at {end}");
        assert_eq!(a.timestamp, b.timestamp);
    }
}

// ──────────────────────────────────────────────
// Boundary behaviour
// ──────────────────────────────────────────────

#[test]
fn short_window_returns_no_signal() {
    let data = candles(&[100.0; 10]);
    let s = process_signal(&data, &crossover_config()).unwrap();
    assert_eq!(s.direction, SignalDirection::Hold);
    assert!(s.reason.contains("need 21 candles, have 10"));
}

#[test]
fn invalid_threshold_fails_at_the_boundary() {
    let config = SignalConfig {
        confidence_threshold: -0.1,
        ..crossover_config()
    };
    let err = process_signal(&candles(&[100.0; 30]), &config).unwrap_err();
    assert!(matches!(
        err,
        SignalError::InvalidParameter {
            name: "confidence_threshold",
            ..
        }
    ));
}
