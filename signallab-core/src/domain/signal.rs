//! Signal — the classified output of one processed candle window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trading direction of a signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalDirection {
    Sell,
    #[default]
    Hold,
    Buy,
}

impl SignalDirection {
    /// Numeric encoding: sell = -1, hold = 0, buy = 1.
    pub fn as_i8(self) -> i8 {
        match self {
            SignalDirection::Sell => -1,
            SignalDirection::Hold => 0,
            SignalDirection::Buy => 1,
        }
    }

    pub fn is_actionable(self) -> bool {
        self != SignalDirection::Hold
    }
}

/// Classification of the latest point of a candle window.
///
/// `raw_direction` is what the mode logic produced; `direction` is what the
/// engine acts on. They differ only when a candidate was demoted to hold by
/// the confidence or minimum-change filters, in which case `reason` says so.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: SignalDirection,
    pub raw_direction: SignalDirection,
    pub confidence: f64,
    pub reason: String,
    pub fast_value: Option<f64>,
    pub slow_value: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Signal {
    /// Hold signal carrying no indicator values (e.g. window too short).
    pub fn no_signal(reason: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            direction: SignalDirection::Hold,
            raw_direction: SignalDirection::Hold,
            confidence: 0.0,
            reason: reason.into(),
            fast_value: None,
            slow_value: None,
            timestamp,
        }
    }

    pub fn is_demoted(&self) -> bool {
        self.raw_direction.is_actionable() && !self.direction.is_actionable()
    }
}

/// An actionable signal tagged with the candle index it was acted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub index: usize,
    pub signal: Signal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_encoding() {
        assert_eq!(SignalDirection::Sell.as_i8(), -1);
        assert_eq!(SignalDirection::Hold.as_i8(), 0);
        assert_eq!(SignalDirection::Buy.as_i8(), 1);
    }

    #[test]
    fn no_signal_is_hold_with_zero_confidence() {
        let s = Signal::no_signal("insufficient data", None);
        assert_eq!(s.direction, SignalDirection::Hold);
        assert_eq!(s.confidence, 0.0);
        assert!(s.fast_value.is_none());
        assert!(!s.is_demoted());
    }

    #[test]
    fn demotion_detected_from_raw_direction() {
        let mut s = Signal::no_signal("below threshold", None);
        s.raw_direction = SignalDirection::Buy;
        assert!(s.is_demoted());
    }
}
