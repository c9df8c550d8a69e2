use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Side of an open position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
    #[default]
    None,
}

impl PositionSide {
    /// +1 for long, -1 for short, 0 when flat.
    pub fn sign(self) -> f64 {
        match self {
            PositionSide::Long => 1.0,
            PositionSide::Short => -1.0,
            PositionSide::None => 0.0,
        }
    }
}

/// Position tracking for the single-position engine.
///
/// `entry_price` is the slippage-adjusted fill price; `entry_fee` is the fee
/// paid on that fill and is charged to the trade when it closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: PositionSide,
    pub entry_price: f64,
    pub size: f64,
    pub opened_at: Option<DateTime<Utc>>,
    pub entry_index: usize,
    pub entry_fee: f64,
}

impl Position {
    pub fn flat() -> Self {
        Self {
            side: PositionSide::None,
            entry_price: 0.0,
            size: 0.0,
            opened_at: None,
            entry_index: 0,
            entry_fee: 0.0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.side == PositionSide::None
    }

    pub fn is_long(&self) -> bool {
        self.side == PositionSide::Long
    }

    pub fn is_short(&self) -> bool {
        self.side == PositionSide::Short
    }

    pub fn unrealized_pnl(&self, mark_price: f64) -> f64 {
        self.side.sign() * self.size * (mark_price - self.entry_price)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::flat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(side: PositionSide) -> Position {
        Position {
            side,
            entry_price: 100.0,
            size: 10.0,
            opened_at: None,
            entry_index: 3,
            entry_fee: 1.0,
        }
    }

    #[test]
    fn flat_has_no_exposure() {
        let p = Position::flat();
        assert!(p.is_flat());
        assert_eq!(p.unrealized_pnl(250.0), 0.0);
    }

    #[test]
    fn long_gains_when_price_rises() {
        assert_eq!(open(PositionSide::Long).unrealized_pnl(105.0), 50.0);
    }

    #[test]
    fn short_gains_when_price_falls() {
        let p = open(PositionSide::Short);
        assert!(p.is_short());
        assert_eq!(p.unrealized_pnl(95.0), 50.0);
        assert_eq!(p.unrealized_pnl(110.0), -100.0);
    }
}
