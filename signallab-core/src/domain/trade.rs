//! Trade — a closed round trip appended to the engine's ledger.

use super::position::PositionSide;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// An opposite signal closed the position.
    Signal,
    /// Forced liquidation at the final candle.
    EndOfData,
}

/// A complete round-trip trade: entry → exit.
///
/// Prices are fill prices (slippage already applied). `pnl` is net of both
/// the entry and exit fees; `gross_pnl` is before fees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub side: PositionSide,

    // ── Entry ──
    pub entry_index: usize,
    pub opened_at: Option<DateTime<Utc>>,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub closed_at: Option<DateTime<Utc>>,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    // ── Size ──
    pub size: f64,

    // ── PnL ──
    pub gross_pnl: f64,
    pub fees: f64,
    pub pnl: f64,
}

impl Trade {
    /// Return on the trade as a fraction of entry notional.
    pub fn return_pct(&self) -> f64 {
        let notional = self.entry_price * self.size;
        if notional == 0.0 {
            return 0.0;
        }
        self.pnl / notional
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_index.saturating_sub(self.entry_index)
    }
}
