//! Ranking metric — configurable selector for ordering sweep results.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use signallab_core::metrics::PerformanceMetrics;

/// Which metric to rank by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMetric {
    #[default]
    TotalPnl,
    TotalReturn,
    SharpeRatio,
    SortinoRatio,
    WinRate,
    ProfitFactor,
    MaxDrawdown,
}

impl RankingMetric {
    /// Extract the ranked value from a metrics struct.
    pub fn extract(&self, metrics: &PerformanceMetrics) -> f64 {
        match self {
            Self::TotalPnl => metrics.total_pnl,
            Self::TotalReturn => metrics.total_return,
            Self::SharpeRatio => metrics.sharpe_ratio,
            Self::SortinoRatio => metrics.sortino_ratio,
            Self::WinRate => metrics.win_rate,
            Self::ProfitFactor => metrics.profit_factor,
            Self::MaxDrawdown => metrics.max_drawdown,
        }
    }

    /// Drawdown is a positive fraction, so smaller is better; everything
    /// else ranks higher-is-better.
    pub fn is_higher_better(&self) -> bool {
        !matches!(self, Self::MaxDrawdown)
    }

    /// Ordering that puts the better of `a` and `b` first.
    ///
    /// NaN always ranks last.
    pub fn compare(&self, a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) if self.is_higher_better() => b.total_cmp(&a),
            (false, false) => a.total_cmp(&b),
        }
    }

    /// Returns true if `a` is strictly better than `b`.
    pub fn is_better(&self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}
