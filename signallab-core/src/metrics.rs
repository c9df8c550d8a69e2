//! Performance analyzer — pure reductions over a trade ledger and equity curve.
//!
//! Every metric is a pure function: equity values and/or trades in, scalar out.
//! Equity series passed to these functions start with the initial capital so
//! the first step's return and drawdown are counted.

use serde::{Deserialize, Serialize};

use crate::domain::{EquityPoint, Trade};

/// Candle interval, used to annualize risk-adjusted ratios.
///
/// Markets are assumed to trade around the clock (365 days per year).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Minute1,
    Minute5,
    Minute15,
    Hour1,
    Hour4,
    #[default]
    Day1,
    Week1,
}

impl Timeframe {
    pub fn periods_per_year(self) -> f64 {
        match self {
            Timeframe::Minute1 => 525_600.0,
            Timeframe::Minute5 => 105_120.0,
            Timeframe::Minute15 => 35_040.0,
            Timeframe::Hour1 => 8_760.0,
            Timeframe::Hour4 => 2_190.0,
            Timeframe::Day1 => 365.0,
            Timeframe::Week1 => 52.0,
        }
    }

    /// Wall-clock length of one candle.
    pub fn duration(self) -> chrono::Duration {
        match self {
            Timeframe::Minute1 => chrono::Duration::minutes(1),
            Timeframe::Minute5 => chrono::Duration::minutes(5),
            Timeframe::Minute15 => chrono::Duration::minutes(15),
            Timeframe::Hour1 => chrono::Duration::hours(1),
            Timeframe::Hour4 => chrono::Duration::hours(4),
            Timeframe::Day1 => chrono::Duration::days(1),
            Timeframe::Week1 => chrono::Duration::weeks(1),
        }
    }
}

/// Aggregate statistics for a single backtest run.
///
/// Serialize-only: an infinite `profit_factor` is written as `null` by JSON
/// serializers and cannot be read back as `f64`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub total_pnl: f64,
    pub total_return: f64,
    pub win_rate: f64,
    /// `+inf` when there are winners and no losers.
    pub profit_factor: f64,
    /// Positive fraction, e.g. 0.15 for a 15% decline from peak.
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub trade_count: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub gross_profit: f64,
    /// Sum of losing trade P&L; zero or negative.
    pub gross_loss: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    /// Fraction of processed steps that ended with an open position.
    pub exposure: f64,
}

impl PerformanceMetrics {
    /// Reduce a run to its summary statistics.
    ///
    /// `bars_in_market` is the number of equity points taken while a
    /// position was open.
    pub fn compute(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        initial_capital: f64,
        timeframe: Timeframe,
        bars_in_market: usize,
    ) -> Self {
        let equity = equity_values(equity_curve, initial_capital);
        let periods = timeframe.periods_per_year();
        let winners = trades.iter().filter(|t| t.pnl > 0.0).count();
        let losers = trades.iter().filter(|t| t.pnl < 0.0).count();
        let gross_profit = gross_profit(trades);
        let gross_loss = gross_loss(trades);

        Self {
            total_pnl: trades.iter().map(|t| t.pnl).sum(),
            total_return: total_return(&equity),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            max_drawdown: max_drawdown(&equity),
            sharpe_ratio: sharpe_ratio(&equity, periods),
            sortino_ratio: sortino_ratio(&equity, periods),
            trade_count: trades.len(),
            winning_trades: winners,
            losing_trades: losers,
            gross_profit,
            gross_loss,
            average_win: if winners > 0 {
                gross_profit / winners as f64
            } else {
                0.0
            },
            average_loss: if losers > 0 {
                gross_loss / losers as f64
            } else {
                0.0
            },
            max_consecutive_wins: max_consecutive(trades, true),
            max_consecutive_losses: max_consecutive(trades, false),
            exposure: if equity_curve.is_empty() {
                0.0
            } else {
                bars_in_market as f64 / equity_curve.len() as f64
            },
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// `[initial_capital, e_0, e_1, ...]`.
pub fn equity_values(equity_curve: &[EquityPoint], initial_capital: f64) -> Vec<f64> {
    std::iter::once(initial_capital)
        .chain(equity_curve.iter().map(|p| p.equity))
        .collect()
}

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity: &[f64]) -> f64 {
    match (equity.first(), equity.last()) {
        (Some(&initial), Some(&last)) if equity.len() >= 2 && initial > 0.0 => {
            (last - initial) / initial
        }
        _ => 0.0,
    }
}

/// Fraction of trades with positive net P&L.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

pub fn gross_profit(trades: &[Trade]) -> f64 {
    trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum()
}

pub fn gross_loss(trades: &[Trade]) -> f64 {
    trades.iter().filter(|t| t.pnl < 0.0).map(|t| t.pnl).sum()
}

/// Gross profit / |gross loss|.
///
/// `+inf` with profit and no losses; 0 with no trades or neither.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let profit = gross_profit(trades);
    let loss = gross_loss(trades).abs();
    if loss == 0.0 {
        return if profit > 0.0 { f64::INFINITY } else { 0.0 };
    }
    profit / loss
}

/// Largest decline from the running peak, as a positive fraction.
///
/// 0.0 for constant or monotonically increasing equity.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let Some(&first) = equity.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            max_dd = max_dd.max((peak - eq) / peak);
        }
    }
    max_dd
}

/// Drawdown of the equity path obtained by applying trade P&L in ledger
/// order to `initial_capital`, ignoring intra-trade marks.
pub fn trade_sequence_drawdown<'a>(
    trades: impl IntoIterator<Item = &'a Trade>,
    initial_capital: f64,
) -> f64 {
    let mut equity = initial_capital;
    let mut path = vec![equity];
    for trade in trades {
        equity += trade.pnl;
        path.push(equity);
    }
    max_drawdown(&path)
}

/// Annualized Sharpe ratio of per-step returns.
///
/// mean(returns) / stdev(returns) * sqrt(periods_per_year).
/// 0.0 if stdev is zero or there are fewer than 2 returns.
pub fn sharpe_ratio(equity: &[f64], periods_per_year: f64) -> f64 {
    let returns = period_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean(&returns) / std * periods_per_year.sqrt()
}

/// Annualized Sortino ratio (downside deviation only).
pub fn sortino_ratio(equity: &[f64], periods_per_year: f64) -> f64 {
    let returns = period_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let downside_sq: f64 = returns.iter().filter(|&&r| r < 0.0).map(|r| r * r).sum();
    if downside_sq == 0.0 {
        return 0.0;
    }
    let downside_std = (downside_sq / returns.len() as f64).sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    mean(&returns) / downside_std * periods_per_year.sqrt()
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Simple per-step returns; a step from non-positive equity counts as 0.
pub fn period_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn max_consecutive(trades: &[Trade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;
    for trade in trades {
        let hit = if winners { trade.pnl > 0.0 } else { trade.pnl < 0.0 };
        if hit {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}
