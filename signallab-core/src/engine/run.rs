//! Engine loop and run result.

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{
    Candle, EquityPoint, ExitReason, Position, PositionSide, SignalDirection, SignalRecord, Trade,
};
use crate::metrics::PerformanceMetrics;
use crate::signal::SignalProcessor;

use super::config::{BacktestConfig, TradingMode};
use super::EngineError;

/// Complete output of a backtest run.
///
/// The headline statistics are copied out of `metrics` for convenience.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    /// One point per processed step.
    pub equity_curve: Vec<EquityPoint>,
    /// Actionable signals emitted by the processor, tagged with the acting candle index.
    pub signals: Vec<SignalRecord>,
    pub total_pnl: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    /// Position held after the last step, before end-of-data liquidation.
    pub final_position: Position,
    pub metrics: PerformanceMetrics,
    pub initial_capital: f64,
    pub final_equity: f64,
    pub config_hash: String,
    /// Number of processed steps (`len - window_size`, or 0).
    pub steps: usize,
    /// Steps that ended with an open position.
    pub bars_in_market: usize,
}

/// Run a single-position backtest over `candles`.
///
/// Fails before simulation on an invalid configuration or a malformed candle
/// (non-finite field or timestamp earlier than its predecessor).
pub fn run_backtest(candles: &[Candle], config: &BacktestConfig) -> Result<BacktestResult, EngineError> {
    config.validate()?;
    validate_candles(candles)?;

    let processor = SignalProcessor::new(config.signal.clone())?;
    let mut sim = Simulator::new(config);
    let steps = candles.len().saturating_sub(config.window_size);
    let mut equity_curve = Vec::with_capacity(steps);
    let mut signals = Vec::new();

    for i in config.window_size..candles.len() {
        let window = &candles[i - config.window_size..i];
        let signal = processor.process(window)?;
        let candle = &candles[i];

        match signal.direction {
            SignalDirection::Buy => {
                if sim.position.is_short() {
                    sim.close(candle, i, ExitReason::Signal);
                }
                if sim.position.is_flat() {
                    sim.open(PositionSide::Long, candle, i);
                }
            }
            SignalDirection::Sell => {
                if sim.position.is_long() {
                    sim.close(candle, i, ExitReason::Signal);
                }
                if sim.position.is_flat() && config.trading_mode == TradingMode::LongShort {
                    sim.open(PositionSide::Short, candle, i);
                }
            }
            SignalDirection::Hold => {}
        }
        if signal.direction.is_actionable() {
            signals.push(SignalRecord { index: i, signal });
        }

        if !sim.position.is_flat() {
            sim.bars_in_market += 1;
        }
        equity_curve.push(EquityPoint {
            timestamp: candle.timestamp,
            equity: sim.equity(candle.close),
        });
    }

    let final_position = sim.position.clone();
    if !final_position.is_flat() {
        if let Some(last) = candles.last() {
            sim.close(last, candles.len() - 1, ExitReason::EndOfData);
            if let Some(point) = equity_curve.last_mut() {
                point.equity = sim.cash;
            }
        }
    }

    let metrics = PerformanceMetrics::compute(
        &sim.trades,
        &equity_curve,
        config.initial_capital,
        config.timeframe,
        sim.bars_in_market,
    );

    info!(
        steps,
        trades = sim.trades.len(),
        signals = signals.len(),
        total_pnl = metrics.total_pnl,
        max_drawdown = metrics.max_drawdown,
        "backtest complete"
    );

    Ok(BacktestResult {
        total_pnl: metrics.total_pnl,
        win_rate: metrics.win_rate,
        profit_factor: metrics.profit_factor,
        max_drawdown: metrics.max_drawdown,
        sharpe_ratio: metrics.sharpe_ratio,
        final_equity: sim.cash,
        trades: sim.trades,
        equity_curve,
        signals,
        final_position,
        metrics,
        initial_capital: config.initial_capital,
        config_hash: config.config_hash(),
        steps,
        bars_in_market: sim.bars_in_market,
    })
}

fn validate_candles(candles: &[Candle]) -> Result<(), EngineError> {
    for (index, candle) in candles.iter().enumerate() {
        if let Some(field) = candle.non_finite_field() {
            return Err(EngineError::MalformedCandle {
                index,
                reason: format!("non-finite {field}"),
            });
        }
        if index > 0 && candle.timestamp < candles[index - 1].timestamp {
            return Err(EngineError::MalformedCandle {
                index,
                reason: format!(
                    "timestamp {} precedes previous {}",
                    candle.timestamp,
                    candles[index - 1].timestamp
                ),
            });
        }
    }
    Ok(())
}

/// Cash and position accounting for one run.
///
/// `cash` is realized equity: initial capital plus closed-trade P&L, minus
/// the entry fee of the open position.
struct Simulator<'a> {
    config: &'a BacktestConfig,
    cash: f64,
    position: Position,
    trades: Vec<Trade>,
    bars_in_market: usize,
}

impl<'a> Simulator<'a> {
    fn new(config: &'a BacktestConfig) -> Self {
        Self {
            config,
            cash: config.initial_capital,
            position: Position::flat(),
            trades: Vec::new(),
            bars_in_market: 0,
        }
    }

    fn equity(&self, mark_price: f64) -> f64 {
        self.cash + self.position.unrealized_pnl(mark_price)
    }

    /// Slippage-adjusted fill: buys fill higher, sells fill lower.
    fn fill(&self, price: f64, buying: bool) -> f64 {
        if buying {
            price * (1.0 + self.config.slippage_rate)
        } else {
            price * (1.0 - self.config.slippage_rate)
        }
    }

    fn open(&mut self, side: PositionSide, candle: &Candle, index: usize) {
        let price = self.fill(candle.price(self.config.fill_price), side == PositionSide::Long);
        if self.cash <= 0.0 || price <= 0.0 {
            debug!(index, cash = self.cash, price, "entry skipped");
            return;
        }
        let size = self.cash * self.config.position_size_pct / price;
        let fee = price * size * self.config.fee_rate;
        self.cash -= fee;
        self.position = Position {
            side,
            entry_price: price,
            size,
            opened_at: Some(candle.timestamp),
            entry_index: index,
            entry_fee: fee,
        };
        debug!(index, ?side, price, size, fee, "position opened");
    }

    fn close(&mut self, candle: &Candle, index: usize, reason: ExitReason) {
        let position = std::mem::take(&mut self.position);
        if position.is_flat() {
            return;
        }
        let raw_price = match reason {
            ExitReason::Signal => candle.price(self.config.fill_price),
            ExitReason::EndOfData => candle.close,
        };
        let price = self.fill(raw_price, position.is_short());
        let gross_pnl = position.unrealized_pnl(price);
        let exit_fee = price * position.size * self.config.fee_rate;
        self.cash += gross_pnl - exit_fee;

        let trade = Trade {
            side: position.side,
            entry_index: position.entry_index,
            opened_at: position.opened_at,
            entry_price: position.entry_price,
            exit_index: index,
            closed_at: Some(candle.timestamp),
            exit_price: price,
            exit_reason: reason,
            size: position.size,
            gross_pnl,
            fees: position.entry_fee + exit_fee,
            pnl: gross_pnl - position.entry_fee - exit_fee,
        };
        debug!(
            index,
            side = ?trade.side,
            exit_price = price,
            pnl = trade.pnl,
            ?reason,
            "position closed"
        );
        self.trades.push(trade);
    }
}
