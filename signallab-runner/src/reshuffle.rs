//! Trade-order reshuffle — drawdown distribution under random trade ordering.
//!
//! Realized trade P&L is replayed in random orders (prices are never
//! touched). Each iteration draws its permutation from its own seeded stream
//! of an [`RngHierarchy`], so the distribution is reproducible and
//! independent of the worker count.

use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use signallab_core::domain::Trade;
use signallab_core::metrics::trade_sequence_drawdown;

use crate::rng::RngHierarchy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReshuffleConfig {
    pub iterations: usize,
    pub seed: u64,
    /// Worker threads; 0 lets rayon pick one per core.
    pub workers: usize,
}

impl Default for ReshuffleConfig {
    fn default() -> Self {
        Self {
            iterations: 1_000,
            seed: 42,
            workers: 0,
        }
    }
}

/// Max-drawdown distribution over reshuffled trade orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReshuffleReport {
    pub iterations: usize,
    /// Drawdown of the trades in ledger order.
    pub original_drawdown: f64,
    /// Per-iteration drawdowns, ascending.
    pub samples: Vec<f64>,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub worst: f64,
    /// Fraction of shuffles whose drawdown is at least the original's.
    pub prob_at_least_as_bad: f64,
}

impl ReshuffleConfig {
    pub fn validate(&self) -> Result<(), ReshuffleError> {
        if self.iterations == 0 {
            return Err(ReshuffleError::InvalidParameter {
                name: "iterations",
                reason: "must be >= 1".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ReshuffleError {
    #[error("no trades to reshuffle")]
    NoTrades,
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Tolerance for "at least as bad" comparisons of equal-sum paths.
const DRAWDOWN_EPSILON: f64 = 1e-12;

pub fn run_reshuffle(
    trades: &[Trade],
    initial_capital: f64,
    config: &ReshuffleConfig,
) -> Result<ReshuffleReport, ReshuffleError> {
    if trades.is_empty() {
        return Err(ReshuffleError::NoTrades);
    }
    config.validate()?;
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(ReshuffleError::InvalidParameter {
            name: "initial_capital",
            reason: format!("must be finite and > 0, got {initial_capital}"),
        });
    }

    let original_drawdown = trade_sequence_drawdown(trades, initial_capital);
    let hierarchy = RngHierarchy::new(config.seed);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .map_err(|e| ReshuffleError::ThreadPool(e.to_string()))?;

    let mut samples: Vec<f64> = pool.install(|| {
        (0..config.iterations)
            .into_par_iter()
            .map(|iteration| {
                let mut rng = hierarchy.rng_for("reshuffle", iteration as u64);
                let mut order: Vec<usize> = (0..trades.len()).collect();
                order.shuffle(&mut rng);
                trade_sequence_drawdown(order.iter().map(|&i| &trades[i]), initial_capital)
            })
            .collect()
    });
    samples.sort_by(f64::total_cmp);

    let n = samples.len();
    let mean = samples.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (samples[n / 2 - 1] + samples[n / 2]) / 2.0
    } else {
        samples[n / 2]
    };
    let p95 = percentile(&samples, 0.95);
    let worst = samples[n - 1];
    let at_least_as_bad = samples
        .iter()
        .filter(|&&dd| dd >= original_drawdown - DRAWDOWN_EPSILON)
        .count();

    info!(
        iterations = n,
        original_drawdown,
        p95,
        worst,
        "reshuffle complete"
    );

    Ok(ReshuffleReport {
        iterations: n,
        original_drawdown,
        mean,
        median,
        p95,
        worst,
        prob_at_least_as_bad: at_least_as_bad as f64 / n as f64,
        samples,
    })
}

/// Nearest-rank percentile of an ascending, non-empty slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
