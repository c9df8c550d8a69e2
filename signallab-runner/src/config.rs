//! TOML runner configuration.
//!
//! ```toml
//! [backtest]
//! window_size = 31
//! initial_capital = 10000.0
//! fee_rate = 0.001
//!
//! [backtest.signal]
//! fast_period = 10
//! slow_period = 30
//! mode = "combined"
//!
//! [sweep]
//! workers = 4
//! timeout_secs = 60
//! ranking = "sharpe_ratio"
//!
//! [sweep.grid]
//! fast_periods = [5, 10]
//! slow_periods = [20, 30]
//!
//! [walk_forward]
//! train_size = 250
//! test_size = 50
//!
//! [reshuffle]
//! iterations = 500
//! seed = 7
//! ```
//!
//! Every table and field is optional and falls back to its default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use signallab_core::engine::{BacktestConfig, EngineError};

use crate::ranking::RankingMetric;
use crate::reshuffle::{ReshuffleConfig, ReshuffleError};
use crate::sweep::{ParamGrid, SweepOptions};
use crate::walk_forward::{WalkForwardConfig, WalkForwardError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub backtest: BacktestConfig,
    pub sweep: SweepSection,
    pub walk_forward: WalkForwardConfig,
    pub reshuffle: ReshuffleConfig,
}

/// `[sweep]` table: execution options plus the `[sweep.grid]` axes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSection {
    pub workers: usize,
    pub timeout_secs: Option<u64>,
    pub ranking: RankingMetric,
    pub grid: ParamGrid,
}

impl SweepSection {
    pub fn options(&self) -> SweepOptions {
        SweepOptions {
            workers: self.workers,
            timeout: self.timeout_secs.map(Duration::from_secs),
            ranking: self.ranking,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid backtest configuration: {0}")]
    Invalid(#[from] EngineError),
    #[error("invalid walk_forward configuration: {0}")]
    WalkForward(#[from] WalkForwardError),
    #[error("invalid reshuffle configuration: {0}")]
    Reshuffle(#[from] ReshuffleError),
}

impl RunnerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backtest.validate()?;
        self.walk_forward.validate()?;
        self.reshuffle.validate()?;
        Ok(())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
