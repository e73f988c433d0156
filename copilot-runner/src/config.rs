//! Serializable analysis configuration.
//!
//! One TOML file drives a whole analysis run: the ticker, where candle files live,
//! indicator periods, limiter gaps, backtest horizon and the fetch budget. Every
//! section has defaults, so an empty file is a valid config.

use copilot_core::data::RateLimiter;
use copilot_core::indicators::IndicatorConfig;
use copilot_core::signals::FrequencyLimiter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Unique identifier for an analysis configuration (content-addressable hash).
pub type ConfigId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Default ticker when the caller names none.
    pub ticker: String,

    /// Directory holding `<SYMBOL>_<tf>.csv` candle files.
    pub data_dir: PathBuf,

    pub indicators: IndicatorConfig,
    pub limiter: FrequencyLimiter,
    pub backtest: BacktestSettings,
    pub fetch: FetchSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ticker: "SPY".into(),
            data_dir: PathBuf::from("data"),
            indicators: IndicatorConfig::default(),
            limiter: FrequencyLimiter::default(),
            backtest: BacktestSettings::default(),
            fetch: FetchSettings::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        if ind.ema_fast == 0 || ind.ema_slow == 0 || ind.rsi_period == 0 || ind.atr_period == 0 {
            return Err(ConfigError::Invalid("indicator periods must be positive".into()));
        }
        if ind.macd_fast == 0 || ind.macd_slow == 0 || ind.macd_signal == 0 {
            return Err(ConfigError::Invalid("MACD periods must be positive".into()));
        }
        if self.limiter.min_gap_minutes < 0 || self.limiter.strong_gap_minutes < 0 {
            return Err(ConfigError::Invalid("limiter gaps must not be negative".into()));
        }
        if self.backtest.lookforward_candles == 0 {
            return Err(ConfigError::Invalid("lookforward_candles must be at least 1".into()));
        }
        if self.fetch.max_requests_per_hour == 0 {
            return Err(ConfigError::Invalid("max_requests_per_hour must be at least 1".into()));
        }
        Ok(())
    }

    /// Deterministic hash of the configuration, used to tag reports.
    pub fn config_id(&self) -> ConfigId {
        // Serializing a plain struct of numbers, strings and paths cannot fail;
        // fall back to the debug form if it ever does.
        let json = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    /// Candles after the signal candle used to judge it.
    pub lookforward_candles: usize,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            lookforward_candles: crate::backtest::DEFAULT_LOOKFORWARD_CANDLES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub request_delay_secs: f64,
    pub max_requests_per_hour: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            request_delay_secs: 2.0,
            max_requests_per_hour: 1800,
        }
    }
}

impl FetchSettings {
    pub fn rate_limiter(&self) -> RateLimiter {
        let delay = Duration::from_secs_f64(self.request_delay_secs.max(0.0));
        RateLimiter::new(delay, self.max_requests_per_hour)
    }
}
