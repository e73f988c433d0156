//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over candle sources (Yahoo Finance, CSV files)
//! so the pipeline can swap implementations and tests can use in-memory data.

use crate::domain::{Candle, Timeframe};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("provider has blocked requests (HTTP 403)")]
    Blocked,

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no {timeframe} candles returned for {symbol}")]
    NoData { symbol: String, timeframe: Timeframe },

    #[error("csv error: {0}")]
    Csv(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("data error: {0}")]
    Other(String),
}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self {
        DataError::Csv(e.to_string())
    }
}

/// Candles for one symbol and timeframe.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub candles: Vec<Candle>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Trait for intraday candle providers.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch candles for `symbol` at `timeframe` covering `range` (e.g. "5d").
    fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        range: &str,
    ) -> Result<FetchResult, DataError>;

    /// Check if the provider can currently accept a request.
    fn is_available(&self) -> bool;
}
