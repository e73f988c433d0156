//! Cross-timeframe context for one 5-minute candle.
//!
//! Trend context comes from the latest 15m candle at or before the 5m timestamp.
//! Entry timing comes from the 1m candles in the trailing window `(t - 5min, t]`;
//! the last candle of that window supplies the entry values.
//!
//! Both lookups are binary searches over the sorted timestamps.

use crate::domain::{TimeframeSeries, Timeframe};
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// A 5m candle the evaluator cannot score. Recovered by skipping the candle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MissingContext {
    #[error("no 15m candle at or before {timestamp}")]
    NoTrendCandle { timestamp: DateTime<FixedOffset> },

    #[error("no 1m candles in the 5 minutes ending {timestamp}")]
    EmptyEntryWindow { timestamp: DateTime<FixedOffset> },

    #[error("5m index {index} has no prior candle (series length {len})")]
    NoHistory { index: usize, len: usize },
}

/// 15m values at the trend candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendContext {
    pub index: usize,
    pub close: f64,
    pub vwap: f64,
    pub histogram: f64,
}

/// 1m values at the last candle of the entry window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryContext {
    /// Index of the last 1m candle in the window.
    pub index: usize,
    /// Number of 1m candles in the window.
    pub window_len: usize,
    pub close: f64,
    pub high: f64,
    pub volume: f64,
    /// Mean volume of the other candles in the window (own volume if alone).
    pub avg_volume: f64,
    pub vwap: f64,
    pub rsi: f64,
    pub histogram: f64,
    /// Histogram of the previous 1m candle inside the window, 0.0 if the window
    /// holds a single candle.
    pub prev_histogram: f64,
}

impl EntryContext {
    /// 1m MACD histogram strictly greater than the previous candle's.
    pub fn macd_increasing(&self) -> bool {
        self.histogram > self.prev_histogram
    }
}

/// Latest 15m candle with timestamp <= `timestamp`.
pub fn trend_context(
    m15: &TimeframeSeries,
    timestamp: DateTime<FixedOffset>,
) -> Result<TrendContext, MissingContext> {
    let index = m15
        .latest_at_or_before(timestamp)
        .ok_or(MissingContext::NoTrendCandle { timestamp })?;
    let candle = &m15.candles()[index];
    let row = m15.row(index).copied().unwrap_or_default();
    Ok(TrendContext {
        index,
        close: candle.close,
        vwap: row.vwap,
        histogram: row.macd_histogram(),
    })
}

/// 1m candles with timestamp in `(timestamp - 5min, timestamp]`.
pub fn entry_context(
    m1: &TimeframeSeries,
    timestamp: DateTime<FixedOffset>,
) -> Result<EntryContext, MissingContext> {
    let candles = m1.candles();
    let window_start = timestamp - Timeframe::M5.duration();
    let start = candles.partition_point(|c| c.timestamp <= window_start);
    let end = candles.partition_point(|c| c.timestamp <= timestamp);
    if start >= end {
        return Err(MissingContext::EmptyEntryWindow { timestamp });
    }

    let index = end - 1;
    let last = &candles[index];
    let row = m1.row(index).copied().unwrap_or_default();

    let others = &candles[start..index];
    let avg_volume = if others.is_empty() {
        last.volume
    } else {
        others.iter().map(|c| c.volume).sum::<f64>() / others.len() as f64
    };

    let prev_histogram = if index > start {
        m1.row(index - 1).map(|r| r.macd_histogram()).unwrap_or(0.0)
    } else {
        0.0
    };

    Ok(EntryContext {
        index,
        window_len: end - start,
        close: last.close,
        high: last.high,
        volume: last.volume,
        avg_volume,
        vwap: row.vwap,
        rsi: row.rsi,
        histogram: row.macd_histogram(),
        prev_histogram,
    })
}
