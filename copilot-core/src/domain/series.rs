//! A candle series with its precomputed indicators, and the three-timeframe view
//! the signal engine reads.

use super::{Candle, Timeframe};
use crate::indicators::{compute_indicators, IndicatorConfig, IndicatorRow, IndicatorSeries};
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("{timeframe}: {candles} candles but {rows} indicator rows")]
    LengthMismatch {
        timeframe: Timeframe,
        candles: usize,
        rows: usize,
    },

    #[error("{timeframe}: timestamp at index {index} ({timestamp}) does not increase")]
    NonIncreasingTimestamp {
        timeframe: Timeframe,
        index: usize,
        timestamp: DateTime<FixedOffset>,
    },
}

/// Candles of one timeframe with a parallel indicator row per candle.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeframeSeries {
    timeframe: Timeframe,
    candles: Vec<Candle>,
    indicators: IndicatorSeries,
}

impl TimeframeSeries {
    /// Pair candles with already-computed indicators.
    pub fn new(
        timeframe: Timeframe,
        candles: Vec<Candle>,
        indicators: IndicatorSeries,
    ) -> Result<Self, SeriesError> {
        if candles.len() != indicators.len() {
            return Err(SeriesError::LengthMismatch {
                timeframe,
                candles: candles.len(),
                rows: indicators.len(),
            });
        }
        for (i, pair) in candles.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NonIncreasingTimestamp {
                    timeframe,
                    index: i + 1,
                    timestamp: pair[1].timestamp,
                });
            }
        }
        Ok(Self {
            timeframe,
            candles,
            indicators,
        })
    }

    /// Compute indicators for `candles` and pair them.
    pub fn with_indicators(
        timeframe: Timeframe,
        candles: Vec<Candle>,
        config: &IndicatorConfig,
    ) -> Result<Self, SeriesError> {
        let indicators = compute_indicators(&candles, config);
        Self::new(timeframe, candles, indicators)
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn indicators(&self) -> &IndicatorSeries {
        &self.indicators
    }

    pub fn candle(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn row(&self, index: usize) -> Option<&IndicatorRow> {
        self.indicators.get(index)
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Index of the candle with exactly this timestamp.
    pub fn index_of(&self, timestamp: DateTime<FixedOffset>) -> Option<usize> {
        self.candles
            .binary_search_by(|c| c.timestamp.cmp(&timestamp))
            .ok()
    }

    /// Index of the latest candle with timestamp <= `timestamp`.
    pub fn latest_at_or_before(&self, timestamp: DateTime<FixedOffset>) -> Option<usize> {
        let after = self.candles.partition_point(|c| c.timestamp <= timestamp);
        after.checked_sub(1)
    }
}

/// Borrowed view of the 1m, 5m and 15m series of one symbol.
#[derive(Debug, Clone, Copy)]
pub struct MultiTimeframeInput<'a> {
    pub m1: &'a TimeframeSeries,
    pub m5: &'a TimeframeSeries,
    pub m15: &'a TimeframeSeries,
}

impl<'a> MultiTimeframeInput<'a> {
    pub fn new(m1: &'a TimeframeSeries, m5: &'a TimeframeSeries, m15: &'a TimeframeSeries) -> Self {
        Self { m1, m5, m15 }
    }
}
