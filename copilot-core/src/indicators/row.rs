//! Indicator row and the per-timeframe indicator series container.
//!
//! One row per candle, same index as the candle series. Undefined values
//! (warmup, zero volume) are `f64::NAN`; every comparison against NaN is false,
//! so an undefined value never satisfies a condition downstream.

use serde::{Deserialize, Serialize};

/// Indicator values attached 1:1 to a candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub atr: f64,
    pub vwap: f64,
    pub macd: f64,
    pub macd_signal: f64,
}

impl IndicatorRow {
    /// A row with every value undefined.
    pub fn undefined() -> Self {
        Self {
            ema_fast: f64::NAN,
            ema_slow: f64::NAN,
            rsi: f64::NAN,
            atr: f64::NAN,
            vwap: f64::NAN,
            macd: f64::NAN,
            macd_signal: f64::NAN,
        }
    }

    /// MACD line minus signal line.
    pub fn macd_histogram(&self) -> f64 {
        self.macd - self.macd_signal
    }
}

impl Default for IndicatorRow {
    fn default() -> Self {
        Self::undefined()
    }
}

/// Precomputed indicator rows for one timeframe.
///
/// Built once before the scan, then queried by candle index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    rows: Vec<IndicatorRow>,
}

impl IndicatorSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<IndicatorRow>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: IndicatorRow) {
        self.rows.push(row);
    }

    /// Row at a candle index.
    pub fn get(&self, index: usize) -> Option<&IndicatorRow> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    /// Column view of one field, e.g. `series.column(|r| r.atr)`.
    pub fn column(&self, field: impl Fn(&IndicatorRow) -> f64) -> Vec<f64> {
        self.rows.iter().map(field).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
