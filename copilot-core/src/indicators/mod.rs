//! Indicator computation for one timeframe.
//!
//! All indicators are pure functions: candle history in, numeric series of the
//! same length out. They are computed once per timeframe before the scan and
//! assembled into an `IndicatorSeries` (one `IndicatorRow` per candle).
//!
//! No value at index t depends on candles after t.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod regime;
pub mod row;
pub mod rsi;
pub mod vwap;

pub use atr::{atr, rolling_mean, true_range};
pub use ema::ema_of_series;
pub use macd::{macd, MacdOutput};
pub use regime::{volatility_regime, VolatilityRegime, DEFAULT_REGIME_LOOKBACK};
pub use row::{IndicatorRow, IndicatorSeries};
pub use rsi::{rsi, rsi_of_series};
pub use vwap::vwap;

use crate::domain::Candle;
use serde::{Deserialize, Serialize};

/// Indicator periods. Defaults: EMA 9/21, RSI 14, ATR 14, MACD 12/26/9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 21,
            rsi_period: 14,
            atr_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

/// Compute every indicator the signal engine reads for one candle series.
pub fn compute_indicators(candles: &[Candle], config: &IndicatorConfig) -> IndicatorSeries {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let ema_fast = ema_of_series(&closes, config.ema_fast);
    let ema_slow = ema_of_series(&closes, config.ema_slow);
    let rsi = rsi_of_series(&closes, config.rsi_period);
    let atr = atr(candles, config.atr_period);
    let vwap = vwap(candles);
    let macd = macd(
        candles,
        config.macd_fast,
        config.macd_slow,
        config.macd_signal,
    );

    let rows = (0..candles.len())
        .map(|i| IndicatorRow {
            ema_fast: ema_fast[i],
            ema_slow: ema_slow[i],
            rsi: rsi[i],
            atr: atr[i],
            vwap: vwap[i],
            macd: macd.macd[i],
            macd_signal: macd.signal[i],
        })
        .collect();

    IndicatorSeries::from_rows(rows)
}

/// Create synthetic 5-minute candles from close prices for testing.
///
/// open = prev_close (or close for the first candle),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    use chrono::{FixedOffset, TimeZone};
    let start = FixedOffset::west_opt(4 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 3, 9, 30, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle::new(
                start + chrono::Duration::minutes(5 * i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
