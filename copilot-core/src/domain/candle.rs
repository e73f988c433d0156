//! OHLCV candle, the intraday market data unit.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single symbol and timeframe.
///
/// The timestamp is the candle's open time in the exchange's local offset.
/// Keeping the offset lets VWAP reset on the exchange session date rather than
/// the UTC date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLCV sanity check: high bounds the body, low bounds the body,
    /// prices positive, volume non-negative.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }

    /// Session date in the candle's own offset.
    pub fn session_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Typical price: (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_candle() -> Candle {
        let et = FixedOffset::west_opt(4 * 3600).unwrap();
        Candle::new(
            et.with_ymd_and_hms(2024, 6, 3, 9, 30, 0).unwrap(),
            530.0,
            531.5,
            529.2,
            531.0,
            250_000.0,
        )
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle().is_sane());
    }

    #[test]
    fn candle_detects_void() {
        let mut candle = sample_candle();
        candle.close = f64::NAN;
        assert!(candle.is_void());
        assert!(!candle.is_sane());
    }

    #[test]
    fn candle_detects_high_below_close() {
        let mut candle = sample_candle();
        candle.high = 530.5;
        assert!(!candle.is_sane());
    }

    #[test]
    fn session_date_uses_local_offset() {
        // 23:30 ET on June 3 is already June 4 in UTC
        let et = FixedOffset::west_opt(4 * 3600).unwrap();
        let mut candle = sample_candle();
        candle.timestamp = et.with_ymd_and_hms(2024, 6, 3, 23, 30, 0).unwrap();
        assert_eq!(
            candle.session_date(),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
        );
    }

    #[test]
    fn typical_price_is_hlc_mean() {
        let candle = sample_candle();
        let expected = (531.5 + 529.2 + 531.0) / 3.0;
        assert!((candle.typical_price() - expected).abs() < 1e-12);
    }

    #[test]
    fn candle_serializes_rfc3339_timestamp() {
        let json = serde_json::to_string(&sample_candle()).unwrap();
        assert!(json.contains("2024-06-03T09:30:00-04:00"));
        let back: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample_candle());
    }
}
