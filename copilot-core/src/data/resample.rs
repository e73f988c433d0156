//! Aggregate fine candles into a coarser timeframe.
//!
//! Buckets start on multiples of the target interval counted from local midnight
//! (9:30, 9:35, ... for 5m; 9:30, 9:45, ... for 15m). Bucket candle: first open,
//! max high, min low, last close, summed volume, stamped with the bucket start.
//! Input must be sorted by timestamp.

use crate::domain::{Candle, Timeframe};
use chrono::{DateTime, Duration, FixedOffset, Timelike};

/// Start of the bucket containing `timestamp`.
pub fn bucket_start(timestamp: DateTime<FixedOffset>, timeframe: Timeframe) -> DateTime<FixedOffset> {
    let secs_of_day = i64::from(timestamp.num_seconds_from_midnight());
    let interval = timeframe.minutes() * 60;
    let into_bucket = secs_of_day % interval;
    timestamp
        - Duration::seconds(into_bucket)
        - Duration::nanoseconds(i64::from(timestamp.nanosecond()))
}

pub fn resample(candles: &[Candle], timeframe: Timeframe) -> Vec<Candle> {
    let mut out: Vec<Candle> = Vec::new();

    for candle in candles {
        let start = bucket_start(candle.timestamp, timeframe);
        match out.last_mut() {
            Some(bucket) if bucket.timestamp == start => {
                bucket.high = bucket.high.max(candle.high);
                bucket.low = bucket.low.min(candle.low);
                bucket.close = candle.close;
                bucket.volume += candle.volume;
            }
            _ => out.push(Candle::new(
                start,
                candle.open,
                candle.high,
                candle.low,
                candle.close,
                candle.volume,
            )),
        }
    }

    out
}
