//! Session Volume-Weighted Average Price (VWAP).
//!
//! VWAP[t] = sum(typical_price * volume) / sum(volume), both sums cumulative
//! from the first candle of the candle's session date. Resets every session.
//! Zero cumulative volume → NaN.

use crate::domain::Candle;

pub fn vwap(candles: &[Candle]) -> Vec<f64> {
    let mut result = Vec::with_capacity(candles.len());
    let mut session = None;
    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;

    for candle in candles {
        let date = candle.session_date();
        if session != Some(date) {
            session = Some(date);
            cum_pv = 0.0;
            cum_volume = 0.0;
        }

        let tp = candle.typical_price();
        if tp.is_finite() && candle.volume.is_finite() {
            cum_pv += tp * candle.volume;
            cum_volume += candle.volume;
        }

        result.push(if cum_volume > 0.0 {
            cum_pv / cum_volume
        } else {
            f64::NAN
        });
    }

    result
}
