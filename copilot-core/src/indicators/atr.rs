//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), TR[0] = high-low.
//! ATR is the simple rolling mean of TR over `period` candles.
//! Lookback: period - 1.

use crate::domain::Candle;

/// Compute the True Range series from candles.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let n = candles.len();
    let mut tr = vec![f64::NAN; n];

    if n == 0 {
        return tr;
    }

    tr[0] = candles[0].high - candles[0].low;

    for i in 1..n {
        let h = candles[i].high;
        let l = candles[i].low;
        let pc = candles[i - 1].close;
        if h.is_nan() || l.is_nan() {
            continue;
        }
        if pc.is_nan() {
            tr[i] = h - l;
        } else {
            tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
        }
    }

    tr
}

/// Simple rolling mean; a window containing NaN yields NaN.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().sum::<f64>() / period as f64;
    }

    result
}

pub fn atr(candles: &[Candle], period: usize) -> Vec<f64> {
    rolling_mean(&true_range(candles), period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn true_range_first_candle_is_high_minus_low() {
        // make_candles: high = max(open, close) + 1, low = min(open, close) - 1
        let candles = make_candles(&[100.0, 103.0]);
        let tr = true_range(&candles);
        assert_approx(tr[0], 2.0, DEFAULT_EPSILON);
        // open 100, close 103 → high 104, low 99, prev close 100 → TR = 5
        assert_approx(tr[1], 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_uses_gap_from_prev_close() {
        let mut candles = make_candles(&[100.0, 100.0]);
        candles[1].open = 110.0;
        candles[1].high = 111.0;
        candles[1].low = 109.0;
        candles[1].close = 110.0;
        let tr = true_range(&candles);
        assert_approx(tr[1], 11.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_warmup_and_mean() {
        let candles = make_candles(&[100.0, 100.0, 100.0, 100.0]);
        let result = atr(&candles, 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 2.0, DEFAULT_EPSILON);
        assert_approx(result[3], 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_skips_nan_windows() {
        let result = rolling_mean(&[1.0, f64::NAN, 3.0, 5.0, 7.0], 2);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 4.0, DEFAULT_EPSILON);
        assert_approx(result[4], 6.0, DEFAULT_EPSILON);
    }
}
