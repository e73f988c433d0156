//! Relative Strength Index (RSI).
//!
//! Simple rolling mean of gains and losses over `period` changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period (the first `period` rows are NaN).
//! Edge cases: avg_loss == 0 → RSI = 100; no movement at all → NaN.

use crate::domain::Candle;

/// RSI over candle closes.
pub fn rsi(candles: &[Candle], period: usize) -> Vec<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    rsi_of_series(&closes, period)
}

pub fn rsi_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period + 1 {
        return result;
    }

    // changes[i] = values[i] - values[i-1], changes[0] undefined
    let mut gains = vec![f64::NAN; n];
    let mut losses = vec![f64::NAN; n];
    for i in 1..n {
        let ch = values[i] - values[i - 1];
        if ch.is_nan() {
            continue;
        }
        gains[i] = ch.max(0.0);
        losses[i] = (-ch).max(0.0);
    }

    for i in period..n {
        let window = (i + 1 - period)..=i;
        let gain_window = &gains[window.clone()];
        let loss_window = &losses[window];
        if gain_window.iter().any(|v| v.is_nan()) || loss_window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let avg_gain = gain_window.iter().sum::<f64>() / period as f64;
        let avg_loss = loss_window.iter().sum::<f64>() / period as f64;
        result[i] = compute_rsi(avg_gain, avg_loss);
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
