//! Moving Average Convergence Divergence (MACD).
//!
//! MACD line = EMA(fast) - EMA(slow) of closes.
//! Signal line = EMA(signal) of the MACD line.
//! Histogram = MACD line - signal line.

use super::ema::ema_of_series;
use crate::domain::Candle;

/// MACD line, signal line and histogram, each the length of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(candles: &[Candle], fast: usize, slow: usize, signal: usize) -> MacdOutput {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let ema_fast = ema_of_series(&closes, fast);
    let ema_slow = ema_of_series(&closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_of_series(&macd_line, signal);
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdOutput {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}
