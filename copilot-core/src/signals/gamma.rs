//! Gamma score: a 0-100 volatility-surge / conviction heuristic on the 5m series.
//!
//! gamma = min(100, round(volume_ratio * 30 + volatility_ratio * 30 + |price_change_pct| * 10))
//!
//! - volume_ratio: mean volume of the 5 candles before i / mean of the 20 before i
//! - volatility_ratio: ATR[i] / mean ATR of the 20 candles before i
//! - price_change_pct: percent change of close over the last 5 candles
//!
//! Every undefined or zero-denominator ratio falls back to 1.0.

use crate::domain::Candle;

pub const GAMMA_VOLUME_RECENT: usize = 5;
pub const GAMMA_VOLUME_BASELINE: usize = 20;
pub const GAMMA_ATR_BASELINE: usize = 20;
pub const GAMMA_PRICE_LOOKBACK: usize = 5;

/// Score at or above which "Gamma elevated" counts as a condition.
pub const GAMMA_ELEVATED: u32 = 40;

pub fn gamma_score(candles: &[Candle], atr: &[f64], i: usize) -> u32 {
    let composite = volume_ratio(candles, i) * 30.0
        + volatility_ratio(atr, i) * 30.0
        + price_change_pct(candles, i).abs() * 10.0;
    if !composite.is_finite() || composite <= 0.0 {
        return 0;
    }
    composite.round().min(100.0) as u32
}

pub fn volume_ratio(candles: &[Candle], i: usize) -> f64 {
    let recent = mean_before(candles, i, GAMMA_VOLUME_RECENT, |c| c.volume);
    let baseline = mean_before(candles, i, GAMMA_VOLUME_BASELINE, |c| c.volume);
    match (recent, baseline) {
        (Some(r), Some(b)) if b > 0.0 => r / b,
        _ => 1.0,
    }
}

pub fn volatility_ratio(atr: &[f64], i: usize) -> f64 {
    let current = match atr.get(i) {
        Some(&v) if v.is_finite() => v,
        _ => return 1.0,
    };
    let start = i.saturating_sub(GAMMA_ATR_BASELINE);
    let defined: Vec<f64> = atr[start..i].iter().copied().filter(|v| v.is_finite()).collect();
    if defined.is_empty() {
        return 1.0;
    }
    let mean = defined.iter().sum::<f64>() / defined.len() as f64;
    if mean > 0.0 {
        current / mean
    } else {
        1.0
    }
}

pub fn price_change_pct(candles: &[Candle], i: usize) -> f64 {
    if i < GAMMA_PRICE_LOOKBACK || i >= candles.len() {
        return 0.0;
    }
    let base = candles[i - GAMMA_PRICE_LOOKBACK].close;
    if base == 0.0 || !base.is_finite() {
        return 0.0;
    }
    (candles[i].close / base - 1.0) * 100.0
}

/// Mean of `field` over the `lookback` candles before `i` (clamped at 0).
fn mean_before(
    candles: &[Candle],
    i: usize,
    lookback: usize,
    field: impl Fn(&Candle) -> f64,
) -> Option<f64> {
    let end = i.min(candles.len());
    let start = end.saturating_sub(lookback);
    let window = &candles[start..end];
    if window.is_empty() {
        return None;
    }
    let mean = window.iter().map(field).sum::<f64>() / window.len() as f64;
    mean.is_finite().then_some(mean)
}
