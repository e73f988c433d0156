//! Volatility regime from the recent ATR trend.
//!
//! Fits a least-squares line through the last `lookback` ATR values. A slope
//! above 1% of their mean is expansion, below -1% is compression.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityRegime {
    Expansion,
    Compression,
    Neutral,
}

pub const DEFAULT_REGIME_LOOKBACK: usize = 5;

pub fn volatility_regime(atr: &[f64], lookback: usize) -> VolatilityRegime {
    if lookback < 2 || atr.len() < lookback + 1 {
        return VolatilityRegime::Neutral;
    }

    let recent = &atr[atr.len() - lookback..];
    if recent.iter().any(|v| !v.is_finite()) {
        return VolatilityRegime::Neutral;
    }

    let slope = linear_slope(recent);
    let mean = recent.iter().sum::<f64>() / lookback as f64;
    let threshold = mean * 0.01;

    if slope > threshold {
        VolatilityRegime::Expansion
    } else if slope < -threshold {
        VolatilityRegime::Compression
    } else {
        VolatilityRegime::Neutral
    }
}

/// Least-squares slope of `values` against x = 0, 1, 2, ...
fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }

    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rising_atr_is_expansion() {
        let atr = [1.0, 1.0, 1.1, 1.2, 1.3, 1.4];
        assert_eq!(volatility_regime(&atr, 5), VolatilityRegime::Expansion);
    }

    #[test]
    fn falling_atr_is_compression() {
        let atr = [2.0, 2.0, 1.8, 1.6, 1.4, 1.2];
        assert_eq!(volatility_regime(&atr, 5), VolatilityRegime::Compression);
    }

    #[test]
    fn flat_atr_is_neutral() {
        assert_eq!(volatility_regime(&[1.0; 8], 5), VolatilityRegime::Neutral);
    }

    #[test]
    fn short_or_undefined_history_is_neutral() {
        assert_eq!(volatility_regime(&[1.0, 2.0], 5), VolatilityRegime::Neutral);
        let atr = [1.0, 1.1, f64::NAN, 1.3, 1.4, 1.5];
        assert_eq!(volatility_regime(&atr, 5), VolatilityRegime::Neutral);
    }

    #[test]
    fn slope_of_line() {
        assert!((linear_slope(&[1.0, 3.0, 5.0, 7.0]) - 2.0).abs() < 1e-12);
    }
}
