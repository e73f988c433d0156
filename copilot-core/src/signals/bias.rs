//! Market bias snapshot for the latest candle of a timeframe.
//!
//! Three votes: close vs VWAP, EMA-fast vs EMA-slow, RSI regime (above 55 bullish,
//! below 45 bearish, otherwise no vote). Undefined inputs are not counted.
//! Confidence is the winning side's share of counted votes, 0.5 on a tie.

use crate::domain::TimeframeSeries;
use crate::indicators::{volatility_regime, VolatilityRegime, DEFAULT_REGIME_LOOKBACK};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketBias {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasReading {
    pub bias: MarketBias,
    pub confidence: f64,
    pub strength: String,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasClassifier {
    pub rsi_bullish: f64,
    pub rsi_bearish: f64,
}

impl Default for BiasClassifier {
    fn default() -> Self {
        Self {
            rsi_bullish: 55.0,
            rsi_bearish: 45.0,
        }
    }
}

impl BiasClassifier {
    /// Classify the last candle of `series`.
    pub fn classify(&self, series: &TimeframeSeries) -> BiasReading {
        let last = series.len().checked_sub(1);
        let (close, row) = match last.and_then(|i| Some((series.candle(i)?, series.row(i)?))) {
            Some((candle, row)) => (candle.close, *row),
            None => return insufficient(),
        };

        let mut bullish = 0usize;
        let mut bearish = 0usize;
        let mut total = 0usize;
        let mut notes = Vec::new();

        if close.is_finite() && row.vwap.is_finite() {
            total += 1;
            if close > row.vwap {
                bullish += 1;
                notes.push(format!("Price above VWAP ({close:.2} > {:.2})", row.vwap));
            } else {
                bearish += 1;
                notes.push(format!("Price below VWAP ({close:.2} < {:.2})", row.vwap));
            }
        }

        if row.ema_fast.is_finite() && row.ema_slow.is_finite() {
            total += 1;
            if row.ema_fast > row.ema_slow {
                bullish += 1;
                notes.push(format!(
                    "EMA fast above EMA slow ({:.2} > {:.2})",
                    row.ema_fast, row.ema_slow
                ));
            } else {
                bearish += 1;
                notes.push(format!(
                    "EMA fast below EMA slow ({:.2} < {:.2})",
                    row.ema_fast, row.ema_slow
                ));
            }
        }

        if row.rsi.is_finite() {
            total += 1;
            if row.rsi > self.rsi_bullish {
                bullish += 1;
                notes.push(format!("RSI bullish regime ({:.1} > {})", row.rsi, self.rsi_bullish));
            } else if row.rsi < self.rsi_bearish {
                bearish += 1;
                notes.push(format!("RSI bearish regime ({:.1} < {})", row.rsi, self.rsi_bearish));
            } else {
                notes.push(format!("RSI neutral zone ({:.1})", row.rsi));
            }
        }

        if total == 0 {
            return insufficient();
        }

        let (bias, confidence) = if bullish > bearish {
            (MarketBias::Bullish, bullish as f64 / total as f64)
        } else if bearish > bullish {
            (MarketBias::Bearish, bearish as f64 / total as f64)
        } else {
            (MarketBias::Neutral, 0.5)
        };

        notes.insert(
            0,
            format!("Bias votes: {bullish}/{total} bullish, {bearish}/{total} bearish"),
        );

        BiasReading {
            bias,
            confidence,
            strength: strength_label(confidence).to_string(),
            notes,
        }
    }
}

fn insufficient() -> BiasReading {
    BiasReading {
        bias: MarketBias::Neutral,
        confidence: 0.0,
        strength: strength_label(0.0).to_string(),
        notes: vec!["Insufficient data for bias classification".to_string()],
    }
}

pub fn strength_label(confidence: f64) -> &'static str {
    if confidence >= 0.9 {
        "Very Strong"
    } else if confidence >= 0.75 {
        "Strong"
    } else if confidence >= 0.6 {
        "Moderate"
    } else if confidence >= 0.4 {
        "Weak"
    } else {
        "Very Weak"
    }
}

/// Bias on 5m and 15m plus the 5m volatility regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub bias_5m: BiasReading,
    pub bias_15m: BiasReading,
    pub volatility_5m: VolatilityRegime,
}

impl MarketSnapshot {
    pub fn capture(
        classifier: &BiasClassifier,
        m5: &TimeframeSeries,
        m15: &TimeframeSeries,
    ) -> Self {
        let atr = m5.indicators().column(|r| r.atr);
        Self {
            bias_5m: classifier.classify(m5),
            bias_15m: classifier.classify(m15),
            volatility_5m: volatility_regime(&atr, DEFAULT_REGIME_LOOKBACK),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timeframe;
    use crate::indicators::{make_candles, IndicatorConfig, IndicatorRow, IndicatorSeries};

    fn single(close: f64, row: IndicatorRow) -> TimeframeSeries {
        let candles = make_candles(&[close]);
        TimeframeSeries::new(Timeframe::M5, candles, IndicatorSeries::from_rows(vec![row])).unwrap()
    }

    #[test]
    fn all_votes_bullish() {
        let row = IndicatorRow {
            vwap: 99.0,
            ema_fast: 100.5,
            ema_slow: 100.0,
            rsi: 62.0,
            ..IndicatorRow::undefined()
        };
        let reading = BiasClassifier::default().classify(&single(100.0, row));
        assert_eq!(reading.bias, MarketBias::Bullish);
        assert_eq!(reading.confidence, 1.0);
        assert_eq!(reading.strength, "Very Strong");
        assert!(reading.notes[0].starts_with("Bias votes: 3/3 bullish"));
    }

    #[test]
    fn neutral_rsi_counts_but_does_not_vote() {
        let row = IndicatorRow {
            vwap: 101.0,
            ema_fast: 100.5,
            ema_slow: 100.0,
            rsi: 50.0,
            ..IndicatorRow::undefined()
        };
        let reading = BiasClassifier::default().classify(&single(100.0, row));
        assert_eq!(reading.bias, MarketBias::Neutral);
        assert_eq!(reading.confidence, 0.5);
        assert_eq!(reading.strength, "Weak");
    }

    #[test]
    fn bearish_majority() {
        let row = IndicatorRow {
            vwap: 101.0,
            ema_fast: 99.0,
            ema_slow: 100.0,
            rsi: 50.0,
            ..IndicatorRow::undefined()
        };
        let reading = BiasClassifier::default().classify(&single(100.0, row));
        assert_eq!(reading.bias, MarketBias::Bearish);
        assert!((reading.confidence - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(reading.strength, "Moderate");
    }

    #[test]
    fn undefined_rows_are_insufficient() {
        let reading = BiasClassifier::default().classify(&single(f64::NAN, IndicatorRow::undefined()));
        assert_eq!(reading.bias, MarketBias::Neutral);
        assert_eq!(reading.confidence, 0.0);

        let empty = TimeframeSeries::new(Timeframe::M5, Vec::new(), IndicatorSeries::new()).unwrap();
        assert_eq!(BiasClassifier::default().classify(&empty).confidence, 0.0);
    }

    #[test]
    fn strength_labels() {
        assert_eq!(strength_label(0.95), "Very Strong");
        assert_eq!(strength_label(0.75), "Strong");
        assert_eq!(strength_label(0.6), "Moderate");
        assert_eq!(strength_label(0.4), "Weak");
        assert_eq!(strength_label(0.1), "Very Weak");
    }

    #[test]
    fn snapshot_of_uptrend() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64 * 0.5).collect();
        let config = IndicatorConfig::default();
        let m5 = TimeframeSeries::with_indicators(Timeframe::M5, make_candles(&closes), &config).unwrap();
        let m15 = TimeframeSeries::with_indicators(Timeframe::M15, make_candles(&closes), &config).unwrap();
        let snapshot = MarketSnapshot::capture(&BiasClassifier::default(), &m5, &m15);
        assert_eq!(snapshot.bias_5m.bias, MarketBias::Bullish);
        assert_eq!(snapshot.bias_15m.bias, MarketBias::Bullish);
    }
}
