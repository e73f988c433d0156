//! Signal scanner: walks the 5-minute series and decides emission per candle.
//!
//! Per candle, in order:
//! 1. evaluate conditions (missing 15m/1m context skips the candle)
//! 2. volume pre-filter: skip if volume < 0.5x the mean of the previous 10 candles
//! 3. buy if (count >= 3 or override), close > VWAP and not at resistance;
//!    a buy skips the sell check for that candle
//! 4. sell if (count >= 3 or override) and close < VWAP
//!
//! The resistance guard applies to buys only. There is no support guard for sells.

use super::conditions::{ConditionEvaluator, Evaluation};
use crate::domain::{Candle, MultiTimeframeInput, Signal, SignalType};
use serde::{Deserialize, Serialize};

/// 5m candles required before the first evaluated index.
pub const MIN_HISTORY: usize = 20;
pub const MIN_CONDITIONS: usize = 3;

pub const VOLUME_FILTER_LOOKBACK: usize = 10;
pub const VOLUME_FILTER_RATIO: f64 = 0.5;

pub const RESISTANCE_LOOKBACK: usize = 20;
pub const RESISTANCE_DISTANCE_PCT: f64 = 0.3;
pub const RESISTANCE_MAX_HISTOGRAM: f64 = 0.05;

/// Counters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub candles_evaluated: usize,
    pub skipped_missing_context: usize,
    pub skipped_low_volume: usize,
    pub buys_blocked_at_resistance: usize,
    pub buy_signals: usize,
    pub sell_signals: usize,
}

/// Raw (pre-limiter) signals in scan order plus counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    pub signals: Vec<Signal>,
    pub stats: ScanStats,
}

#[derive(Debug, Clone, Copy)]
pub struct SignalScanner {
    evaluator: ConditionEvaluator,
    min_conditions: usize,
}

impl Default for SignalScanner {
    fn default() -> Self {
        Self::new(ConditionEvaluator::new())
    }
}

impl SignalScanner {
    pub fn new(evaluator: ConditionEvaluator) -> Self {
        Self {
            evaluator,
            min_conditions: MIN_CONDITIONS,
        }
    }

    pub fn scan(&self, input: &MultiTimeframeInput<'_>) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        let candles = input.m5.candles();
        if candles.len() < MIN_HISTORY {
            tracing::debug!(
                candles = candles.len(),
                "not enough 5m history to scan"
            );
            return outcome;
        }

        for i in MIN_HISTORY..candles.len() {
            let evaluation = match self.evaluator.evaluate(input, i) {
                Ok(evaluation) => evaluation,
                Err(reason) => {
                    tracing::debug!(index = i, %reason, "skipping 5m candle");
                    outcome.stats.skipped_missing_context += 1;
                    continue;
                }
            };
            outcome.stats.candles_evaluated += 1;

            if low_volume(candles, i) {
                outcome.stats.skipped_low_volume += 1;
                continue;
            }

            match self.decide(candles, &evaluation, &mut outcome.stats) {
                Some(signal) => {
                    tracing::debug!(
                        timestamp = %signal.timestamp,
                        label = %signal.label,
                        "raw signal"
                    );
                    match signal.signal_type {
                        SignalType::Buy => outcome.stats.buy_signals += 1,
                        SignalType::Sell => outcome.stats.sell_signals += 1,
                    }
                    outcome.signals.push(signal);
                }
                None => continue,
            }
        }

        outcome
    }

    /// Emission decision for one evaluated candle.
    fn decide(
        &self,
        candles: &[Candle],
        evaluation: &Evaluation,
        stats: &mut ScanStats,
    ) -> Option<Signal> {
        let i = evaluation.index;
        let state = &evaluation.state;
        let candle = &candles[i];

        let buy = &evaluation.buy;
        let buy_triggered = buy.count() >= self.min_conditions || buy.override_triggered;
        if buy_triggered && state.close_5m > state.vwap_5m {
            if at_resistance(candles, i, state.hist_5m) {
                stats.buys_blocked_at_resistance += 1;
            } else {
                return Some(Signal::new(
                    candle.timestamp,
                    candle.close,
                    SignalType::Buy,
                    buy.labels.clone(),
                    evaluation.gamma_score,
                ));
            }
        }

        let sell = &evaluation.sell;
        let sell_triggered = sell.count() >= self.min_conditions || sell.override_triggered;
        if sell_triggered && state.close_5m < state.vwap_5m {
            return Some(Signal::new(
                candle.timestamp,
                candle.close,
                SignalType::Sell,
                sell.labels.clone(),
                evaluation.gamma_score,
            ));
        }

        None
    }
}

/// Volume below half the mean of the previous candles.
pub fn low_volume(candles: &[Candle], i: usize) -> bool {
    let start = i.saturating_sub(VOLUME_FILTER_LOOKBACK);
    let window = &candles[start..i];
    if window.is_empty() {
        return false;
    }
    let avg = window.iter().map(|c| c.volume).sum::<f64>() / window.len() as f64;
    candles[i].volume < avg * VOLUME_FILTER_RATIO
}

/// Close within 0.3% of the 20-candle high while the 5m histogram is weak.
pub fn at_resistance(candles: &[Candle], i: usize, hist_5m: f64) -> bool {
    if i < RESISTANCE_LOOKBACK {
        return false;
    }
    let recent_high = candles[i - RESISTANCE_LOOKBACK..i]
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);
    let close = candles[i].close;
    let distance_pct = (recent_high - close) / close * 100.0;
    distance_pct < RESISTANCE_DISTANCE_PCT && hist_5m < RESISTANCE_MAX_HISTOGRAM
}
