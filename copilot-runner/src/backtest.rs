//! Forward-window signal backtester.
//!
//! Each signal is located in the 5m candle series by exact timestamp and judged
//! by the close `lookforward_candles` later (or the last candle, if the series ends
//! first). A signal whose timestamp is not in the series, or whose window holds
//! fewer than two candles, is skipped and never counted as a win or a loss.

use chrono::{DateTime, FixedOffset};
use copilot_core::domain::{Candle, Signal, SignalType};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOOKFORWARD_CANDLES: usize = 5;

/// Per-signal forward performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalOutcome {
    pub timestamp: DateTime<FixedOffset>,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub price: f64,
    pub strength: u32,
    pub profitable: bool,
    /// Final close minus price for buys, price minus final close for sells.
    pub pnl: f64,
    /// Highest high in the window minus price.
    pub max_gain: f64,
    /// Price minus lowest low in the window.
    pub max_loss: f64,
}

/// A losing signal, kept for pattern analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedSignal {
    pub timestamp: DateTime<FixedOffset>,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub price: f64,
    pub pnl: f64,
    pub strength: u32,
    pub label: String,
}

/// Aggregate backtest statistics. Built once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub lookforward_candles: usize,
    /// Every signal handed to the backtester, including skipped ones.
    pub total_signals: usize,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub profitable_buys: usize,
    pub profitable_sells: usize,
    pub losing_buys: usize,
    pub losing_sells: usize,
    pub buy_accuracy: f64,
    pub sell_accuracy: f64,
    pub overall_accuracy: f64,
    /// Signals not found in the series or too close to its end.
    pub skipped_signals: usize,
    pub signal_details: Vec<SignalOutcome>,
    pub failed_signal_patterns: Vec<FailedSignal>,
}

impl BacktestResult {
    fn empty(lookforward_candles: usize, total_signals: usize) -> Self {
        Self {
            lookforward_candles,
            total_signals,
            buy_signals: 0,
            sell_signals: 0,
            profitable_buys: 0,
            profitable_sells: 0,
            losing_buys: 0,
            losing_sells: 0,
            buy_accuracy: 0.0,
            sell_accuracy: 0.0,
            overall_accuracy: 0.0,
            skipped_signals: 0,
            signal_details: Vec::new(),
            failed_signal_patterns: Vec::new(),
        }
    }

    /// Signals that produced an outcome.
    pub fn evaluated_signals(&self) -> usize {
        self.buy_signals + self.sell_signals
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalBacktester {
    lookforward_candles: usize,
}

impl Default for SignalBacktester {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKFORWARD_CANDLES)
    }
}

impl SignalBacktester {
    pub fn new(lookforward_candles: usize) -> Self {
        Self {
            lookforward_candles,
        }
    }

    pub fn lookforward_candles(&self) -> usize {
        self.lookforward_candles
    }

    /// Judge one signal, or `None` when it cannot be located or has no forward data.
    pub fn outcome(&self, candles: &[Candle], signal: &Signal) -> Option<SignalOutcome> {
        let Ok(idx) = candles.binary_search_by(|c| c.timestamp.cmp(&signal.timestamp)) else {
            tracing::debug!(timestamp = %signal.timestamp, "signal timestamp not in series, skipped");
            return None;
        };
        let end = (idx + self.lookforward_candles).min(candles.len() - 1);
        let window = &candles[idx..=end];
        if window.len() < 2 {
            tracing::debug!(timestamp = %signal.timestamp, "no forward candles, skipped");
            return None;
        }

        let high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let final_close = window[window.len() - 1].close;
        let pnl = match signal.signal_type {
            SignalType::Buy => final_close - signal.price,
            SignalType::Sell => signal.price - final_close,
        };

        Some(SignalOutcome {
            timestamp: signal.timestamp,
            signal_type: signal.signal_type,
            price: signal.price,
            strength: signal.strength,
            profitable: pnl > 0.0,
            pnl,
            max_gain: high - signal.price,
            max_loss: signal.price - low,
        })
    }

    /// Replay `signals` against the candle series they were generated from.
    ///
    /// `candles` must be sorted by timestamp, as every `TimeframeSeries` is.
    pub fn evaluate(&self, candles: &[Candle], signals: &[Signal]) -> BacktestResult {
        let mut result = BacktestResult::empty(self.lookforward_candles, signals.len());

        for signal in signals {
            let Some(outcome) = self.outcome(candles, signal) else {
                result.skipped_signals += 1;
                continue;
            };

            match (signal.signal_type, outcome.profitable) {
                (SignalType::Buy, true) => result.profitable_buys += 1,
                (SignalType::Buy, false) => result.losing_buys += 1,
                (SignalType::Sell, true) => result.profitable_sells += 1,
                (SignalType::Sell, false) => result.losing_sells += 1,
            }
            match signal.signal_type {
                SignalType::Buy => result.buy_signals += 1,
                SignalType::Sell => result.sell_signals += 1,
            }

            if !outcome.profitable {
                result.failed_signal_patterns.push(FailedSignal {
                    timestamp: signal.timestamp,
                    signal_type: signal.signal_type,
                    price: signal.price,
                    pnl: outcome.pnl,
                    strength: signal.strength,
                    label: signal.label.clone(),
                });
            }
            result.signal_details.push(outcome);
        }

        result.buy_accuracy = percent(result.profitable_buys, result.buy_signals);
        result.sell_accuracy = percent(result.profitable_sells, result.sell_signals);
        // Skipped signals stay in the denominator.
        result.overall_accuracy = percent(
            result.profitable_buys + result.profitable_sells,
            result.total_signals,
        );

        tracing::debug!(
            total = result.total_signals,
            evaluated = result.evaluated_signals(),
            skipped = result.skipped_signals,
            "backtest complete"
        );
        result
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
