//! Trade signal events emitted by the scanner.
//!
//! Signals describe a market event at one 5-minute candle. They are immutable once
//! emitted and carry the condition labels that caused them.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of base conditions per side, used in the label ("N/8").
pub const BASE_CONDITION_COUNT: usize = 8;

/// Strength points per met condition.
pub const STRENGTH_PER_CONDITION: u32 = 12;

/// Side of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Buy,
    Sell,
}

impl SignalType {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalType::Buy => "buy",
            SignalType::Sell => "sell",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A buy or sell event at a 5-minute candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: DateTime<FixedOffset>,
    /// 5m close at the signal candle.
    pub price: f64,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    /// 0..=100, `min(100, conditions_met * 12)`.
    pub strength: u32,
    pub conditions_met: usize,
    pub conditions: Vec<String>,
    pub label: String,
}

impl Signal {
    /// Build a signal from the accumulated condition labels.
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        price: f64,
        signal_type: SignalType,
        conditions: Vec<String>,
        gamma_score: u32,
    ) -> Self {
        let conditions_met = conditions.len();
        Self {
            timestamp,
            price,
            signal_type,
            strength: strength_for(conditions_met),
            conditions_met,
            label: format_label(signal_type, conditions_met, gamma_score),
            conditions,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.signal_type == SignalType::Buy
    }
}

/// `min(100, conditions_met * 12)`.
pub fn strength_for(conditions_met: usize) -> u32 {
    let raw = (conditions_met as u32).saturating_mul(STRENGTH_PER_CONDITION);
    raw.min(100)
}

/// `"BUY (N/8 conditions) [γ=G]"` or the SELL equivalent.
pub fn format_label(signal_type: SignalType, conditions_met: usize, gamma_score: u32) -> String {
    let side = match signal_type {
        SignalType::Buy => "BUY",
        SignalType::Sell => "SELL",
    };
    format!("{side} ({conditions_met}/{BASE_CONDITION_COUNT} conditions) [γ={gamma_score}]")
}
