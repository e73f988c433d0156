//! Condition evaluation for one 5-minute candle.
//!
//! Gathers the 1m/5m/15m values the rules read into a `MarketState`, then scores
//! the buy and sell sides independently. Scoring is a pure function of the state:
//! each side accumulates its condition labels in a fixed order, and the label count
//! drives the emission thresholds.
//!
//! Two overrides per side can trigger a signal on their own (EMA cross with MACD
//! and VWAP agreement, 5m MACD histogram shift). When they fire they also add a
//! label, so `count` includes them.
//!
//! NaN inputs never satisfy a comparison, so undefined indicators count as false.

use super::context::{entry_context, trend_context, EntryContext, MissingContext, TrendContext};
use super::gamma::{gamma_score, GAMMA_ELEVATED};
use crate::domain::MultiTimeframeInput;
use serde::{Deserialize, Serialize};

pub const VWAP_PULLBACK_PCT: f64 = 0.3;
pub const EMA_PULLBACK_PCT: f64 = 0.2;
pub const VOLUME_CONFIRM_RATIO: f64 = 1.05;
pub const MACD_SHIFT_RATIO: f64 = 1.5;

pub const GOLDEN_CROSS_LABEL: &str = "STRONG: Golden Cross (EMA9 > EMA21)";
pub const DEATH_CROSS_LABEL: &str = "STRONG: Death Cross (EMA9 < EMA21)";
pub const BULLISH_SHIFT_LABEL: &str = "STRONG: 5m MACD bullish shift";
pub const BEARISH_SHIFT_LABEL: &str = "STRONG: 5m MACD bearish shift";

/// Every value the buy and sell rules read at one 5m candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketState {
    pub close_5m: f64,
    pub volume_5m: f64,
    pub vwap_5m: f64,
    pub ema_fast_5m: f64,
    pub rsi_5m: f64,
    pub hist_5m: f64,
    pub prev_hist_5m: f64,
    pub golden_cross: bool,
    pub death_cross: bool,
    pub gamma_score: u32,
    pub trend: TrendContext,
    pub entry: EntryContext,
}

/// Outcome for one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEvaluation {
    pub labels: Vec<String>,
    /// Either override (cross or MACD shift) fired.
    pub override_triggered: bool,
}

impl SideEvaluation {
    pub fn count(&self) -> usize {
        self.labels.len()
    }

    fn push(&mut self, label: impl Into<String>) {
        self.labels.push(label.into());
    }
}

/// Both sides scored at one 5m candle, plus the snapshot the scanner gates on.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub index: usize,
    pub buy: SideEvaluation,
    pub sell: SideEvaluation,
    pub gamma_score: u32,
    pub golden_cross: bool,
    pub death_cross: bool,
    pub state: MarketState,
}

/// Stateless evaluator over a multi-timeframe input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Score both sides at 5m index `i`.
    pub fn evaluate(
        &self,
        input: &MultiTimeframeInput<'_>,
        i: usize,
    ) -> Result<Evaluation, MissingContext> {
        let state = self.market_state(input, i)?;
        Ok(Evaluation {
            index: i,
            buy: score_buy(&state),
            sell: score_sell(&state),
            gamma_score: state.gamma_score,
            golden_cross: state.golden_cross,
            death_cross: state.death_cross,
            state,
        })
    }

    /// Collect the 5m values at `i` and the 15m/1m context at its timestamp.
    pub fn market_state(
        &self,
        input: &MultiTimeframeInput<'_>,
        i: usize,
    ) -> Result<MarketState, MissingContext> {
        let m5 = input.m5;
        let len = m5.len();
        if i == 0 || i >= len {
            return Err(MissingContext::NoHistory { index: i, len });
        }

        let candles = m5.candles();
        let rows = m5.indicators().rows();
        let candle = &candles[i];
        let row = rows[i];
        let prev = rows[i - 1];

        let golden_cross = prev.ema_fast <= prev.ema_slow && row.ema_fast > row.ema_slow;
        let death_cross = prev.ema_fast > prev.ema_slow && row.ema_fast <= row.ema_slow;

        let atr = m5.indicators().column(|r| r.atr);
        let gamma = gamma_score(candles, &atr, i);

        let trend = trend_context(input.m15, candle.timestamp)?;
        let entry = entry_context(input.m1, candle.timestamp)?;

        Ok(MarketState {
            close_5m: candle.close,
            volume_5m: candle.volume,
            vwap_5m: row.vwap,
            ema_fast_5m: row.ema_fast,
            rsi_5m: row.rsi,
            hist_5m: row.macd_histogram(),
            prev_hist_5m: prev.macd_histogram(),
            golden_cross,
            death_cross,
            gamma_score: gamma,
            trend,
            entry,
        })
    }
}

/// Percent distance of `price` above `reference`.
fn pct_above(price: f64, reference: f64) -> f64 {
    (price - reference) / reference * 100.0
}

fn in_open_range(value: f64, upper: f64) -> bool {
    value > 0.0 && value < upper
}

pub fn score_buy(s: &MarketState) -> SideEvaluation {
    let e = &s.entry;
    let mut side = SideEvaluation::default();

    if s.trend.close > s.trend.vwap {
        side.push("15m above VWAP");
    }
    if s.close_5m > s.vwap_5m {
        side.push("5m above VWAP");
    }
    if in_open_range(pct_above(e.close, e.vwap), VWAP_PULLBACK_PCT) {
        side.push("1m pullback to VWAP");
    } else if in_open_range(pct_above(e.close, s.ema_fast_5m), EMA_PULLBACK_PCT) {
        side.push("1m near EMA9");
    }
    if (35.0..=60.0).contains(&e.rsi) && e.rsi > s.rsi_5m - 5.0 {
        side.push("RSI rising 35-60");
    }
    if e.macd_increasing() && e.histogram > 0.0 {
        side.push("MACD increasing");
    }
    if e.volume > e.avg_volume * VOLUME_CONFIRM_RATIO {
        side.push("Volume above average");
    }
    if s.trend.histogram > 0.0 {
        side.push("15m MACD positive");
    }
    if s.gamma_score >= GAMMA_ELEVATED {
        side.push(format!("Gamma elevated ({}%)", s.gamma_score));
    }

    if s.golden_cross && s.hist_5m > 0.0 && s.close_5m > s.vwap_5m {
        side.push(GOLDEN_CROSS_LABEL);
        side.override_triggered = true;
    }
    if bullish_shift(s.prev_hist_5m, s.hist_5m) {
        side.push(BULLISH_SHIFT_LABEL);
        side.override_triggered = true;
    }

    side
}

pub fn score_sell(s: &MarketState) -> SideEvaluation {
    let e = &s.entry;
    let mut side = SideEvaluation::default();

    if s.trend.close < s.trend.vwap {
        side.push("15m below VWAP");
    }
    if s.close_5m < s.vwap_5m {
        side.push("5m below VWAP");
    }
    if e.close < e.vwap && e.high > e.vwap {
        side.push("Failed VWAP reclaim");
    } else if e.close < s.ema_fast_5m && e.high > s.ema_fast_5m {
        side.push("Failed EMA9 reclaim");
    }
    if (40.0..=65.0).contains(&e.rsi) && e.rsi < s.rsi_5m + 5.0 {
        side.push("RSI falling 65-40");
    }
    if !e.macd_increasing() && e.histogram < 0.0 {
        side.push("MACD decreasing");
    }
    if e.volume > e.avg_volume * VOLUME_CONFIRM_RATIO {
        side.push("Volume above average");
    }
    if s.trend.histogram < 0.0 {
        side.push("15m MACD negative");
    }
    if s.gamma_score >= GAMMA_ELEVATED {
        side.push(format!("Gamma elevated ({}%)", s.gamma_score));
    }

    if s.death_cross && s.hist_5m < 0.0 && s.close_5m < s.vwap_5m {
        side.push(DEATH_CROSS_LABEL);
        side.override_triggered = true;
    }
    if bearish_shift(s.prev_hist_5m, s.hist_5m) {
        side.push(BEARISH_SHIFT_LABEL);
        side.override_triggered = true;
    }

    side
}

/// Histogram crosses zero upward, or grows by at least half while positive.
pub fn bullish_shift(prev: f64, curr: f64) -> bool {
    (prev < 0.0 && curr > 0.0) || (prev > 0.0 && curr > prev * MACD_SHIFT_RATIO)
}

/// Histogram crosses zero downward, or deepens by at least half while negative.
pub fn bearish_shift(prev: f64, curr: f64) -> bool {
    (prev > 0.0 && curr < 0.0) || (prev < 0.0 && curr < prev * MACD_SHIFT_RATIO)
}
