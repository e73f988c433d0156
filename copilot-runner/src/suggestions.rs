//! Rule-based improvement suggestions from failed signals.
//!
//! Fixed templates keyed on simple ratios over `failed_signal_patterns` and the
//! per-side accuracies. Ratios are compared inclusively (a failure share of exactly
//! 50% counts as "at least half").

use crate::backtest::{BacktestResult, FailedSignal};
use copilot_core::domain::SignalType;

/// Strength below which a signal is weak.
pub const WEAK_STRENGTH: u32 = 50;
/// Strength at or above which a failed signal is listed individually.
pub const STRONG_STRENGTH: u32 = 70;
/// Strong failures listed individually.
pub const STRONG_FAILURES_SHOWN: usize = 3;
/// Per-side accuracy (percent) below which tightening is suggested.
pub const LOW_ACCURACY: f64 = 40.0;

const WEAK_SHARE_PCT: usize = 50;
const COUNTER_TREND_SHARE_PCT: usize = 40;
const RISKY_SHARE_PCT: usize = 30;

pub const ALL_PROFITABLE: &str = "All signals were profitable!";

/// Suggestions for one backtest, in a stable order.
pub fn suggest_improvements(result: &BacktestResult) -> Vec<String> {
    let failed = &result.failed_signal_patterns;
    if failed.is_empty() {
        return vec![ALL_PROFITABLE.to_string()];
    }

    let mut out = Vec::new();
    let total = failed.len();

    let weak = failed.iter().filter(|s| s.strength < WEAK_STRENGTH).count();
    if at_least_share(weak, total, WEAK_SHARE_PCT) {
        out.push(format!(
            "WARNING: {weak}/{total} failed signals were WEAK (<{WEAK_STRENGTH}%). \
             Consider raising minimum threshold to 45-50%."
        ));
    }

    let strong: Vec<&FailedSignal> = failed
        .iter()
        .filter(|s| s.strength >= STRONG_STRENGTH)
        .collect();
    if !strong.is_empty() {
        out.push(format!(
            "WARNING: {} STRONG signals (>={STRONG_STRENGTH}%) failed. These need investigation:",
            strong.len()
        ));
        for s in strong.iter().take(STRONG_FAILURES_SHOWN) {
            out.push(format!(
                "   - {} at ${:.2} ({}): lost ${:.2}",
                side_upper(s.signal_type),
                s.price,
                s.label,
                s.pnl.abs()
            ));
        }
    }

    let counter_trend = failed.iter().filter(|s| s.label.contains("COUNTER-TREND")).count();
    if at_least_share(counter_trend, total, COUNTER_TREND_SHARE_PCT) {
        out.push(format!(
            "WARNING: Counter-trend signals have {counter_trend}/{total} failures. \
             Consider reducing RSI reversal weight."
        ));
    }

    let risky = failed.iter().filter(|s| s.label.contains("RISKY")).count();
    if at_least_share(risky, total, RISKY_SHARE_PCT) {
        out.push(
            "WARNING: RISKY signals (against RSI) failing frequently. \
             Consider blocking signals against extreme RSI."
                .to_string(),
        );
    }

    if result.buy_accuracy < LOW_ACCURACY {
        out.push(format!(
            "WARNING: BUY accuracy is only {:.1}%. Consider:",
            result.buy_accuracy
        ));
        out.push("   - Increase weight on upward momentum factor".into());
        out.push("   - Require EMA9 > EMA21 for all buys".into());
        out.push("   - Add pullback detection (don't buy into resistance)".into());
    }

    if result.sell_accuracy < LOW_ACCURACY {
        out.push(format!(
            "WARNING: SELL accuracy is only {:.1}%. Consider:",
            result.sell_accuracy
        ));
        out.push("   - Increase weight on downward momentum factor".into());
        out.push("   - Require EMA9 < EMA21 for all sells".into());
        out.push("   - Add bounce detection (don't sell into support)".into());
    }

    out
}

/// `count / total >= pct / 100` without floating point.
fn at_least_share(count: usize, total: usize, pct: usize) -> bool {
    count > 0 && count * 100 >= total * pct
}

fn side_upper(side: SignalType) -> &'static str {
    match side {
        SignalType::Buy => "BUY",
        SignalType::Sell => "SELL",
    }
}
