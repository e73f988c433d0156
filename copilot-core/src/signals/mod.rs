//! Multi-timeframe signal engine.
//!
//! The scanner walks 5m candles and asks the condition evaluator to score each one
//! against 15m trend context and 1m entry timing. Raw signals then pass through the
//! frequency limiter. Everything here is pure computation over an immutable input.

pub mod bias;
pub mod conditions;
pub mod context;
pub mod gamma;
pub mod limiter;
pub mod scanner;

pub use bias::{strength_label, BiasClassifier, BiasReading, MarketBias, MarketSnapshot};
pub use conditions::{ConditionEvaluator, Evaluation, MarketState, SideEvaluation};
pub use context::{EntryContext, MissingContext, TrendContext};
pub use gamma::gamma_score;
pub use limiter::FrequencyLimiter;
pub use scanner::{ScanOutcome, ScanStats, SignalScanner};

use crate::domain::{MultiTimeframeInput, Signal};

/// Scan with default thresholds and apply the default frequency limiter.
pub fn generate_signals(input: &MultiTimeframeInput<'_>) -> Vec<Signal> {
    generate_signals_with(input, &SignalScanner::default(), &FrequencyLimiter::default()).signals
}

/// Scan then limit. The returned stats describe the raw scan.
pub fn generate_signals_with(
    input: &MultiTimeframeInput<'_>,
    scanner: &SignalScanner,
    limiter: &FrequencyLimiter,
) -> ScanOutcome {
    let raw = scanner.scan(input);
    let raw_count = raw.signals.len();
    let signals = limiter.apply(raw.signals);
    tracing::debug!(raw = raw_count, admitted = signals.len(), "signal scan complete");
    ScanOutcome {
        signals,
        stats: raw.stats,
    }
}
