//! End-to-end analysis for one or more tickers.
//!
//! candles → indicators per timeframe → scan + limiter → backtest → suggestions,
//! plus a bias snapshot of the latest candle. Each ticker is independent, so
//! `analyze_many` fans out over rayon with no shared state.

use crate::backtest::{BacktestResult, SignalBacktester};
use crate::config::AnalysisConfig;
use crate::data_loader::CandleFrames;
use crate::suggestions::suggest_improvements;
use copilot_core::data::DataSource;
use copilot_core::domain::{MultiTimeframeInput, SeriesError, Signal, Timeframe, TimeframeSeries};
use copilot_core::indicators::IndicatorConfig;
use copilot_core::signals::{
    generate_signals_with, BiasClassifier, MarketSnapshot, ScanOutcome, ScanStats, SignalScanner,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid {symbol} series: {source}")]
    Series {
        symbol: String,
        #[source]
        source: SeriesError,
    },
}

/// Candles with indicators for all three timeframes.
#[derive(Debug, Clone)]
pub struct PreparedFrames {
    pub m1: TimeframeSeries,
    pub m5: TimeframeSeries,
    pub m15: TimeframeSeries,
}

impl PreparedFrames {
    pub fn input(&self) -> MultiTimeframeInput<'_> {
        MultiTimeframeInput::new(&self.m1, &self.m5, &self.m15)
    }
}

/// Compute indicators for every timeframe.
pub fn prepare(frames: &CandleFrames, indicators: &IndicatorConfig) -> Result<PreparedFrames, AnalysisError> {
    let build = |timeframe: Timeframe| {
        TimeframeSeries::with_indicators(timeframe, frames.get(timeframe).to_vec(), indicators).map_err(
            |source| AnalysisError::Series {
                symbol: frames.symbol.clone(),
                source,
            },
        )
    };
    Ok(PreparedFrames {
        m1: build(Timeframe::M1)?,
        m5: build(Timeframe::M5)?,
        m15: build(Timeframe::M15)?,
    })
}

/// Scan and limit with the configured thresholds.
pub fn scan(prepared: &PreparedFrames, config: &AnalysisConfig) -> ScanOutcome {
    generate_signals_with(&prepared.input(), &SignalScanner::default(), &config.limiter)
}

/// Backtest admitted signals against the 5m candles they came from.
pub fn backtest(prepared: &PreparedFrames, signals: &[Signal], config: &AnalysisConfig) -> BacktestResult {
    SignalBacktester::new(config.backtest.lookforward_candles).evaluate(prepared.m5.candles(), signals)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandleCounts {
    pub m1: usize,
    pub m5: usize,
    pub m15: usize,
}

/// Everything one analysis run produces. JSON-serializable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub source: DataSource,
    pub synthetic: bool,
    /// BLAKE3 over the symbol and its 5m candles.
    pub dataset_hash: String,
    pub config_id: String,
    pub candles: CandleCounts,
    pub scan: ScanStats,
    pub signals: Vec<Signal>,
    pub backtest: BacktestResult,
    pub suggestions: Vec<String>,
    pub snapshot: MarketSnapshot,
}

pub fn analyze(frames: &CandleFrames, config: &AnalysisConfig) -> Result<AnalysisReport, AnalysisError> {
    let prepared = prepare(frames, &config.indicators)?;
    let outcome = scan(&prepared, config);
    let backtest = backtest(&prepared, &outcome.signals, config);
    let suggestions = suggest_improvements(&backtest);
    let snapshot = MarketSnapshot::capture(&BiasClassifier::default(), &prepared.m5, &prepared.m15);

    tracing::info!(
        symbol = %frames.symbol,
        signals = outcome.signals.len(),
        evaluated = outcome.stats.candles_evaluated,
        accuracy = backtest.overall_accuracy,
        "analysis complete"
    );

    Ok(AnalysisReport {
        symbol: frames.symbol.clone(),
        source: frames.source,
        synthetic: frames.is_synthetic(),
        dataset_hash: frames.dataset_hash(),
        config_id: config.config_id(),
        candles: CandleCounts {
            m1: prepared.m1.len(),
            m5: prepared.m5.len(),
            m15: prepared.m15.len(),
        },
        scan: outcome.stats,
        signals: outcome.signals,
        backtest,
        suggestions,
        snapshot,
    })
}

/// Analyze independent tickers in parallel. Results keep the input order.
pub fn analyze_many(
    frames: &[CandleFrames],
    config: &AnalysisConfig,
) -> Vec<Result<AnalysisReport, AnalysisError>> {
    frames.par_iter().map(|f| analyze(f, config)).collect()
}
