//! Market Copilot Runner: backtesting, suggestions, reports, multi-ticker analysis.
//!
//! This crate builds on `copilot-core` to provide:
//! - Candle loading from CSV, a live provider, or synthetic generation
//! - Forward-window signal backtesting with per-side accuracy
//! - Rule-based improvement suggestions and a plain-text report
//! - TOML analysis configuration
//! - The analysis pipeline, parallel across tickers

pub mod backtest;
pub mod config;
pub mod data_loader;
pub mod pipeline;
pub mod report;
pub mod suggestions;

pub use backtest::{BacktestResult, FailedSignal, SignalBacktester, SignalOutcome};
pub use config::{AnalysisConfig, BacktestSettings, ConfigError, FetchSettings};
pub use data_loader::{
    fetch_frames, load_frames, save_frames, synthetic_frames, CandleFrames, LoadError,
};
pub use pipeline::{analyze, analyze_many, AnalysisError, AnalysisReport, PreparedFrames};
pub use report::{write_json, ReportError, TextReportGenerator};
pub use suggestions::suggest_improvements;
