//! Market Copilot Core: candles, indicators, multi-timeframe signal engine, data supply.
//!
//! This crate contains the signal engine:
//! - Domain types (candles, timeframes, series, signals)
//! - Indicator computation (EMA, RSI, ATR, VWAP, MACD, volatility regime)
//! - Condition evaluation across 1m/5m/15m, the 5m scanner and the frequency limiter
//! - Bias snapshot for the latest candle
//! - Candle supply (Yahoo chart API, CSV files, resampling) behind a shared rate limiter

pub mod data;
pub mod domain;
pub mod indicators;
pub mod signals;

pub use domain::{Candle, MultiTimeframeInput, Signal, SignalType, Timeframe, TimeframeSeries};
pub use signals::generate_signals;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: domain and result types are Send + Sync, so independent
    /// tickers can be scanned on worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::TimeframeSeries>();
        require_sync::<domain::TimeframeSeries>();
        require_send::<MultiTimeframeInput<'static>>();
        require_sync::<MultiTimeframeInput<'static>>();
        require_send::<indicators::IndicatorSeries>();
        require_sync::<indicators::IndicatorSeries>();

        require_send::<signals::SignalScanner>();
        require_sync::<signals::SignalScanner>();
        require_send::<signals::FrequencyLimiter>();
        require_sync::<signals::FrequencyLimiter>();
        require_send::<signals::ScanOutcome>();
        require_sync::<signals::ScanOutcome>();
        require_send::<signals::MarketSnapshot>();
        require_sync::<signals::MarketSnapshot>();

        require_send::<data::RateLimiter>();
        require_sync::<data::RateLimiter>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
    }

    #[test]
    fn scanner_keeps_no_state_between_calls() {
        let config = indicators::IndicatorConfig::default();
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let candles = indicators::make_candles(&closes);
        let m5 = TimeframeSeries::with_indicators(Timeframe::M5, candles.clone(), &config).unwrap();
        let m15 = TimeframeSeries::with_indicators(Timeframe::M15, candles.clone(), &config).unwrap();
        let m1 = TimeframeSeries::with_indicators(Timeframe::M1, candles, &config).unwrap();
        let input = MultiTimeframeInput::new(&m1, &m5, &m15);

        let scanner = signals::SignalScanner::default();
        assert_eq!(scanner.scan(&input), scanner.scan(&input));
    }
}
