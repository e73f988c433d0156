//! Scanner and limiter scenarios on hand-built series.
//!
//! Most fixtures pin every indicator row so each scenario controls exactly which
//! conditions hold. The baseline is a flat market where close == VWAP on 5m, which
//! fails both the buy and the sell gate; a scenario then edits one candle.

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use copilot_core::domain::{Candle, MultiTimeframeInput, Signal, SignalType, Timeframe, TimeframeSeries};
use copilot_core::indicators::{IndicatorConfig, IndicatorRow, IndicatorSeries};
use copilot_core::signals::{generate_signals, FrequencyLimiter, SignalScanner};

fn session_open() -> DateTime<FixedOffset> {
    FixedOffset::west_opt(4 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 3, 9, 30, 0)
        .unwrap()
}

fn flat_candle(ts: DateTime<FixedOffset>) -> Candle {
    Candle::new(ts, 100.0, 100.5, 99.5, 100.0, 1000.0)
}

fn flat_row(hist: f64) -> IndicatorRow {
    IndicatorRow {
        ema_fast: 100.0,
        ema_slow: 100.0,
        rsi: f64::NAN,
        atr: 1.0,
        vwap: 100.0,
        macd: hist,
        macd_signal: 0.0,
    }
}

/// Flat 1m/5m/15m fixture with pinned rows.
struct Fixture {
    m1: TimeframeSeries,
    m5_candles: Vec<Candle>,
    m5_rows: Vec<IndicatorRow>,
    m15: TimeframeSeries,
}

impl Fixture {
    fn flat(m5_len: usize, base_hist: f64) -> Self {
        let start = session_open();
        let m1_len = m5_len * 5 + 10;
        let m1_candles: Vec<Candle> = (0..m1_len)
            .map(|i| flat_candle(start + Duration::minutes(i as i64)))
            .collect();
        let m1_rows = vec![flat_row(0.0); m1_len];

        let m15_len = m5_len / 3 + 1;
        let m15_candles: Vec<Candle> = (0..m15_len)
            .map(|i| flat_candle(start + Duration::minutes(15 * i as i64)))
            .collect();
        let m15_rows = vec![flat_row(0.0); m15_len];

        Self {
            m1: series(Timeframe::M1, m1_candles, m1_rows),
            m5_candles: (0..m5_len)
                .map(|i| flat_candle(start + Duration::minutes(5 * i as i64)))
                .collect(),
            m5_rows: vec![flat_row(base_hist); m5_len],
            m15: series(Timeframe::M15, m15_candles, m15_rows),
        }
    }

    fn m5(&self) -> TimeframeSeries {
        series(Timeframe::M5, self.m5_candles.clone(), self.m5_rows.clone())
    }
}

fn series(tf: Timeframe, candles: Vec<Candle>, rows: Vec<IndicatorRow>) -> TimeframeSeries {
    TimeframeSeries::new(tf, candles, IndicatorSeries::from_rows(rows)).unwrap()
}

#[test]
fn flat_market_emits_nothing() {
    // Real indicators on 25 flat 5m candles (125 flat 1m candles)
    let config = IndicatorConfig::default();
    let start = session_open();
    let m1: Vec<Candle> = (0..125)
        .map(|i| flat_candle(start + Duration::minutes(i)))
        .collect();
    let m5 = copilot_core::data::resample(&m1, Timeframe::M5);
    let m15 = copilot_core::data::resample(&m1, Timeframe::M15);
    assert_eq!(m5.len(), 25);

    let m1 = TimeframeSeries::with_indicators(Timeframe::M1, m1, &config).unwrap();
    let m5 = TimeframeSeries::with_indicators(Timeframe::M5, m5, &config).unwrap();
    let m15 = TimeframeSeries::with_indicators(Timeframe::M15, m15, &config).unwrap();
    let input = MultiTimeframeInput::new(&m1, &m5, &m15);

    let outcome = SignalScanner::default().scan(&input);
    assert!(outcome.signals.is_empty());
    assert_eq!(outcome.stats.candles_evaluated, 5);
    assert!(generate_signals(&input).is_empty());
}

#[test]
fn golden_cross_emits_single_buy() {
    let mut fx = Fixture::flat(25, 0.0);
    let c = &mut fx.m5_candles[22];
    c.close = 101.0;
    c.high = 101.5;
    fx.m5_rows[22].ema_fast = 100.2;
    fx.m5_rows[22].macd = 0.1;
    // fast stays above slow afterwards, so the cross happens only once
    fx.m5_rows[23].ema_fast = 100.2;
    fx.m5_rows[24].ema_fast = 100.2;

    let m5 = fx.m5();
    let input = MultiTimeframeInput::new(&fx.m1, &m5, &fx.m15);
    let signals = generate_signals(&input);

    assert_eq!(signals.len(), 1);
    let signal = &signals[0];
    assert_eq!(signal.signal_type, SignalType::Buy);
    assert_eq!(signal.timestamp, m5.candles()[22].timestamp);
    assert_eq!(signal.price, 101.0);
    assert!(signal
        .conditions
        .contains(&"STRONG: Golden Cross (EMA9 > EMA21)".to_string()));
    assert_eq!(
        signal.conditions,
        vec![
            "5m above VWAP",
            "Gamma elevated (70%)",
            "STRONG: Golden Cross (EMA9 > EMA21)",
        ]
    );
    assert_eq!(signal.strength, 36);
    assert_eq!(signal.label, "BUY (3/8 conditions) [γ=70]");
}

#[test]
fn sell_near_support_is_not_guarded() {
    let mut fx = Fixture::flat(25, 0.02);
    let c = &mut fx.m5_candles[22];
    c.open = 99.5;
    c.close = 99.0;
    c.high = 99.6;
    c.low = 98.9;
    fx.m5_rows[22].macd = -0.1;

    let m5 = fx.m5();
    let input = MultiTimeframeInput::new(&fx.m1, &m5, &fx.m15);
    let outcome = SignalScanner::default().scan(&input);

    // Close sits at the 20-candle low, yet the sell still fires
    assert_eq!(outcome.signals.len(), 1);
    let signal = &outcome.signals[0];
    assert_eq!(signal.signal_type, SignalType::Sell);
    assert!(signal
        .conditions
        .contains(&"STRONG: 5m MACD bearish shift".to_string()));
    assert!(signal.conditions.contains(&"5m below VWAP".to_string()));
}

#[test]
fn buy_near_resistance_is_blocked() {
    let mut fx = Fixture::flat(25, -0.02);
    let c = &mut fx.m5_candles[22];
    c.close = 100.4;
    c.high = 100.45;
    // bullish shift (negative to positive) but histogram still under 0.05
    fx.m5_rows[22].macd = 0.04;

    let m5 = fx.m5();
    let input = MultiTimeframeInput::new(&fx.m1, &m5, &fx.m15);
    let outcome = SignalScanner::default().scan(&input);

    assert!(outcome.signals.is_empty());
    assert_eq!(outcome.stats.buys_blocked_at_resistance, 1);
}

#[test]
fn strong_histogram_lifts_resistance_guard() {
    let mut fx = Fixture::flat(25, -0.02);
    let c = &mut fx.m5_candles[22];
    c.close = 100.4;
    c.high = 100.45;
    fx.m5_rows[22].macd = 0.08;

    let m5 = fx.m5();
    let input = MultiTimeframeInput::new(&fx.m1, &m5, &fx.m15);
    let outcome = SignalScanner::default().scan(&input);

    assert_eq!(outcome.signals.len(), 1);
    assert_eq!(outcome.signals[0].signal_type, SignalType::Buy);
    assert_eq!(outcome.stats.buys_blocked_at_resistance, 0);
}

#[test]
fn low_volume_candle_is_skipped() {
    let mut fx = Fixture::flat(25, 0.0);
    let c = &mut fx.m5_candles[22];
    c.close = 101.0;
    c.high = 101.5;
    c.volume = 400.0;
    fx.m5_rows[22].ema_fast = 100.2;
    fx.m5_rows[22].macd = 0.1;

    let m5 = fx.m5();
    let input = MultiTimeframeInput::new(&fx.m1, &m5, &fx.m15);
    let outcome = SignalScanner::default().scan(&input);

    assert!(outcome.signals.is_empty());
    assert_eq!(outcome.stats.skipped_low_volume, 1);
}

#[test]
fn missing_context_skips_candles() {
    let fx = Fixture::flat(25, 0.0);
    let m5 = fx.m5();
    let empty_m1 = series(Timeframe::M1, Vec::new(), Vec::new());
    let input = MultiTimeframeInput::new(&empty_m1, &m5, &fx.m15);
    let outcome = SignalScanner::default().scan(&input);

    assert!(outcome.signals.is_empty());
    assert_eq!(outcome.stats.skipped_missing_context, 5);
    assert_eq!(outcome.stats.candles_evaluated, 0);
}

#[test]
fn short_history_is_empty_not_error() {
    let fx = Fixture::flat(19, 0.0);
    let m5 = fx.m5();
    let input = MultiTimeframeInput::new(&fx.m1, &m5, &fx.m15);
    let outcome = SignalScanner::default().scan(&input);
    assert!(outcome.signals.is_empty());
    assert_eq!(outcome.stats.candles_evaluated, 0);
}

fn sell_with(ts: DateTime<FixedOffset>, conditions_met: usize) -> Signal {
    let labels = (0..conditions_met).map(|i| format!("condition {i}")).collect();
    Signal::new(ts, 100.0, SignalType::Sell, labels, 50)
}

#[test]
fn limiter_admits_strong_follow_up_after_ten_minutes() {
    let t0 = session_open();
    let limiter = FrequencyLimiter::default();

    // second setup 5 minutes later is dropped, third (7 conditions) 10 minutes
    // after the first is admitted
    let admitted = limiter.apply(vec![
        sell_with(t0, 4),
        sell_with(t0 + Duration::minutes(5), 7),
        sell_with(t0 + Duration::minutes(10), 7),
    ]);
    assert_eq!(admitted.len(), 2);
    assert_eq!(admitted[1].timestamp, t0 + Duration::minutes(10));

    let admitted = limiter.apply(vec![sell_with(t0, 4), sell_with(t0 + Duration::minutes(8), 7)]);
    assert_eq!(admitted.len(), 1);
}
