//! Property tests for signal engine invariants.
//!
//! Uses proptest on random-walk sessions to verify:
//! 1. Determinism: two runs over the same input agree
//! 2. Ordering: signal timestamps strictly increase (one signal per candle at most)
//! 3. Strength: strength == min(100, conditions_met * 12)
//! 4. Trend alignment: buys above 5m VWAP, sells below
//! 5. Frequency: consecutive signals respect the limiter gaps
//! 6. No look-ahead: truncating the 5m input does not change earlier signals

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use copilot_core::data::resample;
use copilot_core::domain::{Candle, MultiTimeframeInput, SignalType, Timeframe, TimeframeSeries};
use copilot_core::indicators::IndicatorConfig;
use copilot_core::signals::{generate_signals, SignalScanner};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

/// 1m price changes and volumes for one session.
fn arb_session() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-0.4..0.4_f64, 200.0..5000.0_f64), 150..300)
}

fn session_open() -> DateTime<FixedOffset> {
    FixedOffset::west_opt(4 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 3, 9, 30, 0)
        .unwrap()
}

fn build_minutes(steps: &[(f64, f64)]) -> Vec<Candle> {
    let start = session_open();
    let mut price = 500.0;
    steps
        .iter()
        .enumerate()
        .map(|(i, &(change, volume))| {
            let open = price;
            price = (price + change).max(1.0);
            let wick = change.abs() * 0.5 + 0.05;
            Candle::new(
                start + Duration::minutes(i as i64),
                open,
                open.max(price) + wick,
                open.min(price) - wick,
                price,
                volume.round(),
            )
        })
        .collect()
}

struct Frames {
    m1: TimeframeSeries,
    m5: TimeframeSeries,
    m15: TimeframeSeries,
}

fn frames(minutes: Vec<Candle>) -> Frames {
    let config = IndicatorConfig::default();
    let m5 = resample(&minutes, Timeframe::M5);
    let m15 = resample(&minutes, Timeframe::M15);
    Frames {
        m1: TimeframeSeries::with_indicators(Timeframe::M1, minutes, &config).unwrap(),
        m5: TimeframeSeries::with_indicators(Timeframe::M5, m5, &config).unwrap(),
        m15: TimeframeSeries::with_indicators(Timeframe::M15, m15, &config).unwrap(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scan_is_deterministic(steps in arb_session()) {
        let f = frames(build_minutes(&steps));
        let input = MultiTimeframeInput::new(&f.m1, &f.m5, &f.m15);
        prop_assert_eq!(generate_signals(&input), generate_signals(&input));
    }

    #[test]
    fn signals_are_ordered_and_well_formed(steps in arb_session()) {
        let f = frames(build_minutes(&steps));
        let input = MultiTimeframeInput::new(&f.m1, &f.m5, &f.m15);
        let raw = SignalScanner::default().scan(&input).signals;

        for pair in raw.windows(2) {
            prop_assert!(pair[1].timestamp > pair[0].timestamp);
        }

        for signal in &raw {
            prop_assert_eq!(signal.conditions_met, signal.conditions.len());
            prop_assert_eq!(signal.strength, (signal.conditions_met as u32 * 12).min(100));
            prop_assert!(signal.strength <= 100);

            let i = f.m5.index_of(signal.timestamp).unwrap();
            prop_assert!(i >= 20);
            let vwap = f.m5.row(i).unwrap().vwap;
            prop_assert_eq!(signal.price, f.m5.candles()[i].close);
            match signal.signal_type {
                SignalType::Buy => prop_assert!(signal.price > vwap),
                SignalType::Sell => prop_assert!(signal.price < vwap),
            }
        }
    }

    #[test]
    fn admitted_signals_respect_gaps(steps in arb_session()) {
        let f = frames(build_minutes(&steps));
        let input = MultiTimeframeInput::new(&f.m1, &f.m5, &f.m15);
        let signals = generate_signals(&input);

        for pair in signals.windows(2) {
            let gap = pair[1].timestamp - pair[0].timestamp;
            prop_assert!(
                gap >= Duration::minutes(15)
                    || (pair[1].conditions_met >= 6 && gap >= Duration::minutes(10)),
                "gap {:?} with {} conditions", gap, pair[1].conditions_met
            );
        }
    }

    #[test]
    fn truncation_does_not_change_earlier_signals(steps in arb_session(), cut in 0.5..0.9_f64) {
        let minutes = build_minutes(&steps);
        let keep = ((minutes.len() as f64) * cut) as usize;
        let full = frames(minutes.clone());
        let part = frames(minutes[..keep].to_vec());

        let full_raw = SignalScanner::default()
            .scan(&MultiTimeframeInput::new(&full.m1, &full.m5, &full.m15))
            .signals;
        let part_raw = SignalScanner::default()
            .scan(&MultiTimeframeInput::new(&part.m1, &part.m5, &part.m15))
            .signals;

        // The last partial 5m/15m bucket differs between the two runs, so compare
        // only signals strictly before the truncated data's last 15m bucket.
        let horizon = part.m15.candles().last().map(|c| c.timestamp);
        if let Some(horizon) = horizon {
            let before = |s: &&copilot_core::domain::Signal| s.timestamp < horizon;
            let a: Vec<_> = full_raw.iter().filter(before).collect();
            let b: Vec<_> = part_raw.iter().filter(before).collect();
            prop_assert_eq!(a, b);
        }
    }
}
