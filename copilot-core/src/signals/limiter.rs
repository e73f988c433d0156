//! Frequency limiter: greedy minimum-gap filter over the raw signal list.
//!
//! The first signal is always admitted. Each later signal is admitted if at least
//! `min_gap` has elapsed since the last admitted signal, or if it meets
//! `strong_conditions` and at least `strong_gap` has elapsed. Dropped signals are
//! never reconsidered.

use crate::domain::Signal;
use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_GAP_MINUTES: i64 = 15;
pub const DEFAULT_STRONG_GAP_MINUTES: i64 = 10;
pub const DEFAULT_STRONG_CONDITIONS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyLimiter {
    pub min_gap_minutes: i64,
    pub strong_gap_minutes: i64,
    pub strong_conditions: usize,
}

impl Default for FrequencyLimiter {
    fn default() -> Self {
        Self {
            min_gap_minutes: DEFAULT_MIN_GAP_MINUTES,
            strong_gap_minutes: DEFAULT_STRONG_GAP_MINUTES,
            strong_conditions: DEFAULT_STRONG_CONDITIONS,
        }
    }
}

impl FrequencyLimiter {
    pub fn new(min_gap_minutes: i64, strong_gap_minutes: i64, strong_conditions: usize) -> Self {
        Self {
            min_gap_minutes,
            strong_gap_minutes,
            strong_conditions,
        }
    }

    /// Whether `signal` passes given the last admitted timestamp.
    pub fn admits(&self, last: Option<DateTime<FixedOffset>>, signal: &Signal) -> bool {
        let Some(last) = last else {
            return true;
        };
        let gap = signal.timestamp - last;
        gap >= Duration::minutes(self.min_gap_minutes)
            || (signal.conditions_met >= self.strong_conditions
                && gap >= Duration::minutes(self.strong_gap_minutes))
    }

    /// Filter a timestamp-ordered signal list.
    pub fn apply(&self, signals: Vec<Signal>) -> Vec<Signal> {
        let mut admitted = Vec::with_capacity(signals.len());
        let mut last: Option<DateTime<FixedOffset>> = None;

        for signal in signals {
            if self.admits(last, &signal) {
                last = Some(signal.timestamp);
                admitted.push(signal);
            } else {
                tracing::debug!(
                    timestamp = %signal.timestamp,
                    signal_type = %signal.signal_type,
                    conditions_met = signal.conditions_met,
                    "signal dropped by frequency limiter"
                );
            }
        }

        admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SignalType;
    use chrono::{TimeZone, Timelike};

    fn signal_at(minute: u32, conditions_met: usize) -> Signal {
        let ts = FixedOffset::west_opt(4 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 3, 10, minute, 0)
            .unwrap();
        let labels = (0..conditions_met).map(|i| format!("c{i}")).collect();
        Signal::new(ts, 500.0, SignalType::Sell, labels, 30)
    }

    #[test]
    fn first_signal_always_admitted() {
        let out = FrequencyLimiter::default().apply(vec![signal_at(0, 1)]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(FrequencyLimiter::default().apply(Vec::new()).is_empty());
    }

    #[test]
    fn weak_signal_needs_fifteen_minutes() {
        let out = FrequencyLimiter::default().apply(vec![
            signal_at(0, 4),
            signal_at(10, 4),
            signal_at(15, 4),
        ]);
        let minutes: Vec<u32> = out.iter().map(|s| s.timestamp.minute()).collect();
        assert_eq!(minutes, vec![0, 15]);
    }

    #[test]
    fn strong_signal_needs_ten_minutes() {
        let limiter = FrequencyLimiter::default();
        let out = limiter.apply(vec![signal_at(0, 4), signal_at(10, 7)]);
        assert_eq!(out.len(), 2);

        let out = limiter.apply(vec![signal_at(0, 4), signal_at(8, 7)]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn gap_measured_from_last_admitted() {
        // 0 admitted, 10 dropped, 20 admitted (20 min after 0), 30 dropped
        let out = FrequencyLimiter::default().apply(vec![
            signal_at(0, 3),
            signal_at(10, 3),
            signal_at(20, 3),
            signal_at(30, 3),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].timestamp - out[0].timestamp, Duration::minutes(20));
    }
}
