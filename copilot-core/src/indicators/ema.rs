//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seed: EMA[first valid] = x[first valid], so the series is defined from the
//! first finite input onward (no SMA warmup window).

/// EMA of an arbitrary series. Leading NaN inputs stay NaN; a NaN after the seed
/// carries the previous EMA value forward.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev: Option<f64> = None;

    for (i, &v) in values.iter().enumerate() {
        match prev {
            None => {
                if v.is_finite() {
                    result[i] = v;
                    prev = Some(v);
                }
            }
            Some(p) => {
                let next = if v.is_finite() {
                    alpha * v + (1.0 - alpha) * p
                } else {
                    p
                };
                result[i] = next;
                prev = Some(next);
            }
        }
    }

    result
}
