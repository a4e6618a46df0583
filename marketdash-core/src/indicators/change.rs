//! Percentage change of the latest close against the close `n` sessions back.

/// `closes[last] / closes[last - n] - 1`, or NaN with fewer than `n + 1` closes.
pub fn pct_change(closes: &[f64], n: usize) -> f64 {
    let len = closes.len();
    if len <= n {
        return f64::NAN;
    }
    closes[len - 1] / closes[len - 1 - n] - 1.0
}
