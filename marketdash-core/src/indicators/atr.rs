//! True Range.
//!
//! TR[t] = max(high-low, |high-prev_close|, |low-prev_close|).
//! The first bar has no previous close, so its TR is undefined (NaN) rather
//! than falling back to high-low.

use crate::domain::PriceBar;

/// Compute the True Range series from bars sorted by date.
pub fn true_range(bars: &[PriceBar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];

    for i in 1..n {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }

    tr
}
