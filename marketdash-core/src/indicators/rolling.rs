//! Rolling mean with a minimum observation count.
//!
//! The window covers the last `window` positions (NaN positions included);
//! the mean is taken over the non-NaN values in it and is emitted only when
//! at least `min_periods` of them exist. With fewer than `window` bars the
//! mean is over everything available so far.

/// Rolling mean over `values` with the given window and minimum periods.
/// A zero window is treated as 1.
pub fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    let window = window.max(1);
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let mut sum = 0.0;
    let mut count = 0usize;

    for i in 0..n {
        let entering = values[i];
        if !entering.is_nan() {
            sum += entering;
            count += 1;
        }
        if i >= window {
            let leaving = values[i - window];
            if !leaving.is_nan() {
                sum -= leaving;
                count -= 1;
            }
        }
        if count >= min_periods.max(1) {
            result[i] = sum / count as f64;
        }
    }

    result
}
