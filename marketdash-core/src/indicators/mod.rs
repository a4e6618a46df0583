//! Indicator series over a single ticker's bars.
//!
//! Every function returns a series aligned with its input, with NaN where the
//! value is undefined. Callers that only need the latest value read the last
//! element.

pub mod atr;
pub mod change;
pub mod rolling;

pub use atr::true_range;
pub use change::pct_change;
pub use rolling::rolling_mean;

/// Create synthetic bars from close prices for testing.
///
/// high = close + 1.0, low = close - 1.0, one bar per calendar day.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::PriceBar> {
    use crate::domain::PriceBar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            PriceBar::new(
                "TEST",
                base_date + chrono::Duration::days(i as i64),
                close + 1.0,
                close - 1.0,
                close,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
