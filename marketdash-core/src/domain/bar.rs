//! PriceBar: one daily bar for one ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLC bar tagged with its ticker.
///
/// Missing values from the provider are carried as NaN; the open is optional
/// in tabular input and stays NaN when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, high: f64, low: f64, close: f64) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            open: f64::NAN,
            high,
            low,
            close,
        }
    }

    pub fn with_open(mut self, open: f64) -> Self {
        self.open = open;
        self
    }

    /// Returns true if every price field the indicators read is NaN.
    pub fn is_void(&self) -> bool {
        self.high.is_nan() && self.low.is_nan() && self.close.is_nan()
    }
}
