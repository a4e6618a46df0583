//! Price/indicator engine: raw bars in, one MetricsRow per ticker out.
//!
//! Bars are grouped by ticker and stable-sorted by date, so when a ticker
//! has two bars on the same date the one inserted last is the "latest".
//! Duplicates stay in the rolling windows.

use crate::domain::{Horizon, MetricsRow, PriceBar};
use crate::error::DashError;
use crate::indicators::{pct_change, rolling_mean, true_range};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Window and minimum-period settings for the rolling indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorWindows {
    pub atr_window: usize,
    pub atr_min_periods: usize,
    pub ma_short_window: usize,
    pub ma_short_min_periods: usize,
    pub ma_long_window: usize,
    pub ma_long_min_periods: usize,
}

impl Default for IndicatorWindows {
    fn default() -> Self {
        Self {
            atr_window: 14,
            atr_min_periods: 5,
            ma_short_window: 20,
            ma_short_min_periods: 5,
            ma_long_window: 50,
            ma_long_min_periods: 10,
        }
    }
}

impl IndicatorWindows {
    /// Every window and minimum period must be at least 1.
    pub fn validate(&self) -> Result<(), DashError> {
        let fields = [
            ("atr_window", self.atr_window),
            ("atr_min_periods", self.atr_min_periods),
            ("ma_short_window", self.ma_short_window),
            ("ma_short_min_periods", self.ma_short_min_periods),
            ("ma_long_window", self.ma_long_window),
            ("ma_long_min_periods", self.ma_long_min_periods),
        ];
        match fields.iter().find(|(_, v)| *v == 0) {
            Some((name, _)) => Err(DashError::Config(format!("indicators.{name} must be at least 1"))),
            None => Ok(()),
        }
    }
}

/// Compute metrics with the default windows (ATR14, MA20, MA50).
pub fn compute_metrics(bars: &[PriceBar]) -> Vec<MetricsRow> {
    compute_metrics_with(bars, &IndicatorWindows::default())
}

/// Compute one MetricsRow per ticker, ordered by ticker.
pub fn compute_metrics_with(bars: &[PriceBar], windows: &IndicatorWindows) -> Vec<MetricsRow> {
    let mut groups: BTreeMap<&str, Vec<&PriceBar>> = BTreeMap::new();
    for bar in bars {
        groups.entry(bar.ticker.as_str()).or_default().push(bar);
    }

    groups
        .into_values()
        .filter_map(|mut group| {
            // Vec::sort_by_key is stable: equal dates keep insertion order
            group.sort_by_key(|b| b.date);
            let series: Vec<PriceBar> = group.into_iter().cloned().collect();
            latest_row(&series, windows)
        })
        .collect()
}

fn latest_row(series: &[PriceBar], windows: &IndicatorWindows) -> Option<MetricsRow> {
    let last = series.last()?;
    let closes: Vec<f64> = series.iter().map(|b| b.close).collect();

    let atr = rolling_mean(&true_range(series), windows.atr_window, windows.atr_min_periods);
    let ma_short = rolling_mean(&closes, windows.ma_short_window, windows.ma_short_min_periods);
    let ma_long = rolling_mean(&closes, windows.ma_long_window, windows.ma_long_min_periods);

    Some(MetricsRow {
        ticker: last.ticker.clone(),
        date: last.date,
        close: last.close,
        atr14: defined(atr.last().copied()),
        ma20: defined(ma_short.last().copied()),
        ma50: defined(ma_long.last().copied()),
        pct_1: defined(Some(pct_change(&closes, Horizon::OneSession.sessions()))),
        pct_7: defined(Some(pct_change(&closes, Horizon::SevenSessions.sessions()))),
        pct_22: defined(Some(pct_change(&closes, Horizon::TwentyTwoSessions.sessions()))),
    })
}

fn defined(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// List the indicators a row could not compute, as `InsufficientHistory`
/// warnings. `available` is the number of bars the ticker had.
pub fn history_gaps(row: &MetricsRow, available: usize, windows: &IndicatorWindows) -> Vec<DashError> {
    let checks: [(&'static str, bool, usize); 6] = [
        ("ATR14", row.atr14.is_none(), windows.atr_min_periods + 1),
        ("MA20", row.ma20.is_none(), windows.ma_short_min_periods),
        ("MA50", row.ma50.is_none(), windows.ma_long_min_periods),
        ("change 1 session", row.pct_1.is_none(), 2),
        ("change 7 sessions", row.pct_7.is_none(), 8),
        ("change 22 sessions", row.pct_22.is_none(), 23),
    ];

    checks
        .into_iter()
        .filter(|(_, missing, needed)| *missing && available < *needed)
        .map(|(indicator, _, needed)| DashError::InsufficientHistory {
            ticker: row.ticker.clone(),
            indicator,
            needed,
            available,
        })
        .collect()
}
