//! Price history with memoization, plus metrics over it.

use crate::cache::TtlCache;
use crate::data::PriceSource;
use crate::domain::{MetricsRow, PriceBar};
use crate::error::DashError;
use crate::metrics::{compute_metrics_with, history_gaps, IndicatorWindows};
use crate::report::Report;
use std::collections::HashMap;

pub struct PriceService {
    source: Box<dyn PriceSource>,
    windows: IndicatorWindows,
    /// Keyed by (requested tickers in order, days).
    cache: TtlCache<(Vec<String>, u32), Vec<PriceBar>>,
}

impl PriceService {
    pub fn new(
        source: Box<dyn PriceSource>,
        windows: IndicatorWindows,
        cache: TtlCache<(Vec<String>, u32), Vec<PriceBar>>,
    ) -> Self {
        Self {
            source,
            windows,
            cache,
        }
    }

    /// Daily bars for `tickers` over the last `days` days.
    pub fn fetch_prices(&mut self, tickers: &[String], days: u32) -> Result<Vec<PriceBar>, DashError> {
        if tickers.is_empty() {
            return Ok(Vec::new());
        }
        let source = &self.source;
        self.cache.get_or_try_insert((tickers.to_vec(), days), || {
            source
                .fetch_prices(tickers, days)
                .map_err(|e| DashError::unavailable(source.name(), e))
        })
    }

    /// Metrics for `tickers`, with history gaps and fetch failures as warnings.
    pub fn metrics(&mut self, tickers: &[String], days: u32) -> Report<Vec<MetricsRow>> {
        let mut report = Report::clean(Vec::new());
        let bars = report.absorb(Report::from_result(self.fetch_prices(tickers, days)));

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for bar in &bars {
            *counts.entry(bar.ticker.as_str()).or_default() += 1;
        }

        let rows = compute_metrics_with(&bars, &self.windows);
        for row in &rows {
            let available = counts.get(row.ticker.as_str()).copied().unwrap_or(0);
            for gap in history_gaps(row, available, &self.windows) {
                tracing::debug!(%gap, "indicator undefined");
                report.warnings.push(gap);
            }
        }
        report.data = rows;
        report
    }
}
