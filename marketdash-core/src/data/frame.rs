//! Tabular price input.
//!
//! A long-format polars frame with one row per (ticker, date) is the
//! interchange shape for price data imported from files. The frame is
//! validated at this boundary and converted into typed `PriceBar`s; nothing
//! downstream looks columns up by name.

use super::provider::PriceSource;
use crate::domain::{MetricsRow, PriceBar};
use crate::error::{DashError, SourceError};
use crate::metrics::compute_metrics;
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::Path;

/// Columns every price frame must carry. `Open` is optional.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Ticker", "Date", "High", "Low", "Close"];

/// Expected schema for price frames.
pub struct PriceFrame;

impl PriceFrame {
    /// Check that every required column is present.
    pub fn validate(df: &DataFrame) -> Result<(), DashError> {
        let names = df.get_column_names();
        for required in REQUIRED_COLUMNS {
            if !names.iter().any(|c| c.as_str() == required) {
                return Err(DashError::MissingRequiredField(required.to_string()));
            }
        }
        Ok(())
    }

    /// Convert a validated frame into bars. Null prices become NaN; rows
    /// with a null ticker or date, or with no price at all, are dropped.
    pub fn to_bars(df: &DataFrame) -> Result<Vec<PriceBar>, DashError> {
        Self::validate(df)?;

        let tickers = typed_column(df, "Ticker", &DataType::String)?;
        let tickers = tickers.str().map_err(|e| field_error("Ticker", e))?;

        let days = df
            .column("Date")
            .and_then(|c| c.as_materialized_series().cast(&DataType::Date))
            .and_then(|s| s.cast(&DataType::Int32))
            .map_err(|e| field_error("Date", e))?;
        let days = days.i32().map_err(|e| field_error("Date", e))?;

        let highs = float_column(df, "High")?;
        let lows = float_column(df, "Low")?;
        let closes = float_column(df, "Close")?;
        let opens = if df.get_column_names().iter().any(|c| c.as_str() == "Open") {
            Some(float_column(df, "Open")?)
        } else {
            None
        };

        // Date columns are physically days since 1970-01-01
        let epoch = NaiveDate::default();

        let mut bars = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let (Some(ticker), Some(day)) = (tickers.get(i), days.get(i)) else {
                continue;
            };
            let date = epoch + chrono::Duration::days(i64::from(day));
            let mut bar = PriceBar::new(
                ticker.trim(),
                date,
                highs.get(i).unwrap_or(f64::NAN),
                lows.get(i).unwrap_or(f64::NAN),
                closes.get(i).unwrap_or(f64::NAN),
            );
            if bar.is_void() {
                continue;
            }
            if let Some(opens) = &opens {
                bar.open = opens.get(i).unwrap_or(f64::NAN);
            }
            bars.push(bar);
        }

        Ok(bars)
    }

    /// Build a frame from bars (the inverse of `to_bars`).
    pub fn from_bars(bars: &[PriceBar]) -> Result<DataFrame, DashError> {
        let tickers: Vec<&str> = bars.iter().map(|b| b.ticker.as_str()).collect();
        let dates: Vec<String> = bars.iter().map(|b| b.date.format("%Y-%m-%d").to_string()).collect();
        let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        let date_col = Column::new("Date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| field_error("Date", e))?;

        DataFrame::new(vec![
            Column::new("Ticker".into(), tickers),
            date_col,
            Column::new("Open".into(), opens),
            Column::new("High".into(), highs),
            Column::new("Low".into(), lows),
            Column::new("Close".into(), closes),
        ])
        .map_err(|e| DashError::Storage(format!("build price frame: {e}")))
    }

    /// Read a CSV file with a header row into a frame.
    pub fn read_csv(path: &Path) -> Result<DataFrame, DashError> {
        LazyCsvReader::new(path)
            .with_has_header(true)
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| DashError::Storage(format!("read {}: {e}", path.display())))
    }
}

/// Metrics for a tabular price input.
///
/// A frame missing any required column yields an empty result: the gap is
/// logged, not raised.
pub fn metrics_from_frame(df: &DataFrame) -> Vec<MetricsRow> {
    match PriceFrame::to_bars(df) {
        Ok(bars) => compute_metrics(&bars),
        Err(e) => {
            tracing::warn!(error = %e, "price frame rejected, no metrics computed");
            Vec::new()
        }
    }
}

/// Price source backed by bars loaded from a file, for offline runs.
///
/// The look-back is measured from the latest date in the file, not today.
pub struct FramePriceSource {
    bars: Vec<PriceBar>,
}

impl FramePriceSource {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }

    pub fn from_csv(path: &Path) -> Result<Self, DashError> {
        let df = PriceFrame::read_csv(path)?;
        let bars = PriceFrame::to_bars(&df)?;
        tracing::info!(path = %path.display(), bars = bars.len(), "loaded offline prices");
        Ok(Self::new(bars))
    }
}

impl PriceSource for FramePriceSource {
    fn name(&self) -> &str {
        "price_file"
    }

    fn fetch_prices(&self, tickers: &[String], days: u32) -> Result<Vec<PriceBar>, SourceError> {
        let Some(latest) = self.bars.iter().map(|b| b.date).max() else {
            return Err(SourceError::Other("price file is empty".into()));
        };
        let start = latest - chrono::Duration::days(i64::from(days));

        let bars: Vec<PriceBar> = self
            .bars
            .iter()
            .filter(|b| b.date > start && tickers.iter().any(|t| *t == b.ticker))
            .cloned()
            .collect();

        if bars.is_empty() && !tickers.is_empty() {
            return Err(SourceError::SymbolNotFound {
                symbol: tickers.join(","),
            });
        }
        Ok(bars)
    }
}

fn typed_column(df: &DataFrame, name: &str, dtype: &DataType) -> Result<Series, DashError> {
    df.column(name)
        .and_then(|c| c.as_materialized_series().cast(dtype))
        .map_err(|e| field_error(name, e))
}

fn float_column(df: &DataFrame, name: &str) -> Result<Float64Chunked, DashError> {
    let series = typed_column(df, name, &DataType::Float64)?;
    series
        .f64()
        .cloned()
        .map_err(|e| field_error(name, e))
}

fn field_error(name: &str, e: PolarsError) -> DashError {
    DashError::MissingRequiredField(format!("{name}: {e}"))
}
