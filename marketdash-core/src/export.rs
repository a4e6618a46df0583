//! CSV export of market rows.
//!
//! Columns: ticker, name, index, date, close, atr14, ma20, ma50, pct_1,
//! pct_7, pct_22. Undefined indicators are empty cells.

use crate::domain::MetricsRow;
use crate::error::DashError;
use crate::pipeline::MarketRow;
use std::path::Path;

const HEADER: [&str; 11] = [
    "ticker", "name", "index", "date", "close", "atr14", "ma20", "ma50", "pct_1", "pct_7", "pct_22",
];

/// Render rows as CSV text.
pub fn export_metrics_csv(rows: &[MarketRow]) -> Result<String, DashError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(HEADER).map_err(csv_error)?;

    for row in rows {
        let m = &row.metrics;
        wtr.write_record([
            &m.ticker,
            &row.constituent.name,
            &row.constituent.index,
            &m.date.to_string(),
            &format!("{:.6}", m.close),
            &cell(m.atr14),
            &cell(m.ma20),
            &cell(m.ma50),
            &cell(m.pct_1),
            &cell(m.pct_7),
            &cell(m.pct_22),
        ])
        .map_err(csv_error)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| DashError::Storage(format!("flush CSV: {e}")))?;
    String::from_utf8(bytes).map_err(|e| DashError::Storage(format!("CSV is not UTF-8: {e}")))
}

/// Write rows as CSV to `path`.
pub fn write_metrics_csv(rows: &[MarketRow], path: &Path) -> Result<(), DashError> {
    let text = export_metrics_csv(rows)?;
    std::fs::write(path, text).map_err(|e| DashError::Storage(format!("write {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "metrics exported");
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

fn csv_error(e: csv::Error) -> DashError {
    DashError::Storage(format!("CSV export: {e}"))
}

/// Bare metrics rows have no constituent; tag them with their ticker.
pub fn rows_from_metrics(metrics: Vec<MetricsRow>, index: &str) -> Vec<MarketRow> {
    metrics
        .into_iter()
        .map(|m| MarketRow {
            constituent: crate::domain::Constituent {
                ticker: m.ticker.clone(),
                name: m.ticker.clone(),
                index: index.to_string(),
            },
            metrics: m,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn exports_header_and_empty_cells() {
        let metrics = vec![MetricsRow {
            ticker: "AIR.PA".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            close: 150.25,
            atr14: Some(2.5),
            ma20: None,
            ma50: None,
            pct_1: Some(-0.01),
            pct_7: None,
            pct_22: None,
        }];
        let csv = export_metrics_csv(&rows_from_metrics(metrics, "file")).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("ticker,name,index,date,close,atr14,ma20,ma50,pct_1,pct_7,pct_22")
        );
        assert_eq!(
            lines.next(),
            Some("AIR.PA,AIR.PA,file,2024-03-08,150.250000,2.500000,,,-0.010000,,")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");
        write_metrics_csv(&[], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("ticker,name"));
    }
}
