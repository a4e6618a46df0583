//! Portfolio storage and valuation.
//!
//! Holdings are stored as a JSON array of records with the keys
//! `Name, Ticker, Account, Quantity, PRU`. Saves rewrite the whole file via a
//! temporary file and a rename; the last writer wins.

use crate::domain::{Holding, MetricsRow};
use crate::error::DashError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub struct PortfolioStore {
    path: PathBuf,
}

impl PortfolioStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every holding. A missing file is an empty portfolio.
    pub fn load(&self) -> Result<Vec<Holding>, DashError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| DashError::Storage(format!("read {}: {e}", self.path.display())))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| DashError::Storage(format!("parse {}: {e}", self.path.display())))
    }

    /// Replace the stored portfolio with `holdings`.
    pub fn save(&self, holdings: &[Holding]) -> Result<(), DashError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| DashError::Storage(format!("create {}: {e}", dir.display())))?;
        }

        let json = serde_json::to_string_pretty(holdings)
            .map_err(|e| DashError::Storage(format!("serialize portfolio: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .map_err(|e| DashError::Storage(format!("write {}: {e}", tmp_path.display())))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DashError::Storage(format!("atomic rename failed: {e}"))
        })?;

        tracing::info!(path = %self.path.display(), holdings = holdings.len(), "portfolio saved");
        Ok(())
    }

    /// Delete the stored portfolio. Resetting an absent file is not an error.
    pub fn reset(&self) -> Result<(), DashError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "portfolio reset");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DashError::Storage(format!("remove {}: {e}", self.path.display()))),
        }
    }

    /// Append a holding and save.
    pub fn add(&self, holding: Holding) -> Result<Vec<Holding>, DashError> {
        if holding.ticker.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(DashError::MissingRequiredField("Ticker".into()));
        }
        let mut holdings = self.load()?;
        holdings.push(holding);
        self.save(&holdings)?;
        Ok(holdings)
    }

    /// Remove every line for `ticker` (case-insensitive) and save.
    /// Returns how many lines were removed.
    pub fn remove(&self, ticker: &str) -> Result<usize, DashError> {
        let mut holdings = self.load()?;
        let before = holdings.len();
        holdings.retain(|h| !h.ticker.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(ticker)));
        let removed = before - holdings.len();
        if removed > 0 {
            self.save(&holdings)?;
        }
        Ok(removed)
    }
}

/// Distinct tickers held, in first-seen order.
pub fn held_tickers(holdings: &[Holding]) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for ticker in holdings.iter().filter_map(|h| h.ticker.as_deref()) {
        let ticker = ticker.trim();
        if !ticker.is_empty() && !tickers.iter().any(|t| t == ticker) {
            tickers.push(ticker.to_string());
        }
    }
    tickers
}

/// One holding priced against its latest metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub holding: Holding,
    pub close: Option<f64>,
    pub quantity: f64,
    /// close × quantity, 0 when the close is unknown.
    pub value: f64,
    /// (close − PRU) / PRU × 100, when both are usable.
    pub perf_pct: Option<f64>,
}

/// Price a holding. Returns `None` for lines without a ticker.
pub fn value_holding(holding: &Holding, row: Option<&MetricsRow>) -> Option<Valuation> {
    holding.ticker.as_deref().filter(|t| !t.trim().is_empty())?;

    let close = row.map(|r| r.close).filter(|c| c.is_finite());
    let quantity = holding.quantity.filter(|q| q.is_finite()).unwrap_or(0.0);
    let value = close.map_or(0.0, |c| c * quantity);
    let perf_pct = match (close, holding.cost_basis()) {
        (Some(c), Some(pru)) => Some((c - pru) / pru * 100.0),
        _ => None,
    };

    Some(Valuation {
        holding: holding.clone(),
        close,
        quantity,
        value,
        perf_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn holding(ticker: &str, quantity: Option<f64>, pru: Option<f64>) -> Holding {
        Holding {
            name: Some(format!("{ticker} SA")),
            ticker: Some(ticker.into()),
            account: Some("PEA".into()),
            quantity,
            pru,
        }
    }

    fn row(ticker: &str, close: f64) -> MetricsRow {
        MetricsRow {
            ticker: ticker.into(),
            date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            close,
            atr14: None,
            ma20: None,
            ma50: None,
            pct_1: None,
            pct_7: None,
            pct_22: None,
        }
    }

    #[test]
    fn save_load_roundtrip_with_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let store = PortfolioStore::new(dir.path().join("nested/portfolio.json"));
        let holdings = vec![
            holding("AIR.PA", Some(10.0), Some(120.5)),
            holding("MC.PA", None, None),
            Holding {
                name: None,
                ticker: None,
                account: None,
                quantity: Some(3.0),
                pru: None,
            },
        ];
        store.save(&holdings).unwrap();
        assert_eq!(store.load().unwrap(), holdings);
    }

    #[test]
    fn file_uses_record_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = PortfolioStore::new(dir.path().join("portfolio.json"));
        store.save(&[holding("SAN.PA", Some(2.0), Some(90.0))]).unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        for key in ["\"Name\"", "\"Ticker\"", "\"Account\"", "\"Quantity\"", "\"PRU\""] {
            assert!(text.contains(key), "missing {key}");
        }
    }

    #[test]
    fn missing_file_is_empty_and_reset_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = PortfolioStore::new(dir.path().join("portfolio.json"));
        assert!(store.load().unwrap().is_empty());
        store.reset().unwrap();

        store.add(holding("OR.PA", Some(1.0), None)).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
        store.reset().unwrap();
        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn add_requires_ticker_and_remove_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let store = PortfolioStore::new(dir.path().join("portfolio.json"));
        let mut blank = Holding::new("  ");
        blank.quantity = Some(1.0);
        assert!(matches!(store.add(blank), Err(DashError::MissingRequiredField(_))));

        store.add(holding("AIR.PA", Some(1.0), None)).unwrap();
        store.add(holding("AIR.PA", Some(2.0), None)).unwrap();
        store.add(holding("BN.PA", Some(3.0), None)).unwrap();
        assert_eq!(store.remove("air.pa").unwrap(), 2);
        assert_eq!(store.remove("XYZ").unwrap(), 0);
        assert_eq!(held_tickers(&store.load().unwrap()), vec!["BN.PA"]);
    }

    #[test]
    fn valuation_value_and_performance() {
        let h = holding("AIR.PA", Some(10.0), Some(100.0));
        let v = value_holding(&h, Some(&row("AIR.PA", 110.0))).unwrap();
        assert_eq!(v.value, 1100.0);
        assert!((v.perf_pct.unwrap() - 10.0).abs() < 1e-9);

        // Unknown close: zero value, no performance.
        let v = value_holding(&h, None).unwrap();
        assert_eq!(v.value, 0.0);
        assert_eq!(v.perf_pct, None);

        // No PRU or no quantity.
        let h = holding("AIR.PA", None, Some(0.0));
        let v = value_holding(&h, Some(&row("AIR.PA", 110.0))).unwrap();
        assert_eq!(v.value, 0.0);
        assert_eq!(v.perf_pct, None);
    }

    #[test]
    fn lines_without_ticker_are_skipped() {
        let h = Holding {
            name: Some("Cash".into()),
            ticker: None,
            account: None,
            quantity: Some(1.0),
            pru: None,
        };
        assert!(value_holding(&h, None).is_none());
        assert!(held_tickers(&[h]).is_empty());
    }
}
