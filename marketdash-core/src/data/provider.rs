//! Source traits and the raw shapes they return.
//!
//! Each external collaborator (price API, reference tables, news feed) sits
//! behind a trait so the pipeline can run against stubs in tests and degrade
//! when a real source fails. Caching sits above these traits; sources don't
//! know about it.

use crate::domain::{Headline, PriceBar};
use crate::error::SourceError;

/// One HTML table, header names and cell text, before any column matching.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Index of the first header whose lower-cased name contains any needle
    /// (compared lower-cased), ignoring column `skip`.
    pub fn find_column<S: AsRef<str>>(&self, needles: &[S], skip: Option<usize>) -> Option<usize> {
        self.headers.iter().enumerate().position(|(i, h)| {
            let h = h.to_lowercase();
            Some(i) != skip && needles.iter().any(|n| h.contains(&n.as_ref().to_lowercase()))
        })
    }
}

/// Daily price history for a batch of tickers.
pub trait PriceSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch daily bars covering the last `days` calendar days.
    ///
    /// Returns long-format bars tagged by ticker whether one or many tickers
    /// were requested. Tickers the source cannot serve are omitted; an error
    /// means nothing could be fetched.
    fn fetch_prices(&self, tickers: &[String], days: u32) -> Result<Vec<PriceBar>, SourceError>;
}

/// Reference pages holding index membership tables.
pub trait TableSource {
    fn name(&self) -> &str;

    /// Fetch a page and return every table on it.
    fn fetch_tables(&self, url: &str) -> Result<Vec<RawTable>, SourceError>;
}

/// Headline search.
pub trait NewsSource {
    fn name(&self) -> &str;

    /// Search headlines for a free-text query in the given language.
    fn search(&self, query: &str, lang: &str) -> Result<Vec<Headline>, SourceError>;
}
