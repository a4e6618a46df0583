//! Constituent resolver: index identifier to member list.
//!
//! The index's reference page is fetched as a list of tables. The first
//! table with both a name-like and a ticker-like header is the membership
//! table; a page without one is reported as unavailable rather than guessed
//! at. Tickers are trimmed, rows with a blank ticker or name are dropped,
//! the index's market suffix is appended to tickers that have none, and
//! duplicates of the suffixed ticker keep their first occurrence.

use crate::cache::TtlCache;
use crate::config::{IndexSpec, ResolverConfig};
use crate::data::{RawTable, TableSource};
use crate::domain::Constituent;
use crate::error::{DashError, SourceError};
use crate::report::Report;
use std::collections::HashSet;

pub struct ConstituentResolver {
    source: Box<dyn TableSource>,
    config: ResolverConfig,
    cache: TtlCache<String, Vec<Constituent>>,
}

impl ConstituentResolver {
    pub fn new(
        source: Box<dyn TableSource>,
        config: ResolverConfig,
        cache: TtlCache<String, Vec<Constituent>>,
    ) -> Self {
        Self {
            source,
            config,
            cache,
        }
    }

    pub fn index_names(&self) -> Vec<&str> {
        self.config.indices.iter().map(|s| s.name.as_str()).collect()
    }

    /// Members of `index`, or the reason they could not be resolved.
    pub fn try_members(&mut self, index: &str) -> Result<Vec<Constituent>, DashError> {
        let spec = self
            .config
            .indices
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(index))
            .cloned()
            .ok_or_else(|| DashError::UnknownIndex(index.to_string()))?;

        let source = &self.source;
        let config = &self.config;
        self.cache.get_or_try_insert(spec.name.clone(), || {
            let tables = source
                .fetch_tables(&spec.url)
                .map_err(|e| DashError::unavailable(source.name(), e))?;
            let members = extract_members(&tables, &spec, config)
                .map_err(|e| DashError::unavailable(source.name(), e))?;
            tracing::info!(index = %spec.name, members = members.len(), "resolved constituents");
            Ok(members)
        })
    }

    /// Members of `index`; empty with a warning when resolution fails.
    pub fn members(&mut self, index: &str) -> Report<Vec<Constituent>> {
        Report::from_result(self.try_members(index))
    }
}

/// Pick the membership table and turn it into constituents.
pub fn extract_members(
    tables: &[RawTable],
    spec: &IndexSpec,
    config: &ResolverConfig,
) -> Result<Vec<Constituent>, SourceError> {
    let (table, ticker_col, name_col) = tables
        .iter()
        .find_map(|t| {
            let ticker_col = t.find_column(config.ticker_columns.as_slice(), None)?;
            let name_col = t.find_column(config.name_columns.as_slice(), Some(ticker_col))?;
            Some((t, ticker_col, name_col))
        })
        .ok_or_else(|| SourceError::NoMatchingTable {
            url: spec.url.clone(),
        })?;

    let mut seen = HashSet::new();
    let members = table
        .rows
        .iter()
        .filter_map(|row| {
            let ticker = row.get(ticker_col)?.trim();
            let name = row.get(name_col)?.trim();
            if ticker.is_empty() || name.is_empty() {
                return None;
            }
            Some(Constituent {
                ticker: apply_suffix(ticker, spec.suffix.as_deref()),
                name: name.to_string(),
                index: spec.name.clone(),
            })
        })
        .filter(|member| seen.insert(member.ticker.clone()))
        .collect();

    Ok(members)
}

/// Append the market suffix to a bare ticker. Tickers already carrying an
/// exchange suffix (any `.`) are left alone.
pub fn apply_suffix(ticker: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) if !ticker.contains('.') => format!("{ticker}{suffix}"),
        _ => ticker.to_string(),
    }
}
