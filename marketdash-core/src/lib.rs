//! Marketdash Core: constituents, prices, indicators, sentiment and decisions.
//!
//! This crate holds everything behind the dashboard:
//! - Domain types (bars, constituents, metrics rows, holdings, headlines)
//! - Data sources behind traits (reference tables, price history, news)
//! - Indicator engine (ATR14, MA20/MA50, 1/7/22-session changes)
//! - Headline sentiment and the decision heuristic
//! - Portfolio storage and the view pipeline that degrades to partial data

pub mod cache;
pub mod config;
pub mod constituents;
pub mod data;
pub mod decision;
pub mod domain;
pub mod error;
pub mod export;
pub mod indicators;
pub mod metrics;
pub mod news;
pub mod note;
pub mod pipeline;
pub mod portfolio;
pub mod prices;
pub mod report;
pub mod sentiment;

pub use config::DashboardConfig;
pub use error::{DashError, SourceError};
pub use pipeline::{Dashboard, Sources, StockInsight};
pub use report::Report;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: plain data types can cross threads.
    ///
    /// Sources and the dashboard itself are single-threaded; the values they
    /// produce are not.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::PriceBar>();
        require_sync::<domain::PriceBar>();
        require_send::<domain::MetricsRow>();
        require_sync::<domain::MetricsRow>();
        require_send::<domain::Holding>();
        require_sync::<domain::Holding>();
        require_send::<domain::NewsDigest>();
        require_sync::<domain::NewsDigest>();
        require_send::<pipeline::StockInsight>();
        require_sync::<pipeline::StockInsight>();
        require_send::<DashboardConfig>();
        require_sync::<DashboardConfig>();
        require_send::<DashError>();
        require_sync::<DashError>();
    }

    /// Compile-time check: the decision engine sees a row, a cost basis and
    /// a held flag, never the news digest. Sentiment only reaches the note.
    #[allow(dead_code)]
    fn assert_decision_signature() {
        let _: fn(&domain::MetricsRow, Option<f64>, bool, &decision::DecisionRules) -> domain::Decision =
            decision::decision_label;
    }
}
