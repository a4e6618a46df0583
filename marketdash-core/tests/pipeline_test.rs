//! End-to-end views against stub sources.
//!
//! The stubs serve one working index (CAC 40, three members), one index whose
//! page is down (DAX 40), deterministic price ramps and a few headlines.

use chrono::NaiveDate;
use marketdash_core::config::{IndexSpec, ResolverConfig};
use marketdash_core::data::{NewsSource, PriceSource, RawTable, TableSource};
use marketdash_core::domain::{Decision, Headline, Holding, Horizon, PriceBar};
use marketdash_core::portfolio::PortfolioStore;
use marketdash_core::sentiment::NullScorer;
use marketdash_core::{Dashboard, DashError, DashboardConfig, SourceError, Sources};
use std::cell::Cell;
use std::rc::Rc;

// ── Stubs ────────────────────────────────────────────────────────────

struct StubTables;

impl TableSource for StubTables {
    fn name(&self) -> &str {
        "stub_tables"
    }

    fn fetch_tables(&self, url: &str) -> Result<Vec<RawTable>, SourceError> {
        if url.contains("CAC") {
            let rows = [("Airbus", "AIR"), ("LVMH", "MC"), ("Sanofi", "SAN")];
            Ok(vec![RawTable {
                headers: vec!["Company".into(), "Sector".into(), "Ticker".into()],
                rows: rows
                    .iter()
                    .map(|(name, ticker)| vec![name.to_string(), "-".into(), ticker.to_string()])
                    .collect(),
            }])
        } else {
            Err(SourceError::NetworkUnreachable("connection reset".into()))
        }
    }
}

/// AIR.PA rises 1/session, MC.PA falls 1/session, SAN.PA is flat.
struct StubPrices {
    calls: Rc<Cell<usize>>,
}

fn closes_for(ticker: &str, sessions: usize) -> Option<Vec<f64>> {
    let closes = match ticker {
        "AIR.PA" => (0..sessions).map(|i| 100.0 + i as f64).collect(),
        "MC.PA" => (0..sessions).map(|i| 200.0 - i as f64).collect(),
        "SAN.PA" => vec![50.0; sessions],
        _ => return None,
    };
    Some(closes)
}

impl PriceSource for StubPrices {
    fn name(&self) -> &str {
        "stub_prices"
    }

    fn fetch_prices(&self, tickers: &[String], _days: u32) -> Result<Vec<PriceBar>, SourceError> {
        self.calls.set(self.calls.get() + 1);
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars: Vec<PriceBar> = tickers
            .iter()
            .filter_map(|t| closes_for(t, 30).map(|c| (t, c)))
            .flat_map(|(t, closes)| {
                closes.into_iter().enumerate().map(move |(i, c)| {
                    PriceBar::new(t, base + chrono::Duration::days(i as i64), c + 1.0, c - 1.0, c)
                })
            })
            .collect();
        if bars.is_empty() {
            return Err(SourceError::SymbolNotFound {
                symbol: tickers.join(","),
            });
        }
        Ok(bars)
    }
}

struct StubNews;

impl NewsSource for StubNews {
    fn name(&self) -> &str {
        "stub_news"
    }

    fn search(&self, query: &str, _lang: &str) -> Result<Vec<Headline>, SourceError> {
        if !query.contains("Airbus") {
            return Ok(Vec::new());
        }
        Ok([
            "Airbus signe un contrat record",
            "Airbus: dividende en hausse",
            "Airbus relève sa guidance",
        ]
        .iter()
        .enumerate()
        .map(|(i, t)| Headline {
            title: t.to_string(),
            link: format!("https://news.example.com/{i}"),
        })
        .collect())
    }
}

fn test_config(portfolio: &std::path::Path) -> DashboardConfig {
    let mut config = DashboardConfig::default();
    config.resolver = ResolverConfig {
        indices: vec![
            IndexSpec::new("CAC 40", "https://wiki.example/CAC_40", Some(".PA")),
            IndexSpec::new("DAX 40", "https://wiki.example/DAX", Some(".DE")),
        ],
        ..ResolverConfig::default()
    };
    config.portfolio.path = portfolio.to_path_buf();
    config.sentiment.use_lexicon = false;
    config
}

fn dashboard(portfolio: &std::path::Path) -> (Dashboard, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let sources = Sources {
        tables: Box::new(StubTables),
        prices: Box::new(StubPrices {
            calls: Rc::clone(&calls),
        }),
        news: Box::new(StubNews),
        scorer: Box::new(NullScorer),
    };
    (Dashboard::new(test_config(portfolio), sources), calls)
}

fn tickers(rows: &[marketdash_core::pipeline::MarketRow]) -> Vec<&str> {
    rows.iter().map(|r| r.metrics.ticker.as_str()).collect()
}

// ── Views ────────────────────────────────────────────────────────────

#[test]
fn overview_ranks_daily_movers_and_reports_down_index() {
    let dir = tempfile::tempdir().unwrap();
    let (mut dash, _) = dashboard(&dir.path().join("portfolio.json"));

    let report = dash.overview();
    assert_eq!(tickers(&report.data.top), vec!["AIR.PA", "SAN.PA", "MC.PA"]);
    assert_eq!(tickers(&report.data.bottom), vec!["MC.PA", "SAN.PA", "AIR.PA"]);
    assert_eq!(report.data.top[0].constituent.name, "Airbus");
    assert_eq!(report.data.top[0].constituent.index, "CAC 40");

    let unavailable: Vec<&DashError> = report
        .warnings
        .iter()
        .filter(|w| matches!(w, DashError::SourceUnavailable { .. }))
        .collect();
    assert_eq!(unavailable.len(), 1);
    assert!(unavailable[0].to_string().contains("connection reset"));
}

#[test]
fn repeated_views_reuse_cached_prices() {
    let dir = tempfile::tempdir().unwrap();
    let (mut dash, calls) = dashboard(&dir.path().join("portfolio.json"));
    dash.overview();
    let after_first = calls.get();
    dash.overview();
    assert_eq!(calls.get(), after_first);
}

#[test]
fn market_view_labels_and_annotates_movers() {
    let dir = tempfile::tempdir().unwrap();
    let (mut dash, _) = dashboard(&dir.path().join("portfolio.json"));

    let report = dash.market(Horizon::SevenSessions);
    let view = &report.data;
    assert_eq!(view.movers.horizon, Horizon::SevenSessions);
    assert_eq!(view.top_insights.len(), 3);

    let airbus = &view.top_insights[0];
    assert_eq!(airbus.ticker, "AIR.PA");
    assert_eq!(airbus.decision, Decision::Buy);
    assert!(airbus.note.starts_with("Trend bullish, volatility contained, upward momentum."));
    assert_eq!(airbus.headlines.len(), 3);
    assert!(airbus.polarity > 0.15);

    let lvmh = &view.bottom_insights[0];
    assert_eq!(lvmh.ticker, "MC.PA");
    assert_ne!(lvmh.decision, Decision::Buy);
    assert!(lvmh.note.contains("downward pressure"));
    assert!(lvmh.headlines.is_empty());
}

#[test]
fn index_view_caps_insights_and_headlines() {
    let dir = tempfile::tempdir().unwrap();
    let (mut dash, _) = dashboard(&dir.path().join("portfolio.json"));

    let report = dash.index_view("cac 40", Horizon::OneSession);
    assert!(report
        .warnings
        .iter()
        .all(|w| matches!(w, DashError::InsufficientHistory { .. })));
    let view = &report.data;
    assert_eq!(view.index, "CAC 40");
    // Three from each end of a three-member index.
    assert_eq!(view.insights.len(), 6);
    assert!(view.insights.iter().all(|i| i.headlines.len() <= 2));
}

#[test]
fn unknown_index_degrades_to_empty_view() {
    let dir = tempfile::tempdir().unwrap();
    let (mut dash, calls) = dashboard(&dir.path().join("portfolio.json"));

    let report = dash.index_view("FTSE 100", Horizon::OneSession);
    assert!(report.data.movers.top.is_empty());
    assert!(report.data.insights.is_empty());
    assert!(matches!(report.warnings[0], DashError::UnknownIndex(_)));
    assert_eq!(calls.get(), 0);
}

#[test]
fn portfolio_view_values_held_positions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portfolio.json");
    let store = PortfolioStore::new(&path);
    store
        .save(&[
            Holding {
                name: Some("Airbus".into()),
                ticker: Some("AIR.PA".into()),
                account: Some("PEA".into()),
                quantity: Some(10.0),
                pru: Some(100.0),
            },
            Holding {
                name: None,
                ticker: None,
                account: Some("CTO".into()),
                quantity: Some(5.0),
                pru: None,
            },
            Holding::new("ZZZ.PA"),
        ])
        .unwrap();

    let (mut dash, _) = dashboard(&path);
    let report = dash.portfolio_view();
    let view = &report.data;

    // The line without a ticker is skipped.
    assert_eq!(view.rows.len(), 2);

    let air = &view.rows[0];
    assert_eq!(air.valuation.close, Some(129.0));
    assert_eq!(air.valuation.value, 1290.0);
    assert!((air.valuation.perf_pct.unwrap() - 29.0).abs() < 1e-9);
    assert_eq!(air.decision, Decision::Buy);
    assert!(air.note.is_some());

    let unknown = &view.rows[1];
    assert_eq!(unknown.valuation.value, 0.0);
    assert_eq!(unknown.decision, Decision::Watch);
    assert!(unknown.note.is_none());

    assert_eq!(view.total_value, 1290.0);
}

#[test]
fn empty_portfolio_view() {
    let dir = tempfile::tempdir().unwrap();
    let (mut dash, calls) = dashboard(&dir.path().join("missing.json"));
    let report = dash.portfolio_view();
    assert!(report.data.rows.is_empty());
    assert!(report.is_clean());
    assert_eq!(calls.get(), 0);
}

#[test]
fn search_normalizes_ticker_and_returns_history() {
    let dir = tempfile::tempdir().unwrap();
    let (mut dash, calls) = dashboard(&dir.path().join("portfolio.json"));

    let report = dash.search("  air.pa ");
    let view = report.data.as_ref().unwrap();
    assert_eq!(view.insight.ticker, "AIR.PA");
    assert_eq!(view.insight.decision, Decision::Buy);
    assert_eq!(view.closes.len(), 30);
    assert!(view.closes.windows(2).all(|w| w[0].0 < w[1].0));
    // History comes from the price cache, not a second fetch.
    assert_eq!(calls.get(), 1);
}

#[test]
fn search_unknown_ticker_warns() {
    let dir = tempfile::tempdir().unwrap();
    let (mut dash, _) = dashboard(&dir.path().join("portfolio.json"));

    let report = dash.search("NOPE");
    assert!(report.data.is_none());
    assert!(matches!(
        report.warnings[0],
        DashError::SourceUnavailable {
            reason: SourceError::SymbolNotFound { .. },
            ..
        }
    ));
}
