//! Dashboard pipeline: constituents → prices → metrics → decisions and notes.
//!
//! Every view returns a [`Report`]: whatever data could be assembled plus
//! the warnings explaining what is missing. No single failing source aborts
//! a view.

use crate::cache::TtlCache;
use crate::config::DashboardConfig;
use crate::constituents::ConstituentResolver;
use crate::data::{GoogleNews, NewsSource, PriceSource, TableSource, WikipediaTables, YahooPriceSource};
use crate::decision::decision_label;
use crate::domain::{Constituent, Decision, Headline, Horizon, Holding, MetricsRow};
use crate::error::DashError;
use crate::news::NewsSummarizer;
use crate::note::compose_note;
use crate::portfolio::{held_tickers, value_holding, PortfolioStore, Valuation};
use crate::prices::PriceService;
use crate::report::Report;
use crate::sentiment::PolarityScorer;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// The external collaborators a dashboard runs against.
pub struct Sources {
    pub tables: Box<dyn TableSource>,
    pub prices: Box<dyn PriceSource>,
    pub news: Box<dyn NewsSource>,
    pub scorer: Box<dyn PolarityScorer>,
}

impl Sources {
    /// Wikipedia tables, Yahoo prices and Google News, per the config.
    pub fn live(config: &DashboardConfig) -> Result<Self, DashError> {
        let tables = WikipediaTables::new(&config.http).map_err(|e| DashError::unavailable("wikipedia", e))?;
        let prices =
            YahooPriceSource::new(&config.http).map_err(|e| DashError::unavailable("yahoo_finance", e))?;
        let news = GoogleNews::new(&config.http).map_err(|e| DashError::unavailable("google_news", e))?;
        Ok(Self {
            tables: Box::new(tables),
            prices: Box::new(prices),
            news: Box::new(news),
            scorer: config.sentiment.scorer(),
        })
    }
}

/// A constituent with its latest metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketRow {
    pub constituent: Constituent,
    pub metrics: MetricsRow,
}

/// Everything the presentation layer shows for one stock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockInsight {
    pub name: String,
    pub ticker: String,
    pub metrics: MetricsRow,
    pub decision: Decision,
    pub note: String,
    pub polarity: f64,
    pub headlines: Vec<Headline>,
}

/// Best and worst performers over one horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movers {
    pub horizon: Horizon,
    pub top: Vec<MarketRow>,
    pub bottom: Vec<MarketRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketView {
    pub movers: Movers,
    pub top_insights: Vec<StockInsight>,
    pub bottom_insights: Vec<StockInsight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexView {
    pub index: String,
    pub movers: Movers,
    pub insights: Vec<StockInsight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioRow {
    pub valuation: Valuation,
    /// Watch when no metrics could be computed.
    pub decision: Decision,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioView {
    pub rows: Vec<PortfolioRow>,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub insight: StockInsight,
    pub closes: Vec<(NaiveDate, f64)>,
}

/// Top and bottom `n` rows by change over `horizon`. Rows whose change is
/// undefined are left out of both lists.
pub fn movers(rows: &[MarketRow], horizon: Horizon, n: usize) -> Movers {
    let mut ranked: Vec<(&MarketRow, f64)> = rows
        .iter()
        .filter_map(|r| r.metrics.change(horizon).map(|c| (r, c)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let top = ranked.iter().take(n).map(|(r, _)| (*r).clone()).collect();
    let bottom = ranked.iter().rev().take(n).map(|(r, _)| (*r).clone()).collect();
    Movers { horizon, top, bottom }
}

pub struct Dashboard {
    config: DashboardConfig,
    resolver: ConstituentResolver,
    prices: PriceService,
    news: NewsSummarizer,
    portfolio: PortfolioStore,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, sources: Sources) -> Self {
        let ttl = config.cache.ttl();
        let resolver = ConstituentResolver::new(
            sources.tables,
            config.resolver.clone(),
            TtlCache::new(config.cache.constituents_capacity, ttl),
        );
        let prices = PriceService::new(
            sources.prices,
            config.indicators,
            TtlCache::new(config.cache.prices_capacity, ttl),
        );
        let news = NewsSummarizer::new(
            sources.news,
            sources.scorer,
            config.sentiment.clone(),
            TtlCache::new(config.cache.news_capacity, ttl),
        );
        let portfolio = PortfolioStore::new(config.portfolio.path.clone());
        Self {
            config,
            resolver,
            prices,
            news,
            portfolio,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Members of one index joined with their metrics over `days`.
    pub fn index_rows(&mut self, index: &str, days: u32) -> Report<Vec<MarketRow>> {
        let mut report = Report::clean(Vec::new());
        let members = report.absorb(self.resolver.members(index));
        if members.is_empty() {
            return report;
        }

        let tickers: Vec<String> = members.iter().map(|m| m.ticker.clone()).collect();
        let metrics = report.absorb(self.prices.metrics(&tickers, days));
        let by_ticker: HashMap<&str, &MetricsRow> = metrics.iter().map(|m| (m.ticker.as_str(), m)).collect();

        report.data = members
            .into_iter()
            .filter_map(|constituent| {
                let metrics = (*by_ticker.get(constituent.ticker.as_str())?).clone();
                Some(MarketRow { constituent, metrics })
            })
            .collect();
        report
    }

    /// Rows for every configured index. A ticker listed in several indices
    /// keeps the row of the first one.
    pub fn fetch_all_markets(&mut self, days: u32) -> Report<Vec<MarketRow>> {
        let mut report = Report::clean(Vec::new());
        let mut seen = HashSet::new();
        let names: Vec<String> = self.resolver.index_names().into_iter().map(String::from).collect();

        for index in names {
            let rows = report.absorb(self.index_rows(&index, days));
            report
                .data
                .extend(rows.into_iter().filter(|r| seen.insert(r.constituent.ticker.clone())));
        }
        tracing::info!(rows = report.data.len(), days, "market rows assembled");
        report
    }

    /// Home view: best and worst daily movers across all indices.
    pub fn overview(&mut self) -> Report<Movers> {
        let days = self.config.views.overview_days;
        let n = self.config.views.movers;
        self.fetch_all_markets(days)
            .map(|rows| movers(&rows, Horizon::OneSession, n))
    }

    /// All indices over `horizon`, with an insight for every mover.
    pub fn market(&mut self, horizon: Horizon) -> Report<MarketView> {
        let n = self.config.views.movers;
        let headlines = self.config.views.market_headlines;
        let mut report = Report::clean(());
        let rows = report.absorb(self.fetch_all_markets(horizon.history_days()));
        let movers = movers(&rows, horizon, n);

        let top_insights: Vec<StockInsight> =
            movers.top.iter().map(|r| self.market_insight(r, headlines)).collect();
        let bottom_insights: Vec<StockInsight> =
            movers.bottom.iter().map(|r| self.market_insight(r, headlines)).collect();

        report.map(|()| MarketView {
            movers,
            top_insights,
            bottom_insights,
        })
    }

    /// One index: movers over `horizon` and insights for the leading and
    /// trailing few.
    pub fn index_view(&mut self, index: &str, horizon: Horizon) -> Report<IndexView> {
        let views = self.config.views.clone();
        let mut report = Report::clean(());
        let rows = report.absorb(self.index_rows(index, views.index_days));
        let movers = movers(&rows, horizon, views.movers);

        let picked: Vec<MarketRow> = movers
            .top
            .iter()
            .take(views.index_insights)
            .chain(movers.bottom.iter().take(views.index_insights))
            .cloned()
            .collect();
        let insights: Vec<StockInsight> = picked
            .iter()
            .map(|r| self.market_insight(r, views.index_headlines))
            .collect();

        let index = self
            .config
            .index(index)
            .map_or_else(|| index.to_string(), |spec| spec.name.clone());
        report.map(|()| IndexView {
            index,
            movers,
            insights,
        })
    }

    /// Stored holdings priced, labelled as held positions and annotated.
    pub fn portfolio_view(&mut self) -> Report<PortfolioView> {
        let mut report = Report::clean(());
        let holdings = report.absorb(Report::from_result(self.portfolio.load()));
        let data = self.value_portfolio(&holdings, &mut report);
        report.map(|()| data)
    }

    fn value_portfolio(&mut self, holdings: &[Holding], report: &mut Report<()>) -> PortfolioView {
        let tickers = held_tickers(holdings);
        let metrics = report.absorb(self.prices.metrics(&tickers, self.config.views.portfolio_days));
        let by_ticker: HashMap<&str, &MetricsRow> = metrics.iter().map(|m| (m.ticker.as_str(), m)).collect();

        let mut rows = Vec::new();
        for holding in holdings {
            let metrics = holding
                .ticker
                .as_deref()
                .and_then(|t| by_ticker.get(t.trim()).copied());
            let Some(valuation) = value_holding(holding, metrics) else {
                continue;
            };

            let (decision, note) = match metrics {
                Some(row) => {
                    let decision = decision_label(row, holding.cost_basis(), true, &self.config.decision);
                    let digest = self.news.news_summary(holding.display_name(), &row.ticker);
                    let note = compose_note(row, &digest.narrative, &self.config.note);
                    (decision, Some(note))
                }
                None => (Decision::Watch, None),
            };
            rows.push(PortfolioRow {
                valuation,
                decision,
                note,
            });
        }

        let total_value = rows.iter().map(|r| r.valuation.value).sum();
        PortfolioView { rows, total_value }
    }

    /// A single ticker looked up directly, outside any index.
    pub fn search(&mut self, ticker: &str) -> Report<Option<SearchView>> {
        let ticker = ticker.trim().to_uppercase();
        let days = self.config.views.search_days;
        let mut report = Report::clean(None);
        if ticker.is_empty() {
            report.warn(DashError::MissingRequiredField("ticker".into()));
            return report;
        }

        let tickers = vec![ticker.clone()];
        let metrics = report.absorb(self.prices.metrics(&tickers, days));
        let Some(row) = metrics.into_iter().next() else {
            return report;
        };

        // Served from the price cache populated just above.
        let mut closes: Vec<(NaiveDate, f64)> = self
            .prices
            .fetch_prices(&tickers, days)
            .unwrap_or_default()
            .into_iter()
            .map(|b| (b.date, b.close))
            .collect();
        closes.sort_by_key(|(date, _)| *date);

        let max_headlines = self.config.views.search_headlines;
        let insight = self.insight(&ticker, &row, false, None, max_headlines);
        report.data = Some(SearchView { insight, closes });
        report
    }

    fn market_insight(&mut self, row: &MarketRow, headlines: usize) -> StockInsight {
        self.insight(&row.constituent.name, &row.metrics, false, None, headlines)
    }

    /// Decision, note and headlines for one row.
    pub fn insight(
        &mut self,
        name: &str,
        row: &MetricsRow,
        held: bool,
        cost_basis: Option<f64>,
        max_headlines: usize,
    ) -> StockInsight {
        let digest = self.news.news_summary(name, &row.ticker);
        let decision = decision_label(row, cost_basis, held, &self.config.decision);
        let note = compose_note(row, &digest.narrative, &self.config.note);
        let mut headlines = digest.headlines;
        headlines.truncate(max_headlines);

        StockInsight {
            name: name.to_string(),
            ticker: row.ticker.clone(),
            metrics: row.clone(),
            decision,
            note,
            polarity: digest.polarity,
            headlines,
        }
    }
}
