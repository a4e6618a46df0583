//! Marketdash CLI: market overview, per-index analysis, portfolio and search.
//!
//! Commands:
//! - `overview` top and bottom daily movers across all indices
//! - `market` movers over a horizon with decisions, notes and headlines
//! - `index` one index: movers plus insights for the leading/trailing few
//! - `portfolio` show, add, remove or reset holdings
//! - `search` one ticker outside any index
//! - `export` metrics as CSV
//! - `config` print the effective configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use marketdash_core::data::FramePriceSource;
use marketdash_core::domain::{Holding, Horizon};
use marketdash_core::export::write_metrics_csv;
use marketdash_core::pipeline::{MarketRow, Movers};
use marketdash_core::portfolio::PortfolioStore;
use marketdash_core::{Dashboard, DashboardConfig, DashError, Report, Sources, StockInsight};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "marketdash",
    about = "Marketdash CLI: index movers, indicators, news sentiment and decisions"
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "marketdash.toml")]
    config: PathBuf,

    /// Read prices from a CSV file (Ticker, Date, High, Low, Close) instead of Yahoo.
    #[arg(long, global = true)]
    prices_csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Top and bottom daily movers across all configured indices.
    Overview,
    /// Movers across all indices over a horizon, with insights.
    Market {
        /// Horizon in sessions: 1, 7 or 22.
        #[arg(long, default_value = "1", value_parser = parse_horizon)]
        horizon: Horizon,
    },
    /// Analyse one index (e.g. "CAC 40").
    Index {
        name: String,

        /// Horizon in sessions: 1, 7 or 22.
        #[arg(long, default_value = "1", value_parser = parse_horizon)]
        horizon: Horizon,
    },
    /// Portfolio commands.
    Portfolio {
        #[command(subcommand)]
        action: PortfolioAction,
    },
    /// Look up a single ticker (e.g. AIR.PA, AAPL).
    Search { ticker: String },
    /// Export metrics as CSV.
    Export {
        /// Only this index. Defaults to every configured index.
        #[arg(long)]
        index: Option<String>,

        /// Days of history to fetch.
        #[arg(long, default_value_t = 120)]
        days: u32,

        /// Output file.
        #[arg(long, default_value = "metrics.csv")]
        output: PathBuf,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Subcommand)]
enum PortfolioAction {
    /// Value holdings with decisions and notes.
    Show,
    /// Add a holding.
    Add {
        ticker: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        account: Option<String>,

        #[arg(long)]
        quantity: Option<f64>,

        /// Average acquisition price per unit.
        #[arg(long)]
        pru: Option<f64>,
    },
    /// Remove every line for a ticker.
    Remove { ticker: String },
    /// Delete the stored portfolio.
    Reset,
}

fn parse_horizon(s: &str) -> Result<Horizon, String> {
    Horizon::parse(s).ok_or_else(|| format!("unknown horizon {s:?} (expected 1, 7 or 22)"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let prices_csv = cli.prices_csv.as_deref();
    match cli.command {
        Commands::Overview => run_overview(&mut build_dashboard(&config, prices_csv)?),
        Commands::Market { horizon } => run_market(&mut build_dashboard(&config, prices_csv)?, horizon),
        Commands::Index { name, horizon } => {
            run_index(&mut build_dashboard(&config, prices_csv)?, &name, horizon)
        }
        Commands::Search { ticker } => run_search(&mut build_dashboard(&config, prices_csv)?, &ticker),
        Commands::Export {
            index,
            days,
            output,
        } => run_export(
            &mut build_dashboard(&config, prices_csv)?,
            index.as_deref(),
            days,
            &output,
        ),
        Commands::Portfolio { action } => match action {
            PortfolioAction::Show => run_portfolio_show(&mut build_dashboard(&config, prices_csv)?),
            PortfolioAction::Add {
                ticker,
                name,
                account,
                quantity,
                pru,
            } => run_portfolio_add(&config, ticker, name, account, quantity, pru),
            PortfolioAction::Remove { ticker } => run_portfolio_remove(&config, &ticker),
            PortfolioAction::Reset => run_portfolio_reset(&config),
        },
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn build_dashboard(config: &DashboardConfig, prices_csv: Option<&Path>) -> Result<Dashboard> {
    let mut sources = Sources::live(config)?;
    if let Some(path) = prices_csv {
        sources.prices = Box::new(FramePriceSource::from_csv(path)?);
    }
    Ok(Dashboard::new(config.clone(), sources))
}

fn run_overview(dash: &mut Dashboard) -> Result<()> {
    let report = dash.overview();
    print_warnings("overview", &report);
    if report.data.top.is_empty() {
        println!("Market data is unavailable right now.");
        return Ok(());
    }
    print_movers(&report.data);
    Ok(())
}

fn run_market(dash: &mut Dashboard, horizon: Horizon) -> Result<()> {
    let report = dash.market(horizon);
    print_warnings("market", &report);
    let view = &report.data;
    if view.movers.top.is_empty() {
        println!("No change over {} could be computed.", horizon.label());
        return Ok(());
    }
    print_movers(&view.movers);
    println!("\nInsights (top)");
    view.top_insights.iter().for_each(print_insight);
    println!("\nInsights (bottom)");
    view.bottom_insights.iter().for_each(print_insight);
    Ok(())
}

fn run_index(dash: &mut Dashboard, name: &str, horizon: Horizon) -> Result<()> {
    let report = dash.index_view(name, horizon);
    print_warnings(name, &report);
    if report.warnings.iter().any(|w| matches!(w, DashError::UnknownIndex(_))) {
        eprintln!("configured indices: {}", dash.config().index_names().join(", "));
        return Ok(());
    }
    let view = &report.data;
    if view.movers.top.is_empty() {
        println!("No prices available for {}.", view.index);
        return Ok(());
    }
    println!("{}", view.index);
    print_movers(&view.movers);
    println!("\nSelected insights");
    view.insights.iter().for_each(print_insight);
    Ok(())
}

fn run_portfolio_show(dash: &mut Dashboard) -> Result<()> {
    let report = dash.portfolio_view();
    print_warnings("portfolio", &report);
    let view = &report.data;
    if view.rows.is_empty() {
        println!("Portfolio is empty. Add a line with `marketdash portfolio add TICKER`.");
        return Ok(());
    }

    println!(
        "{:<10} {:<24} {:<12} {:>10} {:>10} {:>8} {:>12} {:>8}  {:<6}",
        "Account", "Name", "Ticker", "Close", "PRU", "Qty", "Value", "Perf%", "Signal"
    );
    for row in &view.rows {
        let v = &row.valuation;
        println!(
            "{:<10} {:<24} {:<12} {:>10} {:>10} {:>8} {:>12.2} {:>8}  {:<6}",
            v.holding.account.as_deref().unwrap_or(""),
            truncate(v.holding.display_name(), 24),
            v.holding.ticker.as_deref().unwrap_or(""),
            fmt_price(v.close),
            fmt_price(v.holding.pru),
            v.quantity,
            v.value,
            v.perf_pct.map_or_else(|| "-".to_string(), |p| format!("{p:+.2}")),
            row.decision,
        );
        if let Some(note) = &row.note {
            println!("    {note}");
        }
    }
    println!("Total value: {:.2}", view.total_value);

    if view.total_value > 0.0 {
        println!("\nAllocation by value");
        for row in &view.rows {
            let share = row.valuation.value / view.total_value * 100.0;
            println!(
                "  {:<24} {:>6.2}%  {}",
                truncate(row.valuation.holding.display_name(), 24),
                share,
                "#".repeat((share / 2.0).round() as usize)
            );
        }
    }
    Ok(())
}

fn run_portfolio_add(
    config: &DashboardConfig,
    ticker: String,
    name: Option<String>,
    account: Option<String>,
    quantity: Option<f64>,
    pru: Option<f64>,
) -> Result<()> {
    let store = PortfolioStore::new(config.portfolio.path.clone());
    let holding = Holding {
        name,
        ticker: Some(ticker.trim().to_uppercase()),
        account,
        quantity,
        pru,
    };
    let holdings = store.add(holding)?;
    println!("Saved. {} line(s) in {}.", holdings.len(), store.path().display());
    Ok(())
}

fn run_portfolio_remove(config: &DashboardConfig, ticker: &str) -> Result<()> {
    let store = PortfolioStore::new(config.portfolio.path.clone());
    let removed = store.remove(ticker)?;
    if removed == 0 {
        bail!("no holding for {ticker}");
    }
    println!("Removed {removed} line(s).");
    Ok(())
}

fn run_portfolio_reset(config: &DashboardConfig) -> Result<()> {
    let store = PortfolioStore::new(config.portfolio.path.clone());
    store.reset()?;
    println!("Portfolio reset.");
    Ok(())
}

fn run_search(dash: &mut Dashboard, ticker: &str) -> Result<()> {
    let report = dash.search(ticker);
    print_warnings(ticker, &report);
    let Some(view) = &report.data else {
        println!("No data for this ticker.");
        return Ok(());
    };

    if let (Some(first), Some(last)) = (view.closes.first(), view.closes.last()) {
        println!(
            "{}: {} closes from {} ({:.2}) to {} ({:.2})",
            view.insight.ticker,
            view.closes.len(),
            first.0,
            first.1,
            last.0,
            last.1
        );
    }
    print_insight(&view.insight);
    if view.insight.headlines.is_empty() {
        println!("    No salient news.");
    }
    Ok(())
}

fn run_export(dash: &mut Dashboard, index: Option<&str>, days: u32, output: &Path) -> Result<()> {
    let report = match index {
        Some(name) => dash.index_rows(name, days),
        None => dash.fetch_all_markets(days),
    };
    print_warnings("export", &report);
    write_metrics_csv(&report.data, output)?;
    println!("Wrote {} row(s) to {}.", report.data.len(), output.display());
    Ok(())
}

// ─── Presentation ───────────────────────────────────────────────────

/// One line per unavailable section; history gaps are summarized.
fn print_warnings<T>(section: &str, report: &Report<T>) {
    let mut gaps = 0usize;
    for warning in &report.warnings {
        match warning {
            DashError::InsufficientHistory { .. } => gaps += 1,
            other => eprintln!("warning [{section}]: {other}"),
        }
    }
    if gaps > 0 {
        eprintln!("note [{section}]: {gaps} indicator value(s) undefined for lack of history");
    }
}

fn print_movers(movers: &Movers) {
    println!("Top {} ({})", movers.top.len(), movers.horizon.label());
    print_rows(&movers.top, movers.horizon);
    println!("Bottom {} ({})", movers.bottom.len(), movers.horizon.label());
    print_rows(&movers.bottom, movers.horizon);
}

fn print_rows(rows: &[MarketRow], horizon: Horizon) {
    println!(
        "  {:<12} {:<28} {:>10} {:>9}  {:<12}",
        "Ticker", "Name", "Close", "Change", "Index"
    );
    for row in rows {
        println!(
            "  {:<12} {:<28} {:>10.2} {:>9}  {:<12}",
            row.metrics.ticker,
            truncate(&row.constituent.name, 28),
            row.metrics.close,
            fmt_pct(row.metrics.change(horizon)),
            row.constituent.index,
        );
    }
}

fn print_insight(insight: &StockInsight) {
    let m = &insight.metrics;
    println!(
        "- {} ({}) [{}] close {:.2} | 1s {} 7s {} 22s {} | ATR14 {} MA20 {} MA50 {}",
        insight.name,
        insight.ticker,
        insight.decision,
        m.close,
        fmt_pct(m.pct_1),
        fmt_pct(m.pct_7),
        fmt_pct(m.pct_22),
        fmt_price(m.atr14),
        fmt_price(m.ma20),
        fmt_price(m.ma50),
    );
    println!("    {}", insight.note);
    for h in &insight.headlines {
        println!("    * {} <{}>", h.title, h.link);
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:+.2}%", v * 100.0))
}

fn fmt_price(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketdash_core::data::{NewsSource, PriceSource, RawTable, TableSource};
    use marketdash_core::domain::{Headline, PriceBar};
    use marketdash_core::sentiment::NullScorer;
    use marketdash_core::SourceError;

    struct NoSource;

    impl TableSource for NoSource {
        fn name(&self) -> &str {
            "none"
        }

        fn fetch_tables(&self, _url: &str) -> Result<Vec<RawTable>, SourceError> {
            Err(SourceError::NetworkUnreachable("offline".into()))
        }
    }

    impl PriceSource for NoSource {
        fn name(&self) -> &str {
            "none"
        }

        fn fetch_prices(&self, tickers: &[String], _days: u32) -> Result<Vec<PriceBar>, SourceError> {
            Err(SourceError::SymbolNotFound {
                symbol: tickers.join(","),
            })
        }
    }

    impl NewsSource for NoSource {
        fn name(&self) -> &str {
            "none"
        }

        fn search(&self, _query: &str, _lang: &str) -> Result<Vec<Headline>, SourceError> {
            Ok(Vec::new())
        }
    }

    fn offline_dashboard() -> Dashboard {
        let sources = Sources {
            tables: Box::new(NoSource),
            prices: Box::new(NoSource),
            news: Box::new(NoSource),
            scorer: Box::new(NullScorer),
        };
        Dashboard::new(DashboardConfig::default(), sources)
    }

    #[test]
    fn unknown_index_warns_without_failing() {
        let mut dash = offline_dashboard();
        assert!(run_index(&mut dash, "FTSE 100", Horizon::OneSession).is_ok());
    }

    #[test]
    fn unavailable_index_warns_without_failing() {
        let mut dash = offline_dashboard();
        assert!(run_index(&mut dash, "CAC 40", Horizon::OneSession).is_ok());
    }

    #[test]
    fn horizon_flag_accepts_sessions() {
        assert_eq!(parse_horizon("7"), Ok(Horizon::SevenSessions));
        assert!(parse_horizon("3").is_err());
    }
}
