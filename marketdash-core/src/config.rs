//! Dashboard configuration.
//!
//! Stored as TOML. Every tunable the pipeline uses lives here: the index
//! table with its suffix rules, sentiment keywords and thresholds, decision
//! coefficients, cache sizing and HTTP behaviour. A missing file means
//! `DashboardConfig::default()`.

use crate::decision::DecisionRules;
use crate::error::DashError;
use crate::metrics::IndicatorWindows;
use crate::note::NoteRules;
use crate::sentiment::SentimentRules;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One market index and how to resolve its members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Identifier used on the command line and as the row tag (e.g. "CAC 40").
    pub name: String,
    /// Reference page holding the constituents table.
    pub url: String,
    /// Market suffix appended to bare tickers (e.g. ".PA").
    #[serde(default)]
    pub suffix: Option<String>,
}

impl IndexSpec {
    pub fn new(name: &str, url: &str, suffix: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            suffix: suffix.map(String::from),
        }
    }
}

/// Header needles used to pick the constituents table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub indices: Vec<IndexSpec>,
    pub name_columns: Vec<String>,
    pub ticker_columns: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            indices: vec![
                IndexSpec::new("CAC 40", "https://en.wikipedia.org/wiki/CAC_40", Some(".PA")),
                IndexSpec::new("DAX 40", "https://en.wikipedia.org/wiki/DAX", Some(".DE")),
                IndexSpec::new("NASDAQ 100", "https://en.wikipedia.org/wiki/NASDAQ-100", None),
                IndexSpec::new(
                    "S&P 500",
                    "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies",
                    None,
                ),
                IndexSpec::new(
                    "Dow Jones",
                    "https://en.wikipedia.org/wiki/Dow_Jones_Industrial_Average",
                    None,
                ),
            ],
            name_columns: vec!["company".into(), "name".into(), "security".into()],
            ticker_columns: vec!["ticker".into(), "symbol".into()],
        }
    }
}

/// HTTP client behaviour shared by every network source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub breaker_cooldown_secs: u64,
    pub breaker_failure_threshold: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            max_retries: 2,
            base_delay_ms: 500,
            breaker_cooldown_secs: 30 * 60,
            breaker_failure_threshold: 3,
        }
    }
}

/// Capacity and lifetime of the in-process caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub constituents_capacity: usize,
    pub prices_capacity: usize,
    pub news_capacity: usize,
    /// Entry lifetime in seconds; absent means entries live until evicted.
    pub ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            constituents_capacity: 8,
            prices_capacity: 64,
            news_capacity: 256,
            ttl_secs: Some(15 * 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    pub path: PathBuf,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/portfolio.json"),
        }
    }
}

/// History windows and list sizes of the dashboard views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub overview_days: u32,
    pub index_days: u32,
    pub portfolio_days: u32,
    pub search_days: u32,
    /// Rows in each top/bottom movers list.
    pub movers: usize,
    /// Insights taken from each end of an index's movers.
    pub index_insights: usize,
    pub market_headlines: usize,
    pub index_headlines: usize,
    pub search_headlines: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            overview_days: 30,
            index_days: 120,
            portfolio_days: 90,
            search_days: 110,
            movers: 5,
            index_insights: 3,
            market_headlines: 3,
            index_headlines: 2,
            search_headlines: 5,
        }
    }
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub resolver: ResolverConfig,
    pub indicators: IndicatorWindows,
    pub sentiment: SentimentRules,
    pub decision: DecisionRules,
    pub note: NoteRules,
    pub cache: CacheConfig,
    pub http: HttpConfig,
    pub portfolio: PortfolioConfig,
    pub views: ViewConfig,
}

impl DashboardConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DashError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DashError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, DashError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, DashError> {
        let config: Self = toml::from_str(content).map_err(|e| DashError::Config(format!("parse TOML: {e}")))?;
        config.indicators.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, DashError> {
        toml::to_string_pretty(self).map_err(|e| DashError::Config(format!("serialize TOML: {e}")))
    }

    pub fn index(&self, name: &str) -> Option<&IndexSpec> {
        self.resolver
            .indices
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
    }

    pub fn index_names(&self) -> Vec<&str> {
        self.resolver.indices.iter().map(|s| s.name.as_str()).collect()
    }
}
