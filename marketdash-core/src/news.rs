//! News sentiment summarizer.
//!
//! Searches headlines for `"{name} {ticker}"`, falling back to the name alone
//! when the combined query finds nothing, and reduces them to a
//! [`NewsDigest`]. Search failures are logged and read as "no headlines";
//! this component never returns an error.

use crate::cache::TtlCache;
use crate::data::NewsSource;
use crate::domain::{Headline, NewsDigest};
use crate::sentiment::{score_headlines, PolarityScorer, SentimentRules};

pub struct NewsSummarizer {
    source: Box<dyn NewsSource>,
    scorer: Box<dyn PolarityScorer>,
    rules: SentimentRules,
    /// Keyed by (query, language).
    cache: TtlCache<(String, String), Vec<Headline>>,
}

impl NewsSummarizer {
    pub fn new(
        source: Box<dyn NewsSource>,
        scorer: Box<dyn PolarityScorer>,
        rules: SentimentRules,
        cache: TtlCache<(String, String), Vec<Headline>>,
    ) -> Self {
        Self {
            source,
            scorer,
            rules,
            cache,
        }
    }

    /// Digest the recent headlines about a company.
    pub fn news_summary(&mut self, name: &str, ticker: &str) -> NewsDigest {
        let combined = format!("{name} {ticker}");
        let mut headlines = self.headlines(combined.trim());
        if headlines.is_empty() && !name.trim().is_empty() {
            headlines = self.headlines(name.trim());
        }

        let titles: Vec<&str> = headlines.iter().map(|h| h.title.as_str()).collect();
        let polarity = score_headlines(&titles, self.scorer.as_ref(), &self.rules);
        let narrative = self.rules.narrative_for(polarity).to_string();
        tracing::debug!(ticker, headlines = headlines.len(), polarity, "news digest");

        NewsDigest {
            narrative,
            polarity,
            headlines,
        }
    }

    /// Up to `max_headlines` results for `query`; empty on any failure.
    fn headlines(&mut self, query: &str) -> Vec<Headline> {
        if query.is_empty() {
            return Vec::new();
        }
        let source = &self.source;
        let lang = &self.rules.lang;
        let limit = self.rules.max_headlines;

        let result = self.cache.get_or_try_insert((query.to_string(), lang.clone()), || {
            source.search(query, lang).map(|mut items| {
                items.truncate(limit);
                items
            })
        });

        result.unwrap_or_else(|e| {
            tracing::warn!(source = source.name(), query, error = %e, "headline search failed");
            Vec::new()
        })
    }
}
