//! Google News RSS search.

use super::http::HttpFetcher;
use super::provider::NewsSource;
use crate::config::HttpConfig;
use crate::domain::Headline;
use crate::error::SourceError;

pub struct GoogleNews {
    http: HttpFetcher,
}

impl GoogleNews {
    pub fn new(config: &HttpConfig) -> Result<Self, SourceError> {
        Ok(Self {
            http: HttpFetcher::new(config)?,
        })
    }

    /// RSS search URL; `lang` drives the interface language, region and edition.
    pub(crate) fn search_url(query: &str, lang: &str) -> Result<String, SourceError> {
        let lang = lang.to_lowercase();
        let region = lang.to_uppercase();
        let url = reqwest::Url::parse_with_params(
            "https://news.google.com/rss/search",
            &[
                ("q", query.to_string()),
                ("hl", format!("{lang}-{region}")),
                ("gl", region.clone()),
                ("ceid", format!("{region}:{region}")),
            ],
        )
        .map_err(|e| SourceError::Other(format!("bad news query {query:?}: {e}")))?;
        Ok(url.into())
    }
}

impl NewsSource for GoogleNews {
    fn name(&self) -> &str {
        "google_news"
    }

    fn search(&self, query: &str, lang: &str) -> Result<Vec<Headline>, SourceError> {
        let xml = self.http.get_text(&Self::search_url(query, lang)?)?;
        parse_feed(&xml)
    }
}

/// Extract (title, link) pairs from every `<item>` of an RSS document.
pub fn parse_feed(xml: &str) -> Result<Vec<Headline>, SourceError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| SourceError::ResponseFormatChanged(format!("invalid RSS: {e}")))?;

    let items = doc
        .descendants()
        .filter(|n| n.has_tag_name("item"))
        .map(|item| {
            let child_text = |tag: &str| {
                item.children()
                    .find(|c| c.has_tag_name(tag))
                    .and_then(|c| c.text())
                    .unwrap_or("")
                    .trim()
                    .to_string()
            };
            Headline {
                title: child_text("title"),
                link: child_text("link"),
            }
        })
        .collect();

    Ok(items)
}
