//! Headlines and the digest the summarizer reduces them to.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
}

/// Sentiment digest for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsDigest {
    pub narrative: String,
    /// Mean polarity across headlines, roughly in [-1, 1].
    pub polarity: f64,
    pub headlines: Vec<Headline>,
}
