//! Headline polarity: a lexicon score blended with keyword nudges.
//!
//! Each headline starts from the lexicon's compound polarity (0.0 when the
//! lexicon is disabled), then gains `keyword_weight` if its lower-cased title
//! contains any positive keyword and loses it if it contains any negative
//! one. The mean over all headlines picks one of three narratives.

use serde::{Deserialize, Serialize};
use vader_sentiment::SentimentIntensityAnalyzer;

/// Polarity of a piece of text, roughly in [-1, 1].
pub trait PolarityScorer {
    fn name(&self) -> &str;

    fn polarity(&self, text: &str) -> f64;
}

/// VADER compound score.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for VaderScorer {
    fn name(&self) -> &str {
        "vader"
    }

    fn polarity(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let scores = self.analyzer.polarity_scores(text);
        scores.get("compound").copied().unwrap_or(0.0)
    }
}

/// Scores everything 0.0; keywords alone drive the polarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullScorer;

impl PolarityScorer for NullScorer {
    fn name(&self) -> &str {
        "none"
    }

    fn polarity(&self, _text: &str) -> f64 {
        0.0
    }
}

/// Keyword lists, thresholds and narrative strings of the summarizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentRules {
    /// Score headlines with the VADER lexicon; off means keywords only.
    pub use_lexicon: bool,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub keyword_weight: f64,
    pub positive_threshold: f64,
    pub negative_threshold: f64,
    pub narrative_positive: String,
    pub narrative_negative: String,
    pub narrative_neutral: String,
    /// News feed language; also selects region and edition.
    pub lang: String,
    pub max_headlines: usize,
}

impl Default for SentimentRules {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect();
        Self {
            use_lexicon: true,
            positive_keywords: words(&[
                "résultats",
                "bénéfice",
                "contrat",
                "relève",
                "guidance",
                "record",
                "upgrade",
                "partenariat",
                "dividende",
                "approbation",
            ]),
            negative_keywords: words(&[
                "profit warning",
                "retard",
                "procès",
                "amende",
                "downgrade",
                "abaisse",
                "enquête",
                "rappel",
                "départ",
                "incident",
            ]),
            keyword_weight: 0.2,
            positive_threshold: 0.15,
            negative_threshold: -0.15,
            narrative_positive: "Rise supported by positive news.".into(),
            narrative_negative: "Decline linked to unfavourable news.".into(),
            narrative_neutral: "Mixed or neutral news; the move is mostly technical.".into(),
            lang: "fr".into(),
            max_headlines: 6,
        }
    }
}

impl SentimentRules {
    /// The scorer these rules ask for.
    pub fn scorer(&self) -> Box<dyn PolarityScorer> {
        if self.use_lexicon {
            Box::new(VaderScorer::new())
        } else {
            Box::new(NullScorer)
        }
    }

    /// Narrative for a mean polarity. Both thresholds are strict.
    pub fn narrative_for(&self, mean: f64) -> &str {
        if mean > self.positive_threshold {
            &self.narrative_positive
        } else if mean < self.negative_threshold {
            &self.narrative_negative
        } else {
            &self.narrative_neutral
        }
    }
}

/// Polarity of one headline title.
pub fn headline_score(title: &str, scorer: &dyn PolarityScorer, rules: &SentimentRules) -> f64 {
    let lowered = title.to_lowercase();
    let mut score = scorer.polarity(&lowered);
    if rules.positive_keywords.iter().any(|k| lowered.contains(&k.to_lowercase())) {
        score += rules.keyword_weight;
    }
    if rules.negative_keywords.iter().any(|k| lowered.contains(&k.to_lowercase())) {
        score -= rules.keyword_weight;
    }
    score
}

/// Mean headline polarity, 0.0 for no headlines.
pub fn score_headlines<S: AsRef<str>>(titles: &[S], scorer: &dyn PolarityScorer, rules: &SentimentRules) -> f64 {
    if titles.is_empty() {
        return 0.0;
    }
    let total: f64 = titles
        .iter()
        .map(|t| headline_score(t.as_ref(), scorer, rules))
        .sum();
    total / titles.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_headlines_is_neutral() {
        let rules = SentimentRules::default();
        let empty: [&str; 0] = [];
        let mean = score_headlines(&empty, &NullScorer, &rules);
        assert_eq!(mean, 0.0);
        assert_eq!(rules.narrative_for(mean), rules.narrative_neutral);
    }

    #[test]
    fn keywords_nudge_by_weight() {
        let rules = SentimentRules::default();
        assert_eq!(headline_score("Airbus relève sa guidance", &NullScorer, &rules), 0.2);
        assert_eq!(headline_score("Enquête sur un incident", &NullScorer, &rules), -0.2);
        // One positive and one negative keyword cancel out.
        assert_eq!(headline_score("Contrat record malgré un retard", &NullScorer, &rules), 0.0);
        assert_eq!(headline_score("Quarterly update", &NullScorer, &rules), 0.0);
    }

    #[test]
    fn default_keywords_are_the_french_lists() {
        let rules = SentimentRules::default();
        assert_eq!(rules.positive_keywords.len(), 10);
        assert_eq!(rules.negative_keywords.len(), 10);
        assert_eq!(headline_score("Analyst praises Airbus", &NullScorer, &rules), 0.0);
        assert_eq!(headline_score("Local barber haircuts prices", &NullScorer, &rules), 0.0);
    }

    #[test]
    fn keyword_match_ignores_case() {
        let rules = SentimentRules::default();
        assert_eq!(headline_score("PROFIT WARNING at supplier", &NullScorer, &rules), -0.2);
    }

    #[test]
    fn mean_drives_narrative() {
        let rules = SentimentRules::default();
        let titles = ["Dividende en hausse", "Nouveau contrat", "Assemblée générale"];
        let mean = score_headlines(&titles, &NullScorer, &rules);
        assert!((mean - 0.4 / 3.0).abs() < 1e-12);
        assert_eq!(rules.narrative_for(mean), rules.narrative_neutral);

        let titles = ["Dividende en hausse", "Nouveau contrat"];
        let mean = score_headlines(&titles, &NullScorer, &rules);
        assert_eq!(rules.narrative_for(mean), rules.narrative_positive);

        let titles = ["Downgrade", "Amende record"];
        // "record" is positive, "amende" negative: (-0.2 + 0.0) / 2
        let mean = score_headlines(&titles, &NullScorer, &rules);
        assert!((mean + 0.1).abs() < 1e-12);
        assert_eq!(rules.narrative_for(mean), rules.narrative_neutral);
    }

    #[test]
    fn thresholds_are_strict() {
        let rules = SentimentRules::default();
        assert_eq!(rules.narrative_for(0.15), rules.narrative_neutral);
        assert_eq!(rules.narrative_for(-0.15), rules.narrative_neutral);
        assert_eq!(rules.narrative_for(0.151), rules.narrative_positive);
        assert_eq!(rules.narrative_for(-0.151), rules.narrative_negative);
    }

    #[test]
    fn vader_reads_obvious_polarity() {
        let vader = VaderScorer::new();
        assert!(vader.polarity("great, excellent, wonderful results") > 0.5);
        assert!(vader.polarity("terrible, awful disaster") < -0.5);
        assert_eq!(vader.polarity("   "), 0.0);
    }

    #[test]
    fn lexicon_switch_selects_scorer() {
        let mut rules = SentimentRules::default();
        assert_eq!(rules.scorer().name(), "vader");
        rules.use_lexicon = false;
        assert_eq!(rules.scorer().name(), "none");
    }
}
