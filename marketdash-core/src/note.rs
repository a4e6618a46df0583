//! Note composer: a one-sentence reading of a MetricsRow plus the news narrative.

use crate::domain::MetricsRow;
use serde::{Deserialize, Serialize};

/// Volatility buckets and the words the note is assembled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteRules {
    /// ATR/close strictly below this is "contained".
    pub contained_below: f64,
    /// ATR/close strictly above this is "elevated".
    pub elevated_above: f64,
    pub trend_bullish: String,
    pub trend_fragile: String,
    pub vol_contained: String,
    pub vol_moderate: String,
    pub vol_elevated: String,
    pub momentum_up: String,
    pub momentum_down: String,
    pub momentum_flat: String,
}

impl Default for NoteRules {
    fn default() -> Self {
        Self {
            contained_below: 0.02,
            elevated_above: 0.035,
            trend_bullish: "bullish".into(),
            trend_fragile: "fragile".into(),
            vol_contained: "contained".into(),
            vol_moderate: "moderate".into(),
            vol_elevated: "elevated".into(),
            momentum_up: "upward momentum".into(),
            momentum_down: "downward pressure".into(),
            momentum_flat: "sideways".into(),
        }
    }
}

/// Compose the note for `row`.
///
/// Trend is bullish only when both averages are defined and the close is at
/// or above each. An undefined volatility ratio reads as moderate; an
/// undefined or zero 7-session change reads as sideways.
pub fn compose_note(row: &MetricsRow, narrative: &str, rules: &NoteRules) -> String {
    let bullish = match (row.ma20, row.ma50) {
        (Some(ma20), Some(ma50)) => row.close >= ma20 && row.close >= ma50,
        _ => false,
    };
    let trend = if bullish {
        &rules.trend_bullish
    } else {
        &rules.trend_fragile
    };

    let volatility = match row.volatility_ratio() {
        Some(v) if v < rules.contained_below => &rules.vol_contained,
        Some(v) if v > rules.elevated_above => &rules.vol_elevated,
        _ => &rules.vol_moderate,
    };

    let direction = match row.pct_7 {
        Some(p) if p > 0.0 => &rules.momentum_up,
        Some(p) if p < 0.0 => &rules.momentum_down,
        _ => &rules.momentum_flat,
    };

    format!("Trend {trend}, volatility {volatility}, {direction}. News: {narrative}")
}
