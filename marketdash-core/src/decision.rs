//! Decision engine: one MetricsRow in, one discrete label out.
//!
//! Three terms are weighed into a composite score:
//! - trend: how many of MA20/MA50 the close sits at or above
//! - cost basis: where the close sits relative to the holder's average price
//! - volatility: ATR14/close against a ceiling
//!
//! The composite is then thresholded, with separate bands for held and
//! non-held positions. The engine never fails; an unusable close is Watch.

use crate::domain::{Decision, MetricsRow};
use serde::{Deserialize, Serialize};

/// Coefficients and thresholds of the decision heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionRules {
    /// ATR/close above this counts as too volatile.
    pub volatility_ceiling: f64,
    /// ATR/close assumed when ATR is undefined.
    pub default_volatility: f64,
    pub trend_weight: f64,
    pub cost_basis_weight: f64,
    pub volatility_weight: f64,
    /// Relative band around the cost basis that scores zero.
    pub cost_basis_band: f64,
    pub held_buy_above: f64,
    pub held_sell_below: f64,
    pub buy_above: f64,
    pub avoid_below: f64,
}

impl Default for DecisionRules {
    fn default() -> Self {
        Self {
            volatility_ceiling: 0.05,
            default_volatility: 0.03,
            trend_weight: 0.4,
            cost_basis_weight: 0.2,
            volatility_weight: 0.2,
            cost_basis_band: 0.02,
            held_buy_above: 0.4,
            held_sell_below: -0.2,
            buy_above: 0.3,
            avoid_below: -0.2,
        }
    }
}

/// Number of moving averages (0..=2) the close is at or above.
/// An undefined average counts as not met.
pub fn trend_strength(row: &MetricsRow) -> u8 {
    [row.ma20, row.ma50]
        .into_iter()
        .filter(|ma| matches!(ma, Some(m) if row.close >= *m))
        .count() as u8
}

/// Weighted sum of the trend, cost-basis and volatility terms.
pub fn composite_score(row: &MetricsRow, cost_basis: Option<f64>, rules: &DecisionRules) -> f64 {
    let trend = match trend_strength(row) {
        2 => 1.0,
        1 => 0.0,
        _ => -1.0,
    };

    let basis = match cost_basis.filter(|b| b.is_finite() && *b > 0.0) {
        Some(b) if row.close > b * (1.0 + rules.cost_basis_band) => 1.0,
        Some(b) if row.close < b * (1.0 - rules.cost_basis_band) => -1.0,
        _ => 0.0,
    };

    let vol = row.volatility_ratio().unwrap_or(rules.default_volatility);
    let calm = if vol > rules.volatility_ceiling { -1.0 } else { 1.0 };

    let mut score = 0.0;
    score += rules.trend_weight * trend;
    score += rules.cost_basis_weight * basis;
    score += rules.volatility_weight * calm;
    score
}

/// Map a composite score to a label. Both comparisons are strict.
pub fn label_for(composite: f64, held: bool, rules: &DecisionRules) -> Decision {
    if held {
        if composite > rules.held_buy_above {
            Decision::Buy
        } else if composite < rules.held_sell_below {
            Decision::Sell
        } else {
            Decision::Hold
        }
    } else if composite > rules.buy_above {
        Decision::Buy
    } else if composite < rules.avoid_below {
        Decision::Avoid
    } else {
        Decision::Watch
    }
}

/// Label a row. `cost_basis` only matters when positive.
pub fn decision_label(
    row: &MetricsRow,
    cost_basis: Option<f64>,
    held: bool,
    rules: &DecisionRules,
) -> Decision {
    if !row.close.is_finite() {
        return Decision::Watch;
    }
    label_for(composite_score(row, cost_basis, rules), held, rules)
}
