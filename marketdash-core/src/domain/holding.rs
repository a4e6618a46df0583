//! Holding: one portfolio line as the user entered it.

use serde::{Deserialize, Serialize};

/// A position in the user's portfolio.
///
/// Serialized with the record keys of the portfolio file
/// (`Name`, `Ticker`, `Account`, `Quantity`, `PRU`). Any field may be null;
/// lines without a ticker are kept in the file but skipped by valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Ticker", default)]
    pub ticker: Option<String>,
    #[serde(rename = "Account", default)]
    pub account: Option<String>,
    #[serde(rename = "Quantity", default)]
    pub quantity: Option<f64>,
    /// Average acquisition price per unit.
    #[serde(rename = "PRU", default)]
    pub pru: Option<f64>,
}

impl Holding {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            name: None,
            ticker: Some(ticker.into()),
            account: None,
            quantity: None,
            pru: None,
        }
    }

    /// Display name, falling back to the ticker.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.ticker.as_deref())
            .unwrap_or("")
    }

    /// Cost basis usable by the decision engine (finite and positive).
    pub fn cost_basis(&self) -> Option<f64> {
        self.pru.filter(|p| p.is_finite() && *p > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_ticker() {
        let mut h = Holding::new("AIR.PA");
        assert_eq!(h.display_name(), "AIR.PA");
        h.name = Some("Airbus".into());
        assert_eq!(h.display_name(), "Airbus");
    }

    #[test]
    fn cost_basis_ignores_non_positive() {
        let mut h = Holding::new("AIR.PA");
        assert_eq!(h.cost_basis(), None);
        h.pru = Some(0.0);
        assert_eq!(h.cost_basis(), None);
        h.pru = Some(120.5);
        assert_eq!(h.cost_basis(), Some(120.5));
    }

    #[test]
    fn deserializes_record_keys_with_nulls() {
        let json = r#"{"Name":"Total","Ticker":"TTE.PA","Account":null,"Quantity":null,"PRU":55.2}"#;
        let h: Holding = serde_json::from_str(json).unwrap();
        assert_eq!(h.ticker.as_deref(), Some("TTE.PA"));
        assert_eq!(h.account, None);
        assert_eq!(h.quantity, None);
        assert_eq!(h.pru, Some(55.2));
    }
}
