//! MetricsRow: the latest close plus derived indicators for one ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Look-back horizon for percentage changes, counted in trading sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    OneSession,
    SevenSessions,
    TwentyTwoSessions,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [
        Horizon::OneSession,
        Horizon::SevenSessions,
        Horizon::TwentyTwoSessions,
    ];

    /// Number of sessions between the reference close and the latest close.
    pub fn sessions(self) -> usize {
        match self {
            Horizon::OneSession => 1,
            Horizon::SevenSessions => 7,
            Horizon::TwentyTwoSessions => 22,
        }
    }

    /// Calendar days of history to request so the horizon is covered.
    pub fn history_days(self) -> u32 {
        match self {
            Horizon::OneSession => 60,
            Horizon::SevenSessions => 90,
            Horizon::TwentyTwoSessions => 150,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Horizon::OneSession => "1 session",
            Horizon::SevenSessions => "7 sessions",
            Horizon::TwentyTwoSessions => "22 sessions",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1" | "1s" | "day" => Some(Horizon::OneSession),
            "7" | "7s" | "week" => Some(Horizon::SevenSessions),
            "22" | "22s" | "month" => Some(Horizon::TwentyTwoSessions),
            _ => None,
        }
    }
}

/// One row per ticker: the latest bar's close and the indicators at that bar.
///
/// `None` means the ticker does not have enough history for that cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: f64,
    pub atr14: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub pct_1: Option<f64>,
    pub pct_7: Option<f64>,
    pub pct_22: Option<f64>,
}

impl MetricsRow {
    pub fn change(&self, horizon: Horizon) -> Option<f64> {
        match horizon {
            Horizon::OneSession => self.pct_1,
            Horizon::SevenSessions => self.pct_7,
            Horizon::TwentyTwoSessions => self.pct_22,
        }
    }

    /// ATR14 as a fraction of the close, when both are usable.
    pub fn volatility_ratio(&self) -> Option<f64> {
        match self.atr14 {
            Some(atr) if atr.is_finite() && self.close.is_finite() && self.close > 0.0 => {
                Some(atr / self.close)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> MetricsRow {
        MetricsRow {
            ticker: "MC.PA".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            close: 100.0,
            atr14: Some(2.5),
            ma20: None,
            ma50: None,
            pct_1: Some(0.01),
            pct_7: None,
            pct_22: Some(-0.05),
        }
    }

    #[test]
    fn change_selects_horizon() {
        let r = row();
        assert_eq!(r.change(Horizon::OneSession), Some(0.01));
        assert_eq!(r.change(Horizon::SevenSessions), None);
        assert_eq!(r.change(Horizon::TwentyTwoSessions), Some(-0.05));
    }

    #[test]
    fn volatility_ratio_requires_positive_close() {
        let mut r = row();
        assert_eq!(r.volatility_ratio(), Some(0.025));
        r.close = 0.0;
        assert_eq!(r.volatility_ratio(), None);
        r.close = f64::NAN;
        assert_eq!(r.volatility_ratio(), None);
    }

    #[test]
    fn horizon_history_covers_sessions() {
        for h in Horizon::ALL {
            assert!(h.history_days() as usize > h.sessions());
        }
        assert_eq!(Horizon::parse("7"), Some(Horizon::SevenSessions));
        assert_eq!(Horizon::parse("30"), None);
    }
}
