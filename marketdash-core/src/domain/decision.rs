//! Decision: the discrete recommendation label.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Buy,
    Sell,
    Hold,
    Watch,
    Avoid,
}

impl Decision {
    pub fn label(self) -> &'static str {
        match self {
            Decision::Buy => "Buy",
            Decision::Sell => "Sell",
            Decision::Hold => "Hold",
            Decision::Watch => "Watch",
            Decision::Avoid => "Avoid",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}
