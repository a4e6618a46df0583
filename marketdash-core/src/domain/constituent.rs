//! Constituent: a member security of a market index.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constituent {
    pub ticker: String,
    pub name: String,
    pub index: String,
}
