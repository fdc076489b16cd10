use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelinquencyRecord {
    pub id: i64,
    pub customer_id: i64,
    pub status: bool, // true = delinquent, false = regularized
    pub updated_on: String, // ISO date, e.g. "2026-08-07"
}

/// Record joined with customer info, the row shape of the listing screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelinquencyEntry {
    pub id: i64,
    pub customer_id: i64,
    pub name: String,
    pub phone: String,
    pub status: bool,
    pub updated_on: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    All,
    Delinquent,
    Regularized,
}

impl StatusFilter {
    pub fn matches(self, status: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Delinquent => status,
            StatusFilter::Regularized => !status,
        }
    }
}
