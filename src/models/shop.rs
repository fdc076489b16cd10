use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopMeta {
    pub path: String,
    pub customer_count: usize,
    pub delinquent_count: usize,
    pub last_updated_on: Option<String>,
}
