use serde::{Deserialize, Serialize};

/// The subset of a market listing row the signal deriver reads.
/// Every field is optional; a missing field is a neutral contribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub current_price: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub total_volume: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u32>,
}
