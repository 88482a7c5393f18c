use serde::{Deserialize, Serialize};

/// Rank used to sort coins without a market-cap rank after ranked ones.
pub const UNRANKED: u32 = 999_999;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub coins: Vec<SearchCoin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCoin {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
    pub thumb: Option<String>,
    pub large: Option<String>,
}

impl SearchCoin {
    pub fn sort_rank(&self) -> u32 {
        self.market_cap_rank.filter(|r| *r > 0).unwrap_or(UNRANKED)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingResponse {
    pub coins: Vec<TrendingItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingItem {
    pub item: TrendingCoin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
    pub thumb: Option<String>,
    pub price_btc: Option<f64>,
    pub score: Option<u32>,
}
