use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use common::models::MarketSnapshot;

use super::endpoints::DEFAULT_VS_CURRENCY;
use super::market_response::Sparkline;
use crate::traits::RemoteResponse;

type CurrencyMap = HashMap<String, Option<f64>>;

/// `/coins/{id}` with market data and sparkline enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetails {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_cap_rank: Option<u32>,
    pub image: Option<CoinImage>,
    #[serde(default)]
    pub description: HashMap<String, String>,
    #[serde(default)]
    pub categories: Vec<Option<String>>,
    pub market_data: Option<CoinMarketData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinImage {
    pub thumb: Option<String>,
    pub small: Option<String>,
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinMarketData {
    #[serde(default)]
    pub current_price: CurrencyMap,
    #[serde(default)]
    pub market_cap: CurrencyMap,
    #[serde(default)]
    pub total_volume: CurrencyMap,
    #[serde(default)]
    pub high_24h: CurrencyMap,
    #[serde(default)]
    pub low_24h: CurrencyMap,
    #[serde(default)]
    pub ath: CurrencyMap,
    pub price_change_percentage_24h: Option<f64>,
    pub price_change_percentage_7d: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub sparkline_7d: Option<Sparkline>,
}

fn in_currency(map: &CurrencyMap, currency: &str) -> Option<f64> {
    map.get(currency).copied().flatten()
}

impl CoinMarketData {
    pub fn price_in(&self, currency: &str) -> Option<f64> {
        in_currency(&self.current_price, currency)
    }
}

impl CoinDetails {
    pub fn english_description(&self) -> Option<&str> {
        self.description
            .get("en")
            .map(String::as_str)
            .filter(|d| !d.trim().is_empty())
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().flatten().map(String::as_str)
    }
}

impl RemoteResponse<MarketSnapshot> for CoinDetails {
    fn to_model(&self) -> MarketSnapshot {
        let data = self.market_data.clone().unwrap_or_default();
        MarketSnapshot {
            current_price: in_currency(&data.current_price, DEFAULT_VS_CURRENCY),
            price_change_percentage_24h: data.price_change_percentage_24h,
            total_volume: in_currency(&data.total_volume, DEFAULT_VS_CURRENCY),
            market_cap: in_currency(&data.market_cap, DEFAULT_VS_CURRENCY),
            market_cap_rank: self.market_cap_rank,
        }
    }
}
