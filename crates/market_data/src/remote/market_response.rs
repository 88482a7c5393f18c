use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::models::MarketSnapshot;

use crate::traits::RemoteResponse;

/// One row of `/coins/markets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u32>,
    pub total_volume: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub sparkline_in_7d: Option<Sparkline>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sparkline {
    #[serde(default)]
    pub price: Vec<f64>,
}

impl CoinMarket {
    pub fn sparkline_prices(&self) -> &[f64] {
        self.sparkline_in_7d
            .as_ref()
            .map(|s| s.price.as_slice())
            .unwrap_or_default()
    }
}

impl RemoteResponse<MarketSnapshot> for CoinMarket {
    fn to_model(&self) -> MarketSnapshot {
        MarketSnapshot {
            current_price: self.current_price,
            price_change_percentage_24h: self.price_change_percentage_24h,
            total_volume: self.total_volume,
            market_cap: self.market_cap,
            market_cap_rank: self.market_cap_rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_with_nulls_deserializes() {
        let raw = r#"{
            "id": "samoyedcoin",
            "symbol": "samo",
            "name": "Samoyedcoin",
            "image": null,
            "current_price": 0.0091,
            "market_cap": null,
            "market_cap_rank": null,
            "total_volume": 120000.0,
            "price_change_percentage_24h": -3.2,
            "last_updated": "2024-05-10T12:00:00.000Z",
            "sparkline_in_7d": {"price": [0.009, 0.0091]}
        }"#;
        let row: CoinMarket = serde_json::from_str(raw).unwrap();

        assert_eq!(row.sparkline_prices(), &[0.009, 0.0091]);
        assert!(row.last_updated.is_some());

        let snapshot = row.to_model();
        assert_eq!(snapshot.market_cap, None);
        assert_eq!(snapshot.total_volume, Some(120000.0));
        assert_eq!(snapshot.price_change_percentage_24h, Some(-3.2));
    }

    #[test]
    fn test_missing_sparkline_is_empty() {
        let row: CoinMarket =
            serde_json::from_str(r#"{"id":"bonk","symbol":"bonk","name":"Bonk"}"#).unwrap();
        assert!(row.sparkline_prices().is_empty());
    }
}
