use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::endpoints::DEFAULT_VS_CURRENCY;

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalResponse {
    pub data: GlobalData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalData {
    pub active_cryptocurrencies: u64,
    pub markets: u64,
    pub total_market_cap: HashMap<String, f64>,
    pub total_volume: HashMap<String, f64>,
    pub market_cap_percentage: HashMap<String, f64>,
    pub market_cap_change_percentage_24h_usd: f64,
    pub updated_at: i64,
}

impl GlobalData {
    pub fn total_market_cap_usd(&self) -> Option<f64> {
        self.total_market_cap.get(DEFAULT_VS_CURRENCY).copied()
    }

    pub fn total_volume_usd(&self) -> Option<f64> {
        self.total_volume.get(DEFAULT_VS_CURRENCY).copied()
    }

    /// Market-cap dominance, largest first.
    pub fn dominance(&self) -> Vec<(&str, f64)> {
        let mut shares: Vec<(&str, f64)> = self
            .market_cap_percentage
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        shares.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominance_is_sorted() {
        let raw = r#"{"data":{"active_cryptocurrencies":13000,"total_market_cap":{"usd":2.5e12},"market_cap_percentage":{"eth":16.2,"btc":52.1,"sol":3.4}}}"#;
        let global: GlobalResponse = serde_json::from_str(raw).unwrap();
        let data = global.data;

        assert_eq!(data.total_market_cap_usd(), Some(2.5e12));
        assert_eq!(data.total_volume_usd(), None);
        let names: Vec<&str> = data.dominance().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["btc", "eth", "sol"]);
    }
}
