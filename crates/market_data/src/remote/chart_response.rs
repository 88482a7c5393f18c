use serde::{Deserialize, Serialize};

use common::models::Candle;

use crate::traits::RemoteResponse;

/// `/coins/{id}/ohlc` row: `[time_ms, open, high, low, close]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct OhlcRow(pub [f64; 5]);

impl RemoteResponse<Candle> for OhlcRow {
    fn to_model(&self) -> Candle {
        let [time, open, high, low, close] = self.0;
        Candle {
            time: time as i64,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }
}

/// `/coins/{id}/market_chart`: `[time_ms, value]` series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<[f64; 2]>,
    #[serde(default)]
    pub market_caps: Vec<[f64; 2]>,
    #[serde(default)]
    pub total_volumes: Vec<[f64; 2]>,
}

impl MarketChart {
    pub fn latest_price(&self) -> Option<f64> {
        self.prices.last().map(|[_, price]| *price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ohlc_rows_become_candles() {
        let rows: Vec<OhlcRow> =
            serde_json::from_str("[[1715342400000, 150.1, 152.0, 149.5, 151.2]]").unwrap();
        let candle = rows[0].to_model();
        assert_eq!(candle.time, 1_715_342_400_000);
        assert_eq!(candle.close, 151.2);
        assert_eq!(candle.volume, None);
    }

    #[test]
    fn test_chart_latest_price() {
        let chart: MarketChart =
            serde_json::from_str(r#"{"prices":[[1,2.0],[2,3.5]]}"#).unwrap();
        assert_eq!(chart.latest_price(), Some(3.5));
        assert!(chart.total_volumes.is_empty());
    }
}
