use serde::{Deserialize, Serialize};

use common::models::Candle;

use crate::traits::{RemoteResponse, parse_decimal};

#[derive(Debug, Clone, Deserialize)]
pub struct PoolsResponse {
    pub data: Vec<Pool>,
}

/// An on-chain liquidity pool. Numeric attributes arrive as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub attributes: PoolAttributes,
    #[serde(default)]
    pub relationships: PoolRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolAttributes {
    pub name: Option<String>,
    pub address: Option<String>,
    pub base_token_price_usd: Option<String>,
    pub quote_token_price_usd: Option<String>,
    pub reserve_in_usd: Option<String>,
    pub fdv_usd: Option<String>,
    pub pool_created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolRelationships {
    pub base_token: Option<Relationship>,
    pub quote_token: Option<Relationship>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub data: Option<TokenRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRef {
    pub id: String,
    pub symbol: Option<String>,
}

fn symbol_mentions_sol(rel: &Option<Relationship>) -> bool {
    rel.as_ref()
        .and_then(|r| r.data.as_ref())
        .and_then(|d| d.symbol.as_deref())
        .is_some_and(|s| s.to_lowercase().contains("sol"))
}

impl Pool {
    pub fn is_solana(&self) -> bool {
        self.id.starts_with("solana_")
            || symbol_mentions_sol(&self.relationships.base_token)
            || symbol_mentions_sol(&self.relationships.quote_token)
    }

    pub fn reserve_usd(&self) -> Option<f64> {
        parse_decimal(self.attributes.reserve_in_usd.as_deref())
    }

    pub fn base_price_usd(&self) -> Option<f64> {
        parse_decimal(self.attributes.base_token_price_usd.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolOhlcvResponse {
    pub data: PoolOhlcvData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolOhlcvData {
    pub attributes: PoolOhlcvAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolOhlcvAttributes {
    #[serde(default)]
    pub ohlcv_list: Vec<PoolOhlcvRow>,
}

/// `[time_secs, open, high, low, close, volume]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct PoolOhlcvRow(pub [f64; 6]);

impl RemoteResponse<Candle> for PoolOhlcvRow {
    fn to_model(&self) -> Candle {
        let [time, open, high, low, close, volume] = self.0;
        Candle {
            time: (time as i64) * 1000,
            open,
            high,
            low,
            close,
            volume: Some(volume),
        }
    }
}
