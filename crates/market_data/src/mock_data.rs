//! Canned market data used when no API key is configured.
//!
//! Responses mirror the upstream JSON shapes closely enough that the
//! service layer decodes them exactly like live data.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::MarketDataError;
use crate::remote::{ApiRequest, MarketDataApi};

struct FixtureCoin {
    id: &'static str,
    symbol: &'static str,
    name: &'static str,
    price: f64,
    market_cap: f64,
    volume: f64,
    change_24h: f64,
    rank: Option<u32>,
}

#[rustfmt::skip]
const FIXTURE_COINS: &[FixtureCoin] = &[
    FixtureCoin { id: "bitcoin", symbol: "btc", name: "Bitcoin", price: 63_250.0, market_cap: 1.245e12, volume: 2.81e10, change_24h: 1.12, rank: Some(1) },
    FixtureCoin { id: "ethereum", symbol: "eth", name: "Ethereum", price: 3_050.0, market_cap: 3.66e11, volume: 1.42e10, change_24h: -0.84, rank: Some(2) },
    FixtureCoin { id: "solana", symbol: "sol", name: "Solana", price: 148.62, market_cap: 6.68e10, volume: 2.35e9, change_24h: 3.41, rank: Some(5) },
    FixtureCoin { id: "pyth-network", symbol: "pyth", name: "Pyth Network", price: 0.412, market_cap: 6.18e8, volume: 6.9e7, change_24h: -2.15, rank: Some(96) },
    FixtureCoin { id: "render-token", symbol: "rndr", name: "Render", price: 7.84, market_cap: 3.04e9, volume: 2.1e8, change_24h: 5.62, rank: Some(36) },
    FixtureCoin { id: "bonk", symbol: "bonk", name: "Bonk", price: 0.000_024_1, market_cap: 1.61e9, volume: 2.74e8, change_24h: 8.93, rank: Some(58) },
    FixtureCoin { id: "samoyedcoin", symbol: "samo", name: "Samoyedcoin", price: 0.0121, market_cap: 4.8e7, volume: 1.3e6, change_24h: -4.07, rank: Some(812) },
    FixtureCoin { id: "raydium", symbol: "ray", name: "Raydium", price: 1.63, market_cap: 4.2e8, volume: 3.6e7, change_24h: 2.28, rank: Some(170) },
    FixtureCoin { id: "marinade-staked-sol", symbol: "msol", name: "Marinade Staked SOL", price: 175.1, market_cap: 1.05e9, volume: 8.4e6, change_24h: 3.22, rank: Some(71) },
    FixtureCoin { id: "jito-staked-sol", symbol: "jitosol", name: "Jito Staked SOL", price: 168.9, market_cap: 1.9e9, volume: 1.5e7, change_24h: 3.35, rank: Some(48) },
    FixtureCoin { id: "solanium", symbol: "slim", name: "Solanium", price: 0.21, market_cap: 2.1e7, volume: 4.0e5, change_24h: 0.0, rank: None },
];

/// Fixed epoch the fixture series end at (2024-05-10T12:00:00Z).
const FIXTURE_NOW_MS: i64 = 1_715_342_400_000;
const HOUR_MS: i64 = 3_600_000;

/// Answers every market-data endpoint from in-process fixtures.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource;

impl MockDataSource {
    pub fn new() -> Self {
        Self
    }
}

fn param<'a>(request: &'a ApiRequest, key: &str) -> Option<&'a str> {
    request
        .params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn fixture(id: &str) -> Option<&'static FixtureCoin> {
    FIXTURE_COINS.iter().find(|c| c.id == id)
}

/// Deterministic price walk ending at `last`, oldest sample first.
fn price_series(last: f64, change_pct: f64, samples: usize) -> Vec<f64> {
    let start = last / (1.0 + change_pct / 100.0);
    (0..samples)
        .map(|i| {
            let t = if samples > 1 {
                i as f64 / (samples - 1) as f64
            } else {
                1.0
            };
            let wobble = 1.0 + 0.004 * (i as f64 * 0.7).sin() * (1.0 - t);
            (start + (last - start) * t) * wobble
        })
        .collect()
}

fn market_row(coin: &FixtureCoin, sparkline: bool) -> Value {
    let mut row = json!({
        "id": coin.id,
        "symbol": coin.symbol,
        "name": coin.name,
        "image": format!("https://assets.coingecko.com/coins/images/{}/large.png", coin.id),
        "current_price": coin.price,
        "market_cap": coin.market_cap,
        "market_cap_rank": coin.rank,
        "total_volume": coin.volume,
        "high_24h": coin.price * 1.03,
        "low_24h": coin.price * 0.97,
        "price_change_percentage_24h": coin.change_24h,
        "last_updated": "2024-05-10T12:00:00.000Z",
    });
    if sparkline {
        row["sparkline_in_7d"] = json!({ "price": price_series(coin.price, coin.change_24h, 168) });
    }
    row
}

fn markets(request: &ApiRequest) -> Value {
    let sparkline = param(request, "sparkline") == Some("true");
    let ids = param(request, "ids").unwrap_or_default();
    let mut rows: Vec<&FixtureCoin> = ids.split(',').filter_map(fixture).collect();
    rows.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
    Value::Array(rows.into_iter().map(|c| market_row(c, sparkline)).collect())
}

fn search(request: &ApiRequest) -> Value {
    let query = param(request, "query").unwrap_or_default().to_lowercase();
    let coins: Vec<Value> = FIXTURE_COINS
        .iter()
        .filter(|c| {
            c.id.contains(&query)
                || c.symbol.contains(&query)
                || c.name.to_lowercase().contains(&query)
        })
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "symbol": c.symbol.to_uppercase(),
                "market_cap_rank": c.rank,
                "thumb": format!("https://assets.coingecko.com/coins/images/{}/thumb.png", c.id),
                "large": format!("https://assets.coingecko.com/coins/images/{}/large.png", c.id),
            })
        })
        .collect();
    json!({ "coins": coins, "exchanges": [], "categories": [], "nfts": [] })
}

fn trending() -> Value {
    let ids = [
        "bonk",
        "render-token",
        "pyth-network",
        "raydium",
        "solana",
        "samoyedcoin",
        "bitcoin",
    ];
    let coins: Vec<Value> = ids
        .iter()
        .filter_map(|id| fixture(id))
        .enumerate()
        .map(|(score, c)| {
            json!({
                "item": {
                    "id": c.id,
                    "name": c.name,
                    "symbol": c.symbol.to_uppercase(),
                    "market_cap_rank": c.rank,
                    "thumb": format!("https://assets.coingecko.com/coins/images/{}/thumb.png", c.id),
                    "price_btc": c.price / 63_250.0,
                    "score": score,
                }
            })
        })
        .collect();
    json!({ "coins": coins, "nfts": [], "categories": [] })
}

fn details(coin: &FixtureCoin) -> Value {
    json!({
        "id": coin.id,
        "symbol": coin.symbol,
        "name": coin.name,
        "market_cap_rank": coin.rank,
        "image": {
            "thumb": format!("https://assets.coingecko.com/coins/images/{}/thumb.png", coin.id),
            "small": format!("https://assets.coingecko.com/coins/images/{}/small.png", coin.id),
            "large": format!("https://assets.coingecko.com/coins/images/{}/large.png", coin.id),
        },
        "description": { "en": format!("{} is a token in the Solana ecosystem.", coin.name) },
        "categories": ["Solana Ecosystem"],
        "market_data": {
            "current_price": { "usd": coin.price },
            "market_cap": { "usd": coin.market_cap },
            "total_volume": { "usd": coin.volume },
            "high_24h": { "usd": coin.price * 1.03 },
            "low_24h": { "usd": coin.price * 0.97 },
            "price_change_percentage_24h": coin.change_24h,
            "sparkline_7d": { "price": price_series(coin.price, coin.change_24h, 168) },
        }
    })
}

fn days(request: &ApiRequest) -> u32 {
    param(request, "days")
        .and_then(|d| d.parse().ok())
        .unwrap_or(1)
}

fn ohlc(coin: &FixtureCoin, request: &ApiRequest) -> Value {
    // 30 minute bars for a day, 4 hour bars beyond.
    let (bars, step_ms) = match days(request) {
        1 => (48, HOUR_MS / 2),
        d => ((d as usize * 6).min(180), HOUR_MS * 4),
    };
    let closes = price_series(coin.price, coin.change_24h, bars + 1);
    let rows: Vec<Value> = closes
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let time = FIXTURE_NOW_MS - (bars - i) as i64 * step_ms;
            let (open, close) = (w[0], w[1]);
            json!([time, open, open.max(close) * 1.002, open.min(close) * 0.998, close])
        })
        .collect();
    Value::Array(rows)
}

fn market_chart(coin: &FixtureCoin, request: &ApiRequest) -> Value {
    let (samples, step_ms) = match days(request) {
        1 => (288, HOUR_MS / 12),
        d if d <= 90 => (d as usize * 24, HOUR_MS),
        d => (d as usize, HOUR_MS * 24),
    };
    let prices = price_series(coin.price, coin.change_24h, samples);
    let series = |scale: f64| -> Vec<Value> {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let time = FIXTURE_NOW_MS - (samples - 1 - i) as i64 * step_ms;
                json!([time, p * scale])
            })
            .collect()
    };
    json!({
        "prices": series(1.0),
        "market_caps": series(coin.market_cap / coin.price),
        "total_volumes": series(coin.volume / coin.price),
    })
}

fn pools() -> Value {
    json!({
        "data": [
            {
                "id": "solana_58oQChx4yWmvKdwLLZzBi4ChoCc2fqCUWBkwMihLYQo2",
                "type": "pool",
                "attributes": {
                    "name": "SOL / USDC",
                    "address": "58oQChx4yWmvKdwLLZzBi4ChoCc2fqCUWBkwMihLYQo2",
                    "base_token_price_usd": "148.62",
                    "quote_token_price_usd": "1.0",
                    "reserve_in_usd": "18250000.4",
                    "fdv_usd": "70100000000",
                    "pool_created_at": "2021-08-02T10:00:00Z"
                },
                "relationships": {
                    "base_token": { "data": { "id": "solana_So11111111111111111111111111111111111111112", "symbol": "SOL" } },
                    "quote_token": { "data": { "id": "solana_EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "symbol": "USDC" } }
                }
            },
            {
                "id": "solana_Bonk5vQ3mAhuPUpA4w3zBjeRXGw5VuWCBA2KPMfXKhA",
                "type": "pool",
                "attributes": {
                    "name": "BONK / SOL",
                    "address": "Bonk5vQ3mAhuPUpA4w3zBjeRXGw5VuWCBA2KPMfXKhA",
                    "base_token_price_usd": "0.0000241",
                    "quote_token_price_usd": "148.62",
                    "reserve_in_usd": "4120000.0",
                    "pool_created_at": "2023-01-05T16:20:00Z"
                },
                "relationships": {
                    "base_token": { "data": { "id": "solana_DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", "symbol": "Bonk" } },
                    "quote_token": { "data": { "id": "solana_So11111111111111111111111111111111111111112", "symbol": "SOL" } }
                }
            },
            {
                "id": "eth_0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640",
                "type": "pool",
                "attributes": {
                    "name": "USDC / WETH",
                    "address": "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640",
                    "base_token_price_usd": "1.0",
                    "reserve_in_usd": "165000000.0"
                },
                "relationships": {
                    "base_token": { "data": { "id": "eth_0xa0b8", "symbol": "USDC" } },
                    "quote_token": { "data": { "id": "eth_0xc02a", "symbol": "WETH" } }
                }
            }
        ]
    })
}

fn pool_ohlcv(request: &ApiRequest) -> Value {
    let limit = param(request, "limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(100)
        .min(1000);
    let closes = price_series(148.62, 3.41, limit + 1);
    let rows: Vec<Value> = closes
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let secs = FIXTURE_NOW_MS / 1000 - (limit - i) as i64 * 3600;
            let (open, close) = (w[0], w[1]);
            let volume = 25_000.0 + i as f64 * 10.0;
            json!([secs, open, open.max(close) * 1.001, open.min(close) * 0.999, close, volume])
        })
        .collect();
    json!({
        "data": {
            "id": "ohlcv",
            "type": "ohlcv_request_response",
            "attributes": { "ohlcv_list": rows }
        }
    })
}

fn global() -> Value {
    json!({
        "data": {
            "active_cryptocurrencies": 13_874,
            "markets": 1_092,
            "total_market_cap": { "usd": 2.41e12, "btc": 3.81e7 },
            "total_volume": { "usd": 8.9e10, "btc": 1.41e6 },
            "market_cap_percentage": { "btc": 51.7, "eth": 15.2, "usdt": 4.6, "sol": 2.8 },
            "market_cap_change_percentage_24h_usd": 1.37,
            "updated_at": FIXTURE_NOW_MS / 1000,
        }
    })
}

#[async_trait]
impl MarketDataApi for MockDataSource {
    async fn fetch(&self, request: &ApiRequest) -> Result<Value, MarketDataError> {
        debug!("Serving {} from fixtures", request.path);
        let segments: Vec<&str> = request.path.trim_start_matches('/').split('/').collect();

        let value = match segments.as_slice() {
            ["coins", "markets"] => markets(request),
            ["search"] => search(request),
            ["search", "trending"] => trending(),
            ["global"] => global(),
            ["coins", id] => details(fixture(id).ok_or(MarketDataError::NotFound)?),
            ["coins", id, "ohlc"] => ohlc(fixture(id).ok_or(MarketDataError::NotFound)?, request),
            ["coins", id, "market_chart"] => {
                market_chart(fixture(id).ok_or(MarketDataError::NotFound)?, request)
            }
            ["onchain", "networks", "trending_pools" | "new_pools"] => pools(),
            ["onchain", "networks", _, "pools", _, "ohlcv", _] => pool_ohlcv(request),
            _ => return Err(MarketDataError::NotFound),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::PoolOhlcvQuery;

    #[tokio::test]
    async fn test_markets_returns_requested_ids_only() {
        let ids = vec!["bonk".to_string(), "unknown".to_string(), "solana".to_string()];
        let value = MockDataSource
            .fetch(&ApiRequest::markets(&ids, "usd", true))
            .await
            .unwrap();

        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "solana");
        assert_eq!(rows[0]["sparkline_in_7d"]["price"].as_array().unwrap().len(), 168);
    }

    #[tokio::test]
    async fn test_unknown_coin_is_not_found() {
        let err = MockDataSource
            .fetch(&ApiRequest::coin_details("dogwifhat"))
            .await
            .unwrap_err();
        assert_eq!(err, MarketDataError::NotFound);
    }

    #[tokio::test]
    async fn test_pool_ohlcv_honours_limit() {
        let query = PoolOhlcvQuery {
            limit: Some(24),
            ..Default::default()
        };
        let value = MockDataSource
            .fetch(&ApiRequest::pool_ohlcv("solana", "abc", "hour", &query))
            .await
            .unwrap();
        let rows = value["data"]["attributes"]["ohlcv_list"].as_array().unwrap();
        assert_eq!(rows.len(), 24);
    }

    #[test]
    fn test_price_series_ends_at_last_price() {
        let series = price_series(100.0, 10.0, 30);
        assert_eq!(series.len(), 30);
        assert!((series[29] - 100.0).abs() < 1e-9);
        assert!((series[0] - 100.0 / 1.1).abs() < 1.0);
    }
}
