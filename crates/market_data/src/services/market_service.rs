use std::sync::Arc;

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::{error, info};

use common::config::MarketDataConfig;
use common::models::Candle;
use storage::CacheClient;

use crate::error::MarketDataError;
use crate::mock_data::MockDataSource;
use crate::remote::chart_response::OhlcRow;
use crate::remote::global_response::GlobalResponse;
use crate::remote::pool_response::{PoolOhlcvResponse, PoolsResponse};
use crate::remote::search_response::{SearchResponse, TrendingResponse};
use crate::remote::{
    ApiRequest, CoinDetails, CoinGeckoClient, CoinMarket, GlobalData, MarketChart, MarketDataApi,
    Pool, PoolOhlcvQuery, SearchCoin, TrendingCoin,
};
use crate::traits::RemoteResponse;

pub const SEARCH_RESULT_LIMIT: usize = 6;
pub const TRENDING_LIMIT: usize = 5;

/// Market-data endpoints behind the cache-aside layer.
///
/// Raw upstream JSON is what gets cached; trimming, sorting and filtering
/// run on every read so a cached body and a fresh one give the same result.
#[derive(Clone)]
pub struct MarketDataService {
    api: Arc<dyn MarketDataApi>,
    cache: CacheClient,
    mock: bool,
}

impl MarketDataService {
    pub fn new(api: Arc<dyn MarketDataApi>, cache: CacheClient) -> Self {
        Self {
            api,
            cache,
            mock: false,
        }
    }

    pub fn mock(cache: CacheClient) -> Self {
        Self {
            api: Arc::new(MockDataSource::new()),
            cache,
            mock: true,
        }
    }

    /// Live client when an API key is configured, fixtures otherwise.
    pub fn from_config(
        config: &MarketDataConfig,
        cache: CacheClient,
    ) -> Result<Self, MarketDataError> {
        if config.mock_mode() {
            info!("No market data API key configured, serving mock data");
            return Ok(Self::mock(cache));
        }
        let client = CoinGeckoClient::new(config)?;
        Ok(Self::new(Arc::new(client), cache))
    }

    pub fn is_mock(&self) -> bool {
        self.mock
    }

    pub fn cache(&self) -> &CacheClient {
        &self.cache
    }

    /// Cache-aside read of `request` decoded as `T`. A body that does not
    /// decode is an error for this call only and never reaches the cache;
    /// a cached body that no longer decodes counts as a miss.
    async fn get<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, MarketDataError> {
        let api = &self.api;
        let checked: Checked<T> = self
            .cache
            .get_or_fetch(&request.cache_key(), request.ttl, || async move {
                let raw = api.fetch(request).await?;
                let data = serde_json::from_value(raw.clone()).map_err(|e| {
                    error!("Unexpected response shape from {}: {}", request.path, e);
                    MarketDataError::InvalidFormat
                })?;
                Ok::<_, MarketDataError>(Checked { raw, data })
            })
            .await?;
        Ok(checked.data)
    }

    pub async fn coin_details(&self, id: &str) -> Result<CoinDetails, MarketDataError> {
        self.get(&ApiRequest::coin_details(id)).await
    }

    pub async fn ohlc(
        &self,
        id: &str,
        days: u32,
        vs_currency: &str,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let rows: Vec<OhlcRow> = self.get(&ApiRequest::ohlc(id, days, vs_currency)).await?;
        Ok(rows.iter().map(RemoteResponse::to_model).collect())
    }

    pub async fn market_chart(
        &self,
        id: &str,
        days: u32,
        vs_currency: &str,
    ) -> Result<MarketChart, MarketDataError> {
        self.get(&ApiRequest::market_chart(id, days, vs_currency)).await
    }

    /// Top matches by market-cap rank. A blank query returns nothing
    /// without touching the network.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchCoin>, MarketDataError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let response: SearchResponse = self.get(&ApiRequest::search(query)).await?;
        let mut coins: Vec<SearchCoin> = response
            .coins
            .into_iter()
            .filter(|c| !c.id.is_empty() && !c.symbol.is_empty())
            .collect();
        coins.sort_by_key(SearchCoin::sort_rank);
        coins.truncate(SEARCH_RESULT_LIMIT);
        Ok(coins)
    }

    pub async fn trending(&self) -> Result<Vec<TrendingCoin>, MarketDataError> {
        let response: TrendingResponse = self.get(&ApiRequest::trending()).await?;
        Ok(response
            .coins
            .into_iter()
            .take(TRENDING_LIMIT)
            .map(|c| c.item)
            .collect())
    }

    /// Listing rows for `ids`. An empty id list returns nothing without
    /// touching the network.
    pub async fn markets(
        &self,
        ids: &[String],
        vs_currency: &str,
        sparkline: bool,
    ) -> Result<Vec<CoinMarket>, MarketDataError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.get(&ApiRequest::markets(ids, vs_currency, sparkline)).await
    }

    pub async fn trending_pools(
        &self,
        page: Option<u32>,
        duration: Option<&str>,
    ) -> Result<Vec<Pool>, MarketDataError> {
        let request = ApiRequest::trending_pools(page, duration);
        let response: PoolsResponse = self.get(&request).await?;
        Ok(solana_only(response))
    }

    pub async fn new_pools(&self, page: Option<u32>) -> Result<Vec<Pool>, MarketDataError> {
        let response: PoolsResponse = self.get(&ApiRequest::new_pools(page)).await?;
        Ok(solana_only(response))
    }

    pub async fn pool_ohlcv(
        &self,
        network: &str,
        address: &str,
        timeframe: &str,
        query: &PoolOhlcvQuery,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let request = ApiRequest::pool_ohlcv(network, address, timeframe, query);
        let response: PoolOhlcvResponse = self.get(&request).await?;
        Ok(response
            .data
            .attributes
            .ohlcv_list
            .iter()
            .map(RemoteResponse::to_model)
            .collect())
    }

    pub async fn global(&self) -> Result<GlobalData, MarketDataError> {
        let response: GlobalResponse = self.get(&ApiRequest::global()).await?;
        Ok(response.data)
    }
}

/// Upstream body paired with its decoded form. Only the raw body is
/// serialized, and deserializing fails unless it still decodes as `T`.
struct Checked<T> {
    raw: Value,
    data: T,
}

impl<T> Serialize for Checked<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Checked<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let data = T::deserialize(&raw).map_err(de::Error::custom)?;
        Ok(Self { raw, data })
    }
}

fn solana_only(response: PoolsResponse) -> Vec<Pool> {
    response.data.into_iter().filter(Pool::is_solana).collect()
}
