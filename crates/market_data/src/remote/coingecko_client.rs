use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use common::config::MarketDataConfig;

use super::endpoints::ApiRequest;
use crate::error::MarketDataError;

pub const API_KEY_HEADER: &str = "x-cg-pro-api-key";
pub const API_KEY_PARAM: &str = "x_cg_pro_api_key";
pub const CACHE_BUSTER_PARAM: &str = "_t";

const USER_AGENT: &str = concat!("signal-dashboard/", env!("CARGO_PKG_VERSION"));

/// Transport seam between the cached service layer and the HTTP API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataApi: Send + Sync {
    async fn fetch(&self, request: &ApiRequest) -> Result<Value, MarketDataError>;
}

#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CoinGeckoClient {
    pub fn new(config: &MarketDataConfig) -> Result<Self, MarketDataError> {
        let api_key = config.api_key.clone().ok_or(MarketDataError::MissingApiKey)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MarketDataError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Full request URL: the request's own params plus the API key and a
    /// millisecond cache buster.
    fn url_for(&self, request: &ApiRequest, now_ms: i64) -> Result<Url, MarketDataError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, request.path))
            .map_err(|e| MarketDataError::InvalidRequest(e.to_string()))?;
        url.query_pairs_mut()
            .extend_pairs(&request.params)
            .append_pair(CACHE_BUSTER_PARAM, &now_ms.to_string())
            .append_pair(API_KEY_PARAM, &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl MarketDataApi for CoinGeckoClient {
    async fn fetch(&self, request: &ApiRequest) -> Result<Value, MarketDataError> {
        let url = self.url_for(request, Utc::now().timestamp_millis())?;
        debug!("GET {}", request.path);

        let resp = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(&e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MarketDataError::from_status(status.as_u16(), &body));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| MarketDataError::from_transport(&e))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(api_key: Option<&str>) -> MarketDataConfig {
        MarketDataConfig {
            api_key: api_key.map(str::to_string),
            base_url: "https://pro-api.coingecko.com/api/v3/".into(),
            timeout: Duration::from_secs(15),
        }
    }

    #[test]
    fn test_client_requires_api_key() {
        assert!(matches!(
            CoinGeckoClient::new(&config(None)),
            Err(MarketDataError::MissingApiKey)
        ));
    }

    #[test]
    fn test_url_carries_key_and_cache_buster() {
        let client = CoinGeckoClient::new(&config(Some("cg-key"))).unwrap();
        let url = client
            .url_for(&ApiRequest::global(), 1_715_342_400_123)
            .unwrap();

        assert_eq!(url.path(), "/api/v3/global");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("_t".into(), "1715342400123".into())));
        assert!(pairs.contains(&("x_cg_pro_api_key".into(), "cg-key".into())));
    }

    #[test]
    fn test_url_keeps_request_params() {
        let client = CoinGeckoClient::new(&config(Some("k"))).unwrap();
        let url = client.url_for(&ApiRequest::search("bonk"), 0).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("query".into(), "bonk".into()));
    }

    #[test]
    fn test_cache_key_ignores_signing_params() {
        let request = ApiRequest::global();
        assert_eq!(request.cache_key(), "coingecko:global");
    }
}
