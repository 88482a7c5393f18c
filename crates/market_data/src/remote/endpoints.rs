use storage::{CacheTtl, cache_key};

pub const DEFAULT_VS_CURRENCY: &str = "usd";

/// A GET against the market-data API: path, query parameters and the
/// freshness tier its response is cached under.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub path: String,
    pub params: Vec<(String, String)>,
    pub ttl: CacheTtl,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolOhlcvQuery {
    pub aggregate: Option<String>,
    pub before_timestamp: Option<i64>,
    pub limit: Option<u32>,
    pub currency: Option<String>,
    pub token: Option<String>,
}

/// Chart granularity the API is asked for over a `days` window.
pub fn chart_interval(days: u32) -> &'static str {
    match days {
        1 => "minute",
        d if d <= 90 => "hourly",
        _ => "daily",
    }
}

impl ApiRequest {
    fn new(path: impl Into<String>, ttl: CacheTtl) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            ttl,
        }
    }

    fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    fn maybe_param<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    pub fn cache_key(&self) -> String {
        cache_key(&self.path, &self.params)
    }

    pub fn coin_details(id: &str) -> Self {
        Self::new(format!("/coins/{id}"), CacheTtl::Medium)
            .param("localization", false)
            .param("tickers", true)
            .param("market_data", true)
            .param("community_data", false)
            .param("developer_data", false)
            .param("sparkline", true)
    }

    pub fn ohlc(id: &str, days: u32, vs_currency: &str) -> Self {
        Self::new(format!("/coins/{id}/ohlc"), CacheTtl::Short)
            .param("vs_currency", vs_currency)
            .param("days", days)
            .param("precision", "full")
    }

    pub fn market_chart(id: &str, days: u32, vs_currency: &str) -> Self {
        Self::new(format!("/coins/{id}/market_chart"), CacheTtl::Short)
            .param("vs_currency", vs_currency)
            .param("days", days)
            .param("interval", chart_interval(days))
            .param("precision", "full")
    }

    pub fn search(query: &str) -> Self {
        Self::new("/search", CacheTtl::Medium).param("query", query.trim())
    }

    pub fn trending() -> Self {
        Self::new("/search/trending", CacheTtl::Short).param("include_platform", false)
    }

    pub fn markets(ids: &[String], vs_currency: &str, sparkline: bool) -> Self {
        Self::new("/coins/markets", CacheTtl::Short)
            .param("vs_currency", vs_currency)
            .param("ids", ids.join(","))
            .param("order", "market_cap_desc")
            .param("per_page", 100)
            .param("page", 1)
            .param("sparkline", sparkline)
            .param("price_change_percentage", "24h,7d,30d")
            .param("precision", "full")
    }

    pub fn trending_pools(page: Option<u32>, duration: Option<&str>) -> Self {
        Self::new("/onchain/networks/trending_pools", CacheTtl::Medium)
            .maybe_param("page", page)
            .maybe_param("duration", duration)
    }

    pub fn new_pools(page: Option<u32>) -> Self {
        Self::new("/onchain/networks/new_pools", CacheTtl::Medium)
            .maybe_param("page", page)
    }

    pub fn pool_ohlcv(
        network: &str,
        address: &str,
        timeframe: &str,
        query: &PoolOhlcvQuery,
    ) -> Self {
        Self::new(
            format!("/onchain/networks/{network}/pools/{address}/ohlcv/{timeframe}"),
            CacheTtl::Short,
        )
        .maybe_param("aggregate", query.aggregate.as_deref())
        .maybe_param("before_timestamp", query.before_timestamp)
        .maybe_param("limit", query.limit)
        .maybe_param("currency", query.currency.as_deref())
        .maybe_param("token", query.token.as_deref())
    }

    pub fn global() -> Self {
        Self::new("/global", CacheTtl::Long)
    }
}
