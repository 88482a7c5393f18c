//! Deterministic cache keys and TTL tiers for market-data responses.

use std::time::Duration;

pub const KEY_PREFIX: &str = "coingecko";

/// Query parameters that change per request without changing the response.
pub const VOLATILE_PARAMS: &[&str] = &["_t", "x_cg_pro_api_key"];

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Freshness tier attached to each endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheTtl {
    /// Live prices, market listings, charts, trending.
    #[default]
    Short,
    /// Search results, coin details, pools.
    Medium,
    /// Global market statistics.
    Long,
    Custom(Duration),
}

impl CacheTtl {
    pub fn duration(self) -> Duration {
        match self {
            Self::Short => DEFAULT_CACHE_TTL,
            Self::Medium => Duration::from_secs(15 * 60),
            Self::Long => Duration::from_secs(60 * 60),
            Self::Custom(ttl) => ttl,
        }
    }
}

/// Builds `coingecko:{endpoint}` followed by the sorted, url-encoded
/// query string. Volatile parameters are dropped so that two requests for
/// the same data map to the same key regardless of parameter order.
pub fn cache_key<K, V>(endpoint: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_ref()))
        .filter(|(k, _)| !VOLATILE_PARAMS.contains(k))
        .collect();
    pairs.sort_unstable();

    let endpoint = endpoint.trim_start_matches('/');
    if pairs.is_empty() {
        return format!("{KEY_PREFIX}:{endpoint}");
    }

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{KEY_PREFIX}:{endpoint}?{query}")
}
