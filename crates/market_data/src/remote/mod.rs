pub mod chart_response;
pub mod coin_response;
pub mod coingecko_client;
pub mod endpoints;
pub mod global_response;
pub mod market_response;
pub mod pool_response;
pub mod search_response;

pub use chart_response::{MarketChart, OhlcRow};
pub use coin_response::CoinDetails;
pub use coingecko_client::{CoinGeckoClient, MarketDataApi};
pub use endpoints::{ApiRequest, DEFAULT_VS_CURRENCY, PoolOhlcvQuery};
pub use global_response::GlobalData;
pub use market_response::CoinMarket;
pub use pool_response::Pool;
pub use search_response::{SearchCoin, TrendingCoin};

#[cfg(test)]
pub use coingecko_client::MockMarketDataApi;
