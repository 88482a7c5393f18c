pub mod error;
pub mod mock_data;
pub mod remote;
pub mod services;
pub mod traits;

pub use error::MarketDataError;
pub use mock_data::MockDataSource;
pub use remote::{ApiRequest, CoinGeckoClient, MarketDataApi};
pub use services::market_service::MarketDataService;
