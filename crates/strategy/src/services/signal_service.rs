use thiserror::Error;
use tracing::{error, info};

use common::models::TokenSignal;
use market_data::remote::{CoinMarket, DEFAULT_VS_CURRENCY};
use market_data::traits::RemoteResponse;
use market_data::{MarketDataError, MarketDataService};

use crate::signals::{confidence_score, price_change_30m, trading_points};
use crate::universe::{classify, signal_universe};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("Failed to load trading signals")]
    Load(#[source] MarketDataError),
}

impl SignalError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Maps one market listing row onto a scored signal.
pub fn derive_signal(row: &CoinMarket) -> TokenSignal {
    let snapshot = row.to_model();
    TokenSignal {
        id: row.id.clone(),
        name: row.name.clone(),
        symbol: row.symbol.to_uppercase(),
        image: row.image.clone(),
        current_price: row.current_price.unwrap_or(0.0),
        market_cap: row.market_cap.unwrap_or(0.0),
        price_change_percentage_30m: price_change_30m(row.sparkline_prices()),
        price_change_percentage_24h: row.price_change_percentage_24h.unwrap_or(0.0),
        last_updated: row.last_updated,
        confidence_score: confidence_score(&snapshot),
        signal_type: classify(&row.id),
        points: trading_points(&snapshot),
    }
}

#[derive(Clone)]
pub struct SignalService {
    market: MarketDataService,
}

impl SignalService {
    pub fn new(market: MarketDataService) -> Self {
        Self { market }
    }

    /// Fetches the signal universe (with sparklines) and scores every row.
    pub async fn refresh(&self) -> Result<Vec<TokenSignal>, SignalError> {
        let ids = signal_universe();
        let rows = self
            .market
            .markets(&ids, DEFAULT_VS_CURRENCY, true)
            .await
            .map_err(|e| {
                error!("Error fetching signals: {}", e);
                SignalError::Load(e)
            })?;

        let signals: Vec<TokenSignal> = rows.iter().map(derive_signal).collect();
        info!("Derived {} trading signals", signals.len());
        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use common::models::SignalType;
    use market_data::{ApiRequest, MarketDataApi};
    use serde_json::Value;
    use storage::CacheClient;

    use super::*;

    struct FailingApi;

    #[async_trait]
    impl MarketDataApi for FailingApi {
        async fn fetch(&self, _request: &ApiRequest) -> Result<Value, MarketDataError> {
            Err(MarketDataError::Timeout)
        }
    }

    #[tokio::test]
    async fn test_refresh_scores_the_universe_from_mock_data() {
        let service = SignalService::new(MarketDataService::mock(CacheClient::in_memory()));
        let signals = service.refresh().await.unwrap();

        assert_eq!(signals.len(), 8);
        let bonk = signals.iter().find(|s| s.id == "bonk").unwrap();
        assert_eq!(bonk.symbol, "BONK");
        assert_eq!(bonk.signal_type, SignalType::Meme);
        assert!(bonk.points.entry_price <= bonk.current_price);
        assert!(bonk.price_change_percentage_30m != 0.0);
        assert!(signals.iter().all(|s| s.confidence_score <= 100));
    }

    #[tokio::test]
    async fn test_refresh_failure_has_user_message() {
        let market = MarketDataService::new(Arc::new(FailingApi), CacheClient::in_memory());
        let err = SignalService::new(market).refresh().await.unwrap_err();

        assert_eq!(err.user_message(), "Failed to load trading signals");
        assert_eq!(err, SignalError::Load(MarketDataError::Timeout));
    }
}
