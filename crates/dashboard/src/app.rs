use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use reqwest::Client;
use tracing::{info, warn};

use assistant::{
    AgentBackend, AnthropicClient, ChatSession, CompletionModel, DirectBackend,
    MarketContextProvider,
};
use common::config::AppConfig;
use market_data::MarketDataService;
use storage::{CacheClient, MemoryVectorStore, UpstashRedisStore, UpstashVectorStore, VectorStore};
use strategy::SignalService;

const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared handles every subcommand is built from.
pub struct App {
    pub config: AppConfig,
    pub market: MarketDataService,
    http: Client,
}

impl App {
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.market.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let cache = match &config.cache {
            Some(store) => {
                info!("Using Upstash Redis cache at {}", store.url);
                CacheClient::new(Arc::new(UpstashRedisStore::new(http.clone(), store)?))
            }
            None => {
                warn!("KV_REST_API_URL not set, caching in memory for this process only");
                CacheClient::in_memory()
            }
        };

        let market = MarketDataService::from_config(&config.market, cache)?;

        Ok(Self {
            config,
            market,
            http,
        })
    }

    pub fn signals(&self) -> SignalService {
        SignalService::new(self.market.clone())
    }

    pub fn vector_store(&self) -> anyhow::Result<Arc<dyn VectorStore>> {
        match &self.config.vector {
            Some(store) => Ok(Arc::new(UpstashVectorStore::new(self.http.clone(), store)?)),
            None => {
                warn!("UPSTASH_VECTOR_REST_URL not set, using an in-memory vector store");
                Ok(Arc::new(MemoryVectorStore::new()))
            }
        }
    }

    /// Chat needs an LLM key; there is no offline fallback.
    pub fn chat_session(&self) -> anyhow::Result<ChatSession> {
        let Some(assistant) = &self.config.assistant else {
            bail!("AI chat is unavailable: ANTHROPIC_API_KEY is not set");
        };
        let model: Arc<dyn CompletionModel> =
            Arc::new(AnthropicClient::new(assistant, CHAT_TIMEOUT)?);
        let context = Arc::new(MarketContextProvider::new(self.market.clone()));

        Ok(ChatSession::new(
            Arc::new(AgentBackend::new(model.clone(), context)),
            Arc::new(DirectBackend::new(model.clone())),
            model,
            assistant.use_direct,
        ))
    }
}
