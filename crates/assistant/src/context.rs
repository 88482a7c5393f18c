use std::fmt::Write;

use async_trait::async_trait;

use market_data::MarketDataService;

use crate::error::AssistantError;

/// Supplies the market summary the agent backend adds to its system prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn market_context(&self) -> Result<String, AssistantError>;
}

/// Builds context from global stats and the trending list.
#[derive(Clone)]
pub struct MarketContextProvider {
    market: MarketDataService,
}

impl MarketContextProvider {
    pub fn new(market: MarketDataService) -> Self {
        Self { market }
    }
}

fn billions(value: f64) -> String {
    format!("${:.2}B", value / 1e9)
}

#[async_trait]
impl ContextProvider for MarketContextProvider {
    async fn market_context(&self) -> Result<String, AssistantError> {
        let global = self
            .market
            .global()
            .await
            .map_err(|e| AssistantError::Context(e.to_string()))?;
        let trending = self
            .market
            .trending()
            .await
            .map_err(|e| AssistantError::Context(e.to_string()))?;

        let mut out = String::from("Current market conditions:\n");
        if let Some(cap) = global.total_market_cap_usd() {
            let _ = writeln!(
                out,
                "- Total market cap: {} ({:+.2}% 24h)",
                billions(cap),
                global.market_cap_change_percentage_24h_usd
            );
        }
        if let Some(volume) = global.total_volume_usd() {
            let _ = writeln!(out, "- 24h volume: {}", billions(volume));
        }
        let dominance: Vec<String> = global
            .dominance()
            .into_iter()
            .take(3)
            .map(|(sym, pct)| format!("{} {:.1}%", sym.to_uppercase(), pct))
            .collect();
        if !dominance.is_empty() {
            let _ = writeln!(out, "- Dominance: {}", dominance.join(", "));
        }
        if !trending.is_empty() {
            let names: Vec<String> = trending
                .iter()
                .map(|c| format!("{} ({})", c.name, c.symbol.to_uppercase()))
                .collect();
            let _ = writeln!(out, "- Trending: {}", names.join(", "));
        }
        Ok(out)
    }
}
