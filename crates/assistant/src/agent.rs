use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::anthropic::CompletionModel;
use crate::context::ContextProvider;
use crate::error::AssistantError;
use crate::message::ChatMessage;

pub const AGENT_PERSONA: &str = "You are the trading assistant of a Solana-focused crypto \
dashboard. Answer concisely, ground claims in the market data you are given, quote prices \
in USD and never promise returns. When asked for a trade idea, state entry, target and \
stop-loss levels together with the main risk.";

/// Produces the assistant's next message for a conversation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn reply(&self, history: &[ChatMessage]) -> Result<String, AssistantError>;
}

/// Plain provider call with the conversation as-is.
#[derive(Clone)]
pub struct DirectBackend {
    model: Arc<dyn CompletionModel>,
}

impl DirectBackend {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ChatBackend for DirectBackend {
    async fn reply(&self, history: &[ChatMessage]) -> Result<String, AssistantError> {
        self.model.complete(None, history).await
    }
}

/// Persona plus live market context in the system prompt. Missing context
/// is logged and the persona is sent alone.
#[derive(Clone)]
pub struct AgentBackend {
    model: Arc<dyn CompletionModel>,
    context: Arc<dyn ContextProvider>,
}

impl AgentBackend {
    pub fn new(model: Arc<dyn CompletionModel>, context: Arc<dyn ContextProvider>) -> Self {
        Self { model, context }
    }

    async fn system_prompt(&self) -> String {
        match self.context.market_context().await {
            Ok(context) => format!("{AGENT_PERSONA}\n\n{context}"),
            Err(e) => {
                warn!("Continuing without market context: {}", e);
                AGENT_PERSONA.to_string()
            }
        }
    }
}

#[async_trait]
impl ChatBackend for AgentBackend {
    async fn reply(&self, history: &[ChatMessage]) -> Result<String, AssistantError> {
        let system = self.system_prompt().await;
        self.model.complete(Some(system), history).await
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;
    use crate::anthropic::MockCompletionModel;
    use crate::context::MockContextProvider;

    #[tokio::test]
    async fn test_direct_backend_sends_no_system_prompt() {
        let mut model = MockCompletionModel::new();
        model
            .expect_complete()
            .with(eq(None), always())
            .times(1)
            .returning(|_, _| Ok("gm".into()));

        let backend = DirectBackend::new(Arc::new(model));
        let reply = backend.reply(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(reply, "gm");
    }

    #[tokio::test]
    async fn test_agent_backend_adds_context() {
        let mut context = MockContextProvider::new();
        context
            .expect_market_context()
            .returning(|| Ok("Trending: Bonk (BONK)".into()));

        let mut model = MockCompletionModel::new();
        model
            .expect_complete()
            .withf(|system, messages| {
                system.as_deref().is_some_and(|s| {
                    s.starts_with(AGENT_PERSONA) && s.ends_with("Trending: Bonk (BONK)")
                }) && messages.len() == 1
            })
            .returning(|_, _| Ok("BONK is trending".into()));

        let backend = AgentBackend::new(Arc::new(model), Arc::new(context));
        let reply = backend.reply(&[ChatMessage::user("what is hot?")]).await.unwrap();
        assert_eq!(reply, "BONK is trending");
    }

    #[tokio::test]
    async fn test_agent_backend_survives_missing_context() {
        let mut context = MockContextProvider::new();
        context
            .expect_market_context()
            .returning(|| Err(AssistantError::Context("rate limited".into())));

        let mut model = MockCompletionModel::new();
        model
            .expect_complete()
            .withf(|system, _| system.as_deref() == Some(AGENT_PERSONA))
            .returning(|_, _| Ok("ok".into()));

        let backend = AgentBackend::new(Arc::new(model), Arc::new(context));
        assert_eq!(backend.reply(&[]).await.unwrap(), "ok");
    }
}
