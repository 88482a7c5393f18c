use std::sync::Arc;

use serde_json::Value;
use tracing::error;

use crate::agent::ChatBackend;
use crate::analysis::{TradeAnalysis, create_trade_analysis};
use crate::anthropic::CompletionModel;
use crate::message::ChatMessage;

pub const CHAT_FAILED: &str = "Failed to get a response. Please try again.";
pub const SIGNAL_FAILED: &str = "Failed to generate trading signal";

/// Conversation state of the chat panel. The agent and direct backends
/// keep separate histories; the flag picks which one a message goes to.
pub struct ChatSession {
    agent: Arc<dyn ChatBackend>,
    direct: Arc<dyn ChatBackend>,
    analyst: Arc<dyn CompletionModel>,
    use_direct: bool,
    agent_history: Vec<ChatMessage>,
    direct_history: Vec<ChatMessage>,
    error: Option<String>,
}

impl ChatSession {
    pub fn new(
        agent: Arc<dyn ChatBackend>,
        direct: Arc<dyn ChatBackend>,
        analyst: Arc<dyn CompletionModel>,
        use_direct: bool,
    ) -> Self {
        Self {
            agent,
            direct,
            analyst,
            use_direct,
            agent_history: Vec::new(),
            direct_history: Vec::new(),
            error: None,
        }
    }

    pub fn use_direct(&self) -> bool {
        self.use_direct
    }

    pub fn set_use_direct(&mut self, use_direct: bool) {
        self.use_direct = use_direct;
    }

    /// History of the currently selected backend.
    pub fn history(&self) -> &[ChatMessage] {
        if self.use_direct {
            &self.direct_history
        } else {
            &self.agent_history
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Appends the user message, asks the selected backend and appends its
    /// reply. On failure the user message stays and an error is recorded,
    /// so the next send carries the unanswered turn ahead of the new one.
    pub async fn add_user_message(&mut self, text: &str) -> Option<&ChatMessage> {
        self.error = None;
        let (backend, history) = if self.use_direct {
            (&self.direct, &mut self.direct_history)
        } else {
            (&self.agent, &mut self.agent_history)
        };

        history.push(ChatMessage::user(text));
        match backend.reply(history).await {
            Ok(reply) => {
                history.push(ChatMessage::assistant(reply));
                history.last()
            }
            Err(e) => {
                error!("Error in chat: {}", e);
                self.error = Some(CHAT_FAILED.to_string());
                None
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.agent_history.clear();
        self.direct_history.clear();
    }

    pub async fn generate_trade_signal(
        &mut self,
        token: &str,
        current_price: f64,
        market_data: &Value,
    ) -> Option<TradeAnalysis> {
        self.error = None;
        match create_trade_analysis(self.analyst.as_ref(), token, current_price, market_data).await
        {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                error!("Error generating signal: {}", e);
                self.error = Some(SIGNAL_FAILED.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::agent::MockChatBackend;
    use crate::anthropic::MockCompletionModel;
    use crate::error::AssistantError;
    use crate::message::Role;

    fn echo_backend(prefix: &'static str) -> MockChatBackend {
        let mut backend = MockChatBackend::new();
        backend.expect_reply().returning(move |history| {
            let last = history.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(format!("{prefix}: {last} ({} msgs)", history.len()))
        });
        backend
    }

    fn session(use_direct: bool) -> ChatSession {
        ChatSession::new(
            Arc::new(echo_backend("agent")),
            Arc::new(echo_backend("direct")),
            Arc::new(MockCompletionModel::new()),
            use_direct,
        )
    }

    #[tokio::test]
    async fn test_histories_are_kept_per_backend() {
        let mut chat = session(false);

        let reply = chat.add_user_message("gm").await.cloned().unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "agent: gm (1 msgs)");

        chat.set_use_direct(true);
        assert!(chat.history().is_empty());
        let reply = chat.add_user_message("hello").await.cloned().unwrap();
        assert_eq!(reply.content, "direct: hello (1 msgs)");

        chat.set_use_direct(false);
        assert_eq!(chat.history().len(), 2);
        let reply = chat.add_user_message("again").await.cloned().unwrap();
        assert_eq!(reply.content, "agent: again (3 msgs)");
    }

    #[tokio::test]
    async fn test_failed_reply_records_error() {
        let mut failing = MockChatBackend::new();
        failing
            .expect_reply()
            .returning(|_| Err(AssistantError::Timeout));
        let mut chat = ChatSession::new(
            Arc::new(failing),
            Arc::new(echo_backend("direct")),
            Arc::new(MockCompletionModel::new()),
            false,
        );

        assert!(chat.add_user_message("gm").await.is_none());
        assert_eq!(chat.error(), Some(CHAT_FAILED));
        assert_eq!(chat.history(), &[ChatMessage::user("gm")]);

        chat.set_use_direct(true);
        assert!(chat.add_user_message("hi").await.is_some());
        assert_eq!(chat.error(), None);
    }

    #[tokio::test]
    async fn test_unanswered_turn_is_resent_with_the_next_message() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let mut flaky = MockChatBackend::new();
        flaky.expect_reply().returning(move |history| {
            if calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                return Err(AssistantError::Timeout);
            }
            let turns: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
            Ok(turns.join(" | "))
        });
        let mut chat = ChatSession::new(
            Arc::new(flaky),
            Arc::new(echo_backend("direct")),
            Arc::new(MockCompletionModel::new()),
            false,
        );

        assert!(chat.add_user_message("price of sol?").await.is_none());
        let reply = chat.add_user_message("still there?").await.cloned().unwrap();

        assert_eq!(reply.content, "price of sol? | still there?");
        let roles: Vec<Role> = chat.history().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn test_clear_history_empties_both() {
        let mut chat = session(false);
        chat.add_user_message("a").await;
        chat.set_use_direct(true);
        chat.add_user_message("b").await;

        chat.clear_history();
        assert!(chat.history().is_empty());
        chat.set_use_direct(false);
        assert!(chat.history().is_empty());
    }

    #[tokio::test]
    async fn test_trade_signal_failure_records_error() {
        let mut analyst = MockCompletionModel::new();
        analyst
            .expect_complete()
            .returning(|_, _| Ok("I cannot help with that".into()));
        let mut chat = ChatSession::new(
            Arc::new(echo_backend("agent")),
            Arc::new(echo_backend("direct")),
            Arc::new(analyst),
            false,
        );

        let signal = chat.generate_trade_signal("BONK", 0.00002, &json!({})).await;
        assert!(signal.is_none());
        assert_eq!(chat.error(), Some(SIGNAL_FAILED));
    }
}
