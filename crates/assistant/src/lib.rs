pub mod agent;
pub mod analysis;
pub mod anthropic;
pub mod context;
pub mod error;
pub mod message;
pub mod session;

pub use agent::{AgentBackend, ChatBackend, DirectBackend};
pub use analysis::{TradeAction, TradeAnalysis};
pub use anthropic::{AnthropicClient, CompletionModel};
pub use context::{ContextProvider, MarketContextProvider};
pub use error::AssistantError;
pub use message::{ChatMessage, Role};
pub use session::ChatSession;
