use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use common::config::AssistantConfig;

use crate::error::AssistantError;
use crate::message::ChatMessage;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// A single-turn completion over a conversation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(
        &self,
        system: Option<String>,
        messages: &[ChatMessage],
    ) -> Result<String, AssistantError>;
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [ChatMessage],
}

/// Client for the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(config: &AssistantConfig, timeout: Duration) -> Result<Self, AssistantError> {
        if config.api_key.trim().is_empty() {
            return Err(AssistantError::MissingApiKey);
        }
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// First text block of a Messages API response.
pub(crate) fn extract_text(body: &Value) -> Result<&str, AssistantError> {
    body.get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| {
            blocks
                .iter()
                .find(|block| block["type"] == "text")
                .and_then(|block| block["text"].as_str())
        })
        .ok_or(AssistantError::MissingContent)
}

#[async_trait]
impl CompletionModel for AnthropicClient {
    async fn complete(
        &self,
        system: Option<String>,
        messages: &[ChatMessage],
    ) -> Result<String, AssistantError> {
        let payload = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: system.as_deref(),
            messages,
        };
        debug!("Sending {} messages to {}", messages.len(), self.model);

        let resp = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssistantError::Timeout
                } else {
                    AssistantError::Http(e)
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Anthropic request failed with {}: {}", status, body);
            return Err(AssistantError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp.json().await?;
        extract_text(&body).map(str::to_string)
    }
}
