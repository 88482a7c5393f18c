use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::error;
use url::Url;

use common::config::RestStoreConfig;

use super::{CacheStore, KeyTtl};
use crate::error::CacheError;
use crate::rest::RestEnvelope;

/// Redis over the Upstash REST protocol: each command is POSTed as a JSON
/// array and answered with `{"result": ..}` or `{"error": ..}`.
#[derive(Clone)]
pub struct UpstashRedisStore {
    client: Client,
    url: Url,
    token: String,
    read_only_token: Option<String>,
}

impl UpstashRedisStore {
    pub fn new(client: Client, config: &RestStoreConfig) -> Result<Self, CacheError> {
        Ok(Self {
            client,
            url: Url::parse(&config.url)?,
            token: config.token.clone(),
            read_only_token: config.read_only_token.clone(),
        })
    }

    /// Reads go out under the read-only token when one is configured.
    fn token_for(&self, read_only: bool) -> &str {
        match (&self.read_only_token, read_only) {
            (Some(ro), true) => ro,
            _ => &self.token,
        }
    }

    async fn command(&self, args: &[&str], read_only: bool) -> Result<Value, CacheError> {
        let resp = self
            .client
            .post(self.url.clone())
            .bearer_auth(self.token_for(read_only))
            .json(args)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        let envelope: RestEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                error!("Redis {} failed with {}: {}", args[0], status, body);
                return Err(CacheError::Store(format!("{status}: {body}")));
            }
            Err(e) => return Err(e.into()),
        };
        envelope.into_result().map_err(CacheError::Store)
    }

    async fn integer(
        &self,
        args: &[&'static str],
        key: &str,
        read_only: bool,
    ) -> Result<i64, CacheError> {
        let mut full: Vec<&str> = args.to_vec();
        full.push(key);
        let reply = self.command(&full, read_only).await?;
        reply.as_i64().ok_or_else(|| CacheError::UnexpectedReply {
            command: args[0],
            reply: reply.to_string(),
        })
    }
}

/// Values are written as JSON text. Text that does not parse back is
/// returned as a plain string, which keeps keys written by other clients
/// readable.
fn decode_stored(reply: Value) -> Option<Value> {
    match reply {
        Value::Null => None,
        Value::String(raw) => Some(serde_json::from_str(&raw).unwrap_or(Value::String(raw))),
        other => Some(other),
    }
}

/// `SET key payload EX secs`. Redis rejects a zero expiry, so sub-second
/// TTLs round up to one second.
fn set_args(key: &str, value: &Value, ttl: Duration) -> Result<[String; 5], CacheError> {
    Ok([
        "SET".to_string(),
        key.to_string(),
        serde_json::to_string(value)?,
        "EX".to_string(),
        ttl.as_secs().max(1).to_string(),
    ])
}

#[async_trait]
impl CacheStore for UpstashRedisStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let reply = self.command(&["GET", key], true).await?;
        Ok(decode_stored(reply))
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let args = set_args(key, value, ttl)?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.command(&args, false).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.integer(&["DEL"], key, false).await? > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.integer(&["EXISTS"], key, true).await? > 0)
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl, CacheError> {
        Ok(KeyTtl::from_redis(self.integer(&["TTL"], key, true).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stored_json_is_decoded() {
        assert_eq!(
            decode_stored(json!("{\"usd\":1.2}")),
            Some(json!({"usd": 1.2}))
        );
        assert_eq!(decode_stored(json!("[1,2]")), Some(json!([1, 2])));
    }

    #[test]
    fn test_plain_text_survives_decoding() {
        assert_eq!(decode_stored(json!("hello")), Some(json!("hello")));
        assert_eq!(decode_stored(Value::Null), None);
    }

    fn store(read_only_token: Option<&str>) -> UpstashRedisStore {
        let config = RestStoreConfig {
            url: "https://example.upstash.io".into(),
            token: "write-token".into(),
            read_only_token: read_only_token.map(str::to_string),
        };
        UpstashRedisStore::new(Client::new(), &config).unwrap()
    }

    #[test]
    fn test_set_command_carries_json_payload_and_expiry() {
        let ttl = Duration::from_secs(900);
        let args = set_args("coingecko:global", &json!({"usd": 1.5}), ttl).unwrap();
        assert_eq!(args, ["SET", "coingecko:global", r#"{"usd":1.5}"#, "EX", "900"]);

        let args = set_args("k", &json!(1), Duration::from_millis(200)).unwrap();
        assert_eq!(args[4], "1");
    }

    #[test]
    fn test_reads_use_read_only_token_when_configured() {
        let split = store(Some("read-token"));
        assert_eq!(split.token_for(true), "read-token");
        assert_eq!(split.token_for(false), "write-token");

        let single = store(None);
        assert_eq!(single.token_for(true), "write-token");
        assert_eq!(single.token_for(false), "write-token");
    }

    #[test]
    fn test_store_rejects_malformed_url() {
        let config = RestStoreConfig {
            url: "not a url".into(),
            token: "t".into(),
            read_only_token: None,
        };
        assert!(matches!(
            UpstashRedisStore::new(Client::new(), &config),
            Err(CacheError::Url(_))
        ));
    }
}
