mod client;
mod memory;
mod upstash;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

pub use client::CacheClient;
pub use memory::MemoryCacheStore;
pub use upstash::UpstashRedisStore;

use crate::error::CacheError;

/// Remaining lifetime of a cached key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    Missing,
    Persistent,
    Expires(Duration),
}

impl KeyTtl {
    /// Maps a Redis `TTL` reply (-2 missing, -1 no expiry) onto `KeyTtl`.
    pub fn from_redis(secs: i64) -> Self {
        match secs {
            -1 => Self::Persistent,
            s if s < 0 => Self::Missing,
            s => Self::Expires(Duration::from_secs(s as u64)),
        }
    }
}

/// Raw key-value store holding JSON documents with a time to live.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError>;

    /// Returns whether a key was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    async fn ttl(&self, key: &str) -> Result<KeyTtl, CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_ttl_replies() {
        assert_eq!(KeyTtl::from_redis(-2), KeyTtl::Missing);
        assert_eq!(KeyTtl::from_redis(-1), KeyTtl::Persistent);
        assert_eq!(
            KeyTtl::from_redis(120),
            KeyTtl::Expires(Duration::from_secs(120))
        );
    }
}
