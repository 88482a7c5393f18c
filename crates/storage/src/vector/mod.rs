//! Similarity search over named indexes of embedding vectors.

mod memory;
mod upstash;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use memory::MemoryVectorStore;
pub use upstash::UpstashVectorStore;

use crate::error::VectorError;

pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub top_k: usize,
    pub include_metadata: bool,
    pub include_vectors: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            include_metadata: true,
            include_vectors: false,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts or replaces records, returning how many were written.
    async fn upsert(&self, index: &str, records: &[VectorRecord]) -> Result<usize, VectorError>;

    /// Nearest neighbours of `vector`, best match first.
    async fn query(
        &self,
        index: &str,
        vector: &[f32],
        options: QueryOptions,
    ) -> Result<Vec<VectorMatch>, VectorError>;

    /// Returns how many of `ids` were removed.
    async fn delete(&self, index: &str, ids: &[String]) -> Result<usize, VectorError>;

    async fn list_indexes(&self) -> Result<Vec<String>, VectorError>;

    /// Removes every record from `index`.
    async fn reset(&self, index: &str) -> Result<(), VectorError>;
}
