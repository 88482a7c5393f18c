pub mod cache;
pub mod cache_key;
pub mod error;
mod rest;
pub mod vector;

pub use cache::{CacheClient, CacheStore, KeyTtl, MemoryCacheStore, UpstashRedisStore};
pub use cache_key::{CacheTtl, cache_key};
pub use error::{CacheError, VectorError};
pub use vector::{
    MemoryVectorStore, QueryOptions, UpstashVectorStore, VectorMatch, VectorRecord, VectorStore,
};
