use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{QueryOptions, VectorMatch, VectorRecord, VectorStore};
use crate::error::VectorError;

type Index = HashMap<String, VectorRecord>;

/// Cosine-similarity store kept in process memory.
#[derive(Clone, Default)]
pub struct MemoryVectorStore {
    indexes: Arc<RwLock<BTreeMap<String, Index>>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn check_dimension(index_name: &str, index: &Index, got: usize) -> Result<(), VectorError> {
    if got == 0 {
        return Err(VectorError::EmptyVector);
    }
    match index.values().next() {
        Some(existing) if existing.vector.len() != got => Err(VectorError::DimensionMismatch {
            index: index_name.to_string(),
            expected: existing.vector.len(),
            got,
        }),
        _ => Ok(()),
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, index: &str, records: &[VectorRecord]) -> Result<usize, VectorError> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut indexes = self.indexes.write().await;

        let mut staged = indexes.get(index).cloned().unwrap_or_default();
        for record in records {
            check_dimension(index, &staged, record.vector.len())?;
            staged.insert(record.id.clone(), record.clone());
        }
        indexes.insert(index.to_string(), staged);
        Ok(records.len())
    }

    async fn query(
        &self,
        index: &str,
        vector: &[f32],
        options: QueryOptions,
    ) -> Result<Vec<VectorMatch>, VectorError> {
        let indexes = self.indexes.read().await;
        let Some(entries) = indexes.get(index) else {
            return Ok(Vec::new());
        };
        check_dimension(index, entries, vector.len())?;

        let mut matches: Vec<VectorMatch> = entries
            .values()
            .map(|record| VectorMatch {
                id: record.id.clone(),
                score: cosine(vector, &record.vector),
                vector: options.include_vectors.then(|| record.vector.clone()),
                metadata: if options.include_metadata {
                    record.metadata.clone()
                } else {
                    None
                },
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        matches.truncate(options.top_k);
        Ok(matches)
    }

    async fn delete(&self, index: &str, ids: &[String]) -> Result<usize, VectorError> {
        let mut indexes = self.indexes.write().await;
        let Some(entries) = indexes.get_mut(index) else {
            return Ok(0);
        };
        Ok(ids.iter().filter(|id| entries.remove(*id).is_some()).count())
    }

    async fn list_indexes(&self) -> Result<Vec<String>, VectorError> {
        let indexes = self.indexes.read().await;
        Ok(indexes.keys().cloned().collect())
    }

    async fn reset(&self, index: &str) -> Result<(), VectorError> {
        let mut indexes = self.indexes.write().await;
        if let Some(entries) = indexes.get_mut(index) {
            entries.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, vector: &[f32]) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            vector: vector.to_vec(),
            metadata: Some(json!({ "symbol": id.to_uppercase() })),
        }
    }

    async fn seeded() -> MemoryVectorStore {
        let store = MemoryVectorStore::new();
        store
            .upsert(
                "tokens",
                &[
                    record("sol", &[1.0, 0.0]),
                    record("bonk", &[0.0, 1.0]),
                    record("ray", &[0.7, 0.7]),
                ],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_query_orders_by_similarity() {
        let store = seeded().await;
        let options = QueryOptions {
            top_k: 2,
            ..QueryOptions::default()
        };

        let matches = store.query("tokens", &[1.0, 0.1], options).await.unwrap();

        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["sol", "ray"]);
        assert_eq!(matches[0].metadata, Some(json!({"symbol": "SOL"})));
        assert!(matches[0].vector.is_none());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let store = seeded().await;
        let err = store
            .upsert("tokens", &[record("jito", &[1.0, 2.0, 3.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::DimensionMismatch { expected: 2, got: 3, .. }));

        let matches = store
            .query("tokens", &[1.0, 0.0], QueryOptions::default())
            .await
            .unwrap();
        assert_eq!(matches.len(), 3);
    }

    #[tokio::test]
    async fn test_rejected_upsert_does_not_create_index() {
        let store = seeded().await;
        let err = store
            .upsert("news", &[record("a", &[1.0]), record("b", &[])])
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::EmptyVector));
        assert_eq!(store.upsert("news", &[]).await.unwrap(), 0);

        assert_eq!(store.list_indexes().await.unwrap(), vec!["tokens".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_reset_and_list() {
        let store = seeded().await;
        let removed = store
            .delete("tokens", &["sol".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.list_indexes().await.unwrap(), vec!["tokens".to_string()]);

        store.reset("tokens").await.unwrap();
        let matches = store
            .query("tokens", &[1.0, 0.0], QueryOptions::default())
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_zero_vector_has_no_similarity() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine(&[2.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
