use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{error, info};
use url::Url;

use common::config::RestStoreConfig;

use super::{QueryOptions, VectorMatch, VectorRecord, VectorStore};
use crate::error::VectorError;
use crate::rest::RestEnvelope;

/// Upstash Vector over REST. Index names map onto namespaces; the empty
/// name is the default namespace.
#[derive(Clone)]
pub struct UpstashVectorStore {
    client: Client,
    base: Url,
    token: String,
    read_only_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_vectors: bool,
}

#[derive(Deserialize)]
struct DeleteResult {
    deleted: usize,
}

impl UpstashVectorStore {
    pub fn new(client: Client, config: &RestStoreConfig) -> Result<Self, VectorError> {
        let mut base = Url::parse(&config.url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client,
            base,
            token: config.token.clone(),
            read_only_token: config.read_only_token.clone(),
        })
    }

    fn endpoint(&self, action: &str, index: &str) -> Result<Url, VectorError> {
        let path = if index.is_empty() {
            action.to_string()
        } else {
            format!("{action}/{index}")
        };
        Ok(self.base.join(&path)?)
    }

    async fn call<B, T>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        read_only: bool,
    ) -> Result<T, VectorError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let token = match (&self.read_only_token, read_only) {
            (Some(ro), true) => ro,
            _ => &self.token,
        };

        let mut request = self.client.request(method, url.clone()).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request.send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        let envelope: RestEnvelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                error!("Vector request to {} failed with {}: {}", url, status, text);
                return Err(VectorError::Store(format!("{status}: {text}")));
            }
            Err(e) => return Err(e.into()),
        };
        let result = envelope.into_result().map_err(VectorError::Store)?;
        Ok(serde_json::from_value(result)?)
    }
}

#[async_trait]
impl VectorStore for UpstashVectorStore {
    async fn upsert(&self, index: &str, records: &[VectorRecord]) -> Result<usize, VectorError> {
        let url = self.endpoint("upsert", index)?;
        let _: Value = self.call(Method::POST, url, Some(records), false).await?;
        info!("Upserted {} vectors to index {:?}", records.len(), index);
        Ok(records.len())
    }

    async fn query(
        &self,
        index: &str,
        vector: &[f32],
        options: QueryOptions,
    ) -> Result<Vec<VectorMatch>, VectorError> {
        let url = self.endpoint("query", index)?;
        let body = QueryBody {
            vector,
            top_k: options.top_k,
            include_metadata: options.include_metadata,
            include_vectors: options.include_vectors,
        };
        self.call(Method::POST, url, Some(&body), true).await
    }

    async fn delete(&self, index: &str, ids: &[String]) -> Result<usize, VectorError> {
        let url = self.endpoint("delete", index)?;
        let result: DeleteResult = self.call(Method::DELETE, url, Some(ids), false).await?;
        info!("Deleted {} vectors from index {:?}", result.deleted, index);
        Ok(result.deleted)
    }

    async fn list_indexes(&self) -> Result<Vec<String>, VectorError> {
        let url = self.base.join("list-namespaces")?;
        self.call::<(), _>(Method::GET, url, None, true).await
    }

    async fn reset(&self, index: &str) -> Result<(), VectorError> {
        let url = self.endpoint("reset", index)?;
        let _: Value = self.call::<(), _>(Method::DELETE, url, None, false).await?;
        info!("Reset index {:?}", index);
        Ok(())
    }
}
