//! Pinecone-backed retriever.
//!
//! Talks straight to the index data plane over HTTP: `/query` for
//! retrieval, `/vectors/upsert` for indexing. The document text rides
//! in the `text` metadata field, matching what the indexing pipeline
//! writes.

use crate::config::SearchKwargs;
use crate::document::Document;
use crate::retriever::Retriever;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use lov_ai_embed::EmbeddingProvider;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Environment variable holding the Pinecone API key.
pub const PINECONE_API_KEY_ENV: &str = "PINECONE_API_KEY";
/// Environment variable holding the index data-plane host URL.
pub const PINECONE_INDEX_HOST_ENV: &str = "PINECONE_INDEX_HOST";

/// Metadata key the document text is stored under.
const TEXT_METADATA_KEY: &str = "text";

/// Upsert batch size; Pinecone caps request payloads, not vector counts.
const UPSERT_BATCH: usize = 100;

/// Connection settings for a Pinecone index.
#[derive(Debug, Clone)]
pub struct PineconeSettings {
    pub api_key: String,
    /// Data-plane host, e.g. `https://my-index-abc123.svc.region.pinecone.io`
    pub index_host: String,
}

impl PineconeSettings {
    /// Read settings from the environment, failing up front when a
    /// variable is missing rather than on the first query.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(PINECONE_API_KEY_ENV)
            .with_context(|| format!("{PINECONE_API_KEY_ENV} is not set"))?;
        let index_host = std::env::var(PINECONE_INDEX_HOST_ENV)
            .with_context(|| format!("{PINECONE_INDEX_HOST_ENV} is not set"))?;
        Ok(Self {
            api_key,
            index_host: index_host.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Retriever over a Pinecone index.
pub struct PineconeRetriever {
    settings: PineconeSettings,
    encoder: Arc<dyn EmbeddingProvider>,
    search_kwargs: SearchKwargs,
    client: reqwest::Client,
}

impl PineconeRetriever {
    pub fn connect(
        settings: PineconeSettings,
        encoder: Arc<dyn EmbeddingProvider>,
        search_kwargs: SearchKwargs,
    ) -> Self {
        Self {
            settings,
            encoder,
            search_kwargs,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.settings.index_host)
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.endpoint(path))
            .header("Api-Key", &self.settings.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Pinecone request to {path} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Pinecone {path} returned {status}: {text}");
        }
        Ok(response)
    }

    fn match_to_document(m: QueryMatch) -> Document {
        let mut metadata = m.metadata.unwrap_or_default();
        let content = metadata
            .remove(TEXT_METADATA_KEY)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        Document {
            id: m.id,
            content,
            metadata: metadata.into_iter().collect(),
            score: m.score,
        }
    }
}

#[async_trait]
impl Retriever for PineconeRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>> {
        let vector = self.encoder.embed_text(query).await?;

        let mut body = json!({
            "vector": vector,
            "topK": self.search_kwargs.k,
            "includeMetadata": true,
        });
        if let Some(filter) = &self.search_kwargs.filter {
            body["filter"] = filter.clone();
        }

        let response = self.post("/query", body).await?;
        let parsed: QueryResponse = response
            .json()
            .await
            .context("Pinecone query response was not valid JSON")?;

        tracing::debug!(
            matches = parsed.matches.len(),
            k = self.search_kwargs.k,
            "Pinecone query complete"
        );

        Ok(parsed
            .matches
            .into_iter()
            .map(Self::match_to_document)
            .collect())
    }

    async fn add_documents(&self, docs: &[Document]) -> Result<()> {
        for batch in docs.chunks(UPSERT_BATCH) {
            let texts: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();
            let embedded = self.encoder.embed_texts(&texts).await?;

            let vectors: Vec<serde_json::Value> = batch
                .iter()
                .zip(embedded.embeddings)
                .map(|(doc, values)| {
                    let mut metadata = serde_json::Map::new();
                    metadata.insert(TEXT_METADATA_KEY.into(), json!(doc.content));
                    for (key, value) in &doc.metadata {
                        metadata.insert(key.clone(), value.clone());
                    }
                    json!({
                        "id": doc.id,
                        "values": values,
                        "metadata": metadata,
                    })
                })
                .collect();

            self.post("/vectors/upsert", json!({ "vectors": vectors }))
                .await?;
            tracing::info!(count = batch.len(), "Upserted batch to Pinecone");
        }
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "pinecone"
    }
}
