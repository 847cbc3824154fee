//! Elasticsearch-backed retriever.
//!
//! Retrieval is a kNN search over a dense-vector field; indexing goes
//! through the `_bulk` API. Credentials and endpoint come from the
//! `ELASTICSEARCH_USER` / `ELASTICSEARCH_PASSWORD` / `ELASTICSEARCH_URL`
//! environment variables.

use crate::config::SearchKwargs;
use crate::document::Document;
use crate::retriever::Retriever;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use lov_ai_embed::EmbeddingProvider;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Environment variable holding the Elasticsearch username.
pub const ELASTICSEARCH_USER_ENV: &str = "ELASTICSEARCH_USER";
/// Environment variable holding the Elasticsearch password.
pub const ELASTICSEARCH_PASSWORD_ENV: &str = "ELASTICSEARCH_PASSWORD";
/// Environment variable holding the Elasticsearch base URL.
pub const ELASTICSEARCH_URL_ENV: &str = "ELASTICSEARCH_URL";

/// Index name the documents live in.
pub const DEFAULT_INDEX_NAME: &str = "langchain_index";

/// Connection settings for an Elasticsearch cluster.
#[derive(Debug, Clone)]
pub struct ElasticSettings {
    pub url: String,
    pub user: String,
    pub password: String,
    pub index_name: String,
}

impl ElasticSettings {
    /// Read settings from the environment, failing up front when a
    /// variable is missing rather than on the first query.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(ELASTICSEARCH_URL_ENV)
            .with_context(|| format!("{ELASTICSEARCH_URL_ENV} is not set"))?;
        let user = std::env::var(ELASTICSEARCH_USER_ENV)
            .with_context(|| format!("{ELASTICSEARCH_USER_ENV} is not set"))?;
        let password = std::env::var(ELASTICSEARCH_PASSWORD_ENV)
            .with_context(|| format!("{ELASTICSEARCH_PASSWORD_ENV} is not set"))?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            user,
            password,
            index_name: DEFAULT_INDEX_NAME.to_string(),
        })
    }

    /// Target a different index (builder style).
    pub fn with_index_name(self, index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            ..self
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score", default)]
    score: Option<f32>,
    #[serde(rename = "_source", default)]
    source: Option<HitSource>,
}

#[derive(Debug, Default, Deserialize)]
struct HitSource {
    #[serde(default)]
    text: String,
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
}

/// Retriever over an Elasticsearch index.
pub struct ElasticsearchRetriever {
    settings: ElasticSettings,
    encoder: Arc<dyn EmbeddingProvider>,
    search_kwargs: SearchKwargs,
    client: reqwest::Client,
}

impl ElasticsearchRetriever {
    pub fn connect(
        settings: ElasticSettings,
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

    fn hit_to_document(hit: SearchHit) -> Document {
        let source = hit.source.unwrap_or_default();
        Document {
            id: hit.id,
            content: source.text,
            metadata: source.metadata.into_iter().collect(),
            score: hit.score,
        }
    }
}

#[async_trait]
impl Retriever for ElasticsearchRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>> {
        let vector = self.encoder.embed_text(query).await?;
        let k = self.search_kwargs.k;

        let mut knn = json!({
            "field": "vector",
            "query_vector": vector,
            "k": k,
            "num_candidates": (k * 10).max(50),
        });
        if let Some(filter) = &self.search_kwargs.filter {
            knn["filter"] = filter.clone();
        }

        let url = format!(
            "{}/{}/_search",
            self.settings.url, self.settings.index_name
        );
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.settings.user, Some(&self.settings.password))
            .json(&json!({
                "knn": knn,
                "size": k,
                "_source": ["text", "metadata"],
            }))
            .send()
            .await
            .context("Elasticsearch search request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Elasticsearch search returned {status}: {text}");
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Elasticsearch search response was not valid JSON")?;

        tracing::debug!(
            hits = parsed.hits.hits.len(),
            k,
            index = self.settings.index_name,
            "Elasticsearch kNN search complete"
        );

        Ok(parsed
            .hits
            .hits
            .into_iter()
            .map(Self::hit_to_document)
            .collect())
    }

    async fn add_documents(&self, docs: &[Document]) -> Result<()> {
        if docs.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = docs.iter().map(|d| d.content.clone()).collect();
        let embedded = self.encoder.embed_texts(&texts).await?;

        let mut ndjson = String::new();
        for (doc, vector) in docs.iter().zip(embedded.embeddings) {
            let action = json!({
                "index": {"_index": self.settings.index_name, "_id": doc.id}
            });
            let source = json!({
                "text": doc.content,
                "vector": vector,
                "metadata": doc.metadata,
            });
            ndjson.push_str(&action.to_string());
            ndjson.push('\n');
            ndjson.push_str(&source.to_string());
            ndjson.push('\n');
        }

        let url = format!("{}/_bulk", self.settings.url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.settings.user, Some(&self.settings.password))
            .header("Content-Type", "application/x-ndjson")
            .body(ndjson)
            .send()
            .await
            .context("Elasticsearch bulk request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Elasticsearch bulk returned {status}: {text}");
        }

        let parsed: BulkResponse = response
            .json()
            .await
            .context("Elasticsearch bulk response was not valid JSON")?;
        if parsed.errors {
            bail!("Elasticsearch bulk indexing reported per-item errors");
        }

        tracing::info!(
            count = docs.len(),
            index = self.settings.index_name,
            "Indexed documents into Elasticsearch"
        );
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "elastic"
    }
}
