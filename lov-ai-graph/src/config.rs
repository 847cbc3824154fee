//! Graph configuration.

use lov_ai_embed::DEFAULT_OPENAI_API_BASE;
use lov_ai_retrieval::{RetrievalConfig, RetrieverProvider, SearchKwargs};
use serde::{Deserialize, Serialize};

/// Configuration for one graph invocation.
///
/// Mirrors the keys callers pass in: which vector store to retrieve
/// from, which embedding model encodes queries, and which chat models
/// route and respond.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// The vector store provider to retrieve documents from
    pub retriever_provider: RetrieverProvider,
    /// Embedding model spec, e.g. "openai/text-embedding-3-small"
    pub embedding_model: String,
    /// Chat model used for routing, planning and query generation
    pub query_model: String,
    /// Chat model used for the final answer
    pub response_model: String,
    /// Search parameters forwarded to the retriever
    #[serde(default)]
    pub search_kwargs: SearchKwargs,
    /// OpenAI-compatible API base for chat and embedding calls
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Explicit API key; when unset, `OPENAI_API_KEY` is read instead
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_api_base() -> String {
    DEFAULT_OPENAI_API_BASE.to_string()
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            retriever_provider: RetrieverProvider::Pinecone,
            embedding_model: "openai/text-embedding-3-small".to_string(),
            query_model: "openai/gpt-4o-mini".to_string(),
            response_model: "openai/gpt-4o-mini".to_string(),
            search_kwargs: SearchKwargs::default(),
            api_base: default_api_base(),
            api_key: None,
        }
    }
}

impl GraphConfig {
    /// Set the retriever provider (builder style).
    pub fn with_retriever_provider(self, retriever_provider: RetrieverProvider) -> Self {
        Self {
            retriever_provider,
            ..self
        }
    }

    /// Set the embedding model spec (builder style).
    pub fn with_embedding_model(self, spec: impl Into<String>) -> Self {
        Self {
            embedding_model: spec.into(),
            ..self
        }
    }

    /// Set the query model spec (builder style).
    pub fn with_query_model(self, spec: impl Into<String>) -> Self {
        Self {
            query_model: spec.into(),
            ..self
        }
    }

    /// Set the response model spec (builder style).
    pub fn with_response_model(self, spec: impl Into<String>) -> Self {
        Self {
            response_model: spec.into(),
            ..self
        }
    }

    /// Set the search kwargs (builder style).
    pub fn with_search_kwargs(self, search_kwargs: SearchKwargs) -> Self {
        Self {
            search_kwargs,
            ..self
        }
    }

    /// Point chat and embedding calls at a different API base
    /// (builder style). Tests use this to target a mock server.
    pub fn with_api_base(self, api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..self
        }
    }

    /// Supply the API key directly instead of via `OPENAI_API_KEY`
    /// (builder style).
    pub fn with_api_key(self, api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..self
        }
    }

    /// The retrieval-layer view of this configuration.
    pub fn retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig::new(self.retriever_provider)
            .with_embedding_model(self.embedding_model.clone())
            .with_search_kwargs(self.search_kwargs.clone())
    }
}
