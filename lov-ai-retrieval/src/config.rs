//! Retrieval configuration: provider selection and search parameters.

use serde::{Deserialize, Serialize};

/// Which vector index backend to retrieve from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrieverProvider {
    Pinecone,
    Elastic,
}

impl std::str::FromStr for RetrieverProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pinecone" => Ok(RetrieverProvider::Pinecone),
            "elastic" | "elasticsearch" => Ok(RetrieverProvider::Elastic),
            other => anyhow::bail!("Unknown retriever provider: {other}"),
        }
    }
}

impl std::fmt::Display for RetrieverProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrieverProvider::Pinecone => write!(f, "pinecone"),
            RetrieverProvider::Elastic => write!(f, "elastic"),
        }
    }
}

/// Additional keyword arguments passed to the vector index search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchKwargs {
    /// Number of documents to retrieve per query
    pub k: usize,
    /// Optional backend-specific metadata filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
}

impl Default for SearchKwargs {
    fn default() -> Self {
        Self { k: 4, filter: None }
    }
}

impl SearchKwargs {
    /// Set the number of documents to fetch (builder style).
    pub fn with_k(self, k: usize) -> Self {
        Self { k, ..self }
    }

    /// Set a metadata filter (builder style).
    pub fn with_filter(self, filter: serde_json::Value) -> Self {
        Self {
            filter: Some(filter),
            ..self
        }
    }
}

/// Everything needed to connect a retriever: backend choice, the
/// embedding model used to encode queries, and search parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// The vector store provider to retrieve from
    pub retriever_provider: RetrieverProvider,
    /// Embedding model spec, e.g. "openai/text-embedding-3-small"
    pub embedding_model: String,
    /// Search parameters forwarded to the backend
    #[serde(default)]
    pub search_kwargs: SearchKwargs,
}

impl RetrievalConfig {
    pub fn new(retriever_provider: RetrieverProvider) -> Self {
        Self {
            retriever_provider,
            embedding_model: "openai/text-embedding-3-small".to_string(),
            search_kwargs: SearchKwargs::default(),
        }
    }

    /// Set the embedding model spec (builder style).
    pub fn with_embedding_model(self, spec: impl Into<String>) -> Self {
        Self {
            embedding_model: spec.into(),
            ..self
        }
    }

    /// Set the search parameters (builder style).
    pub fn with_search_kwargs(self, search_kwargs: SearchKwargs) -> Self {
        Self {
            search_kwargs,
            ..self
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self::new(RetrieverProvider::Pinecone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(
            "pinecone".parse::<RetrieverProvider>().unwrap(),
            RetrieverProvider::Pinecone
        );
        assert_eq!(
            "Elasticsearch".parse::<RetrieverProvider>().unwrap(),
            RetrieverProvider::Elastic
        );
        assert!("chroma".parse::<RetrieverProvider>().is_err());
    }

    #[test]
    fn test_search_kwargs_defaults() {
        let kwargs = SearchKwargs::default();
        assert_eq!(kwargs.k, 4);
        assert!(kwargs.filter.is_none());

        let kwargs = kwargs.with_k(5);
        assert_eq!(kwargs.k, 5);
    }

    #[test]
    fn test_retrieval_config_builder() {
        let config = RetrievalConfig::new(RetrieverProvider::Elastic)
            .with_embedding_model("openai/text-embedding-3-large")
            .with_search_kwargs(SearchKwargs::default().with_k(10));

        assert_eq!(config.retriever_provider, RetrieverProvider::Elastic);
        assert_eq!(config.embedding_model, "openai/text-embedding-3-large");
        assert_eq!(config.search_kwargs.k, 10);
    }
}
