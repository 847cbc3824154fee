//! Scoped retriever acquisition.
//!
//! `make_retriever` connects the configured backend and hands back a
//! [`RetrieverHandle`]. The handle releases the connection when it goes
//! out of scope, on every exit path including panics; `close()` exists
//! for callers that want to release eagerly.

use crate::config::{RetrievalConfig, RetrieverProvider};
use crate::elastic::{ElasticSettings, ElasticsearchRetriever};
use crate::pinecone::{PineconeRetriever, PineconeSettings};
use crate::retriever::Retriever;
use anyhow::Result;
use lov_ai_embed::{EmbeddingProvider, make_text_encoder};
use std::sync::Arc;

/// RAII guard around a connected [`Retriever`].
pub struct RetrieverHandle {
    inner: Option<Arc<dyn Retriever>>,
    provider: RetrieverProvider,
}

impl RetrieverHandle {
    fn new(inner: Arc<dyn Retriever>, provider: RetrieverProvider) -> Self {
        Self {
            inner: Some(inner),
            provider,
        }
    }

    /// Which backend this handle is connected to.
    pub fn provider(&self) -> RetrieverProvider {
        self.provider
    }

    /// Release the connection now instead of at end of scope.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.inner.take().is_some() {
            tracing::debug!(provider = %self.provider, "Released retriever");
        }
    }
}

impl std::fmt::Debug for RetrieverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrieverHandle")
            .field("provider", &self.provider)
            .field("connected", &self.inner.is_some())
            .finish()
    }
}

impl std::ops::Deref for RetrieverHandle {
    type Target = dyn Retriever;

    fn deref(&self) -> &Self::Target {
        // Invariant: inner is only None after release, and release
        // consumes or drops the handle.
        self.inner
            .as_deref()
            .expect("retriever used after release")
    }
}

impl Drop for RetrieverHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Connect the retriever named by `config`, reading backend
/// credentials from the environment.
pub fn make_retriever(config: &RetrievalConfig) -> Result<RetrieverHandle> {
    let encoder = make_text_encoder(&config.embedding_model)?;
    make_retriever_with_encoder(config, encoder)
}

/// Connect the retriever named by `config` with a caller-supplied
/// encoder (tests point this at a mock embedding server).
pub fn make_retriever_with_encoder(
    config: &RetrievalConfig,
    encoder: Arc<dyn EmbeddingProvider>,
) -> Result<RetrieverHandle> {
    let provider = config.retriever_provider;
    let retriever: Arc<dyn Retriever> = match provider {
        RetrieverProvider::Pinecone => {
            let settings = PineconeSettings::from_env()?;
            Arc::new(PineconeRetriever::connect(
                settings,
                encoder,
                config.search_kwargs.clone(),
            ))
        }
        RetrieverProvider::Elastic => {
            let settings = ElasticSettings::from_env()?;
            Arc::new(ElasticsearchRetriever::connect(
                settings,
                encoder,
                config.search_kwargs.clone(),
            ))
        }
    };

    tracing::debug!(provider = %provider, "Connected retriever");
    Ok(RetrieverHandle::new(retriever, provider))
}
