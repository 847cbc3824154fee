//! Embedding provider implementations

use crate::config::EmbedConfig;
use crate::error::{EmbedError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Result of embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    /// The generated embeddings, one per input text
    pub embeddings: Vec<Vec<f32>>,
    /// The dimension of each embedding vector
    pub dimension: usize,
}

impl EmbeddingResult {
    /// Create a new embedding result.
    ///
    /// The dimension is inferred from the first embedding vector and
    /// defaults to 0 when the result is empty.
    pub fn new(embeddings: Vec<Vec<f32>>) -> Self {
        let dimension = embeddings.first().map(|e| e.len()).unwrap_or(0);
        Self {
            embeddings,
            dimension,
        }
    }

    /// Returns the number of embedding vectors in this result.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// Returns `true` if this result contains no embedding vectors.
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

/// Trait for embedding providers that can generate embeddings from text
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch processing)
    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingResult>;

    /// Get the dimension of embeddings produced by this provider
    fn embedding_dimension(&self) -> usize;

    /// Get the name/identifier of this provider
    fn provider_name(&self) -> &str;
}

impl std::fmt::Debug for dyn EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field("provider", &self.provider_name())
            .finish()
    }
}

/// Embedding provider backed by an OpenAI-compatible `/embeddings`
/// endpoint.
///
/// The query text never touches local model weights; everything goes
/// through the hosted API named by the configured model spec.
#[derive(Clone)]
pub struct OpenAiEmbeddingProvider {
    config: EmbedConfig,
    client: reqwest::Client,
    api_key: String,
}

impl std::fmt::Debug for OpenAiEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbeddingProvider")
            .field("config", &self.config)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingProvider {
    /// Create a provider reading the API key from `OPENAI_API_KEY`.
    pub fn create(config: EmbedConfig) -> Result<Self> {
        let api_key = std::env::var(OPENAI_API_KEY_ENV)
            .map_err(|_| EmbedError::missing_env(OPENAI_API_KEY_ENV))?;
        Ok(Self::with_api_key(config, api_key))
    }

    /// Create a provider with an explicit API key.
    pub fn with_api_key(config: EmbedConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Send one batch of texts to the `/embeddings` endpoint.
    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.config.api_base);
        let body = json!({
            "model": self.config.model_name(),
            "input": batch,
        });

        tracing::debug!(
            model = self.config.model_name(),
            batch_len = batch.len(),
            "Requesting embeddings"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::unexpected(format!("invalid embeddings body: {e}")))?;

        if parsed.data.len() != batch.len() {
            return Err(EmbedError::unexpected(format!(
                "requested {} embeddings, API returned {}",
                batch.len(),
                parsed.data.len()
            )));
        }

        // The API documents data as ordered, but index is authoritative.
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let texts = vec![text.to_string()];
        let result = self.embed_texts(&texts).await?;
        result
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::unexpected("no embedding generated for text"))
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingResult> {
        if texts.is_empty() {
            return Ok(EmbeddingResult::new(vec![]));
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.config.batch_size) {
            let batch_embeddings = self.embed_batch(chunk).await?;
            all_embeddings.extend(batch_embeddings);
        }

        tracing::debug!("Generated {} embeddings", all_embeddings.len());
        Ok(EmbeddingResult::new(all_embeddings))
    }

    fn embedding_dimension(&self) -> usize {
        self.config.dimension
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

/// Build a text encoder from a `provider/model` spec string.
///
/// Dispatches on the provider half of the spec; unknown providers are
/// rejected with an error naming the spec.
pub fn make_text_encoder(spec: &str) -> Result<Arc<dyn EmbeddingProvider>> {
    let config = EmbedConfig::from_spec(spec)?;
    make_text_encoder_with_config(config)
}

/// Build a text encoder from an already-assembled [`EmbedConfig`].
///
/// Useful when the API base or batch size need overriding, e.g. in
/// tests pointing at a mock server.
pub fn make_text_encoder_with_config(config: EmbedConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.model_spec.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiEmbeddingProvider::create(config)?)),
        other => Err(EmbedError::UnsupportedProvider {
            provider: other.to_string(),
            spec: config.model_spec.to_string(),
        }),
    }
}

/// Like [`make_text_encoder_with_config`], but with the API key
/// supplied directly instead of read from the environment.
///
/// Goes through the same provider dispatch: unknown providers are
/// rejected whether or not a key is in hand.
pub fn make_text_encoder_with_key(
    config: EmbedConfig,
    api_key: &str,
) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.model_spec.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiEmbeddingProvider::with_api_key(
            config, api_key,
        ))),
        other => Err(EmbedError::UnsupportedProvider {
            provider: other.to_string(),
            spec: config.model_spec.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn mock_config(server: &MockServer) -> EmbedConfig {
        EmbedConfig::from_spec("openai/text-embedding-3-small")
            .unwrap()
            .with_api_base(server.url("/v1"))
            .with_dimension(3)
            .with_batch_size(2)
    }

    #[test]
    fn test_embedding_result() {
        let result = EmbeddingResult::new(vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]);
        assert_eq!(result.len(), 2);
        assert_eq!(result.dimension, 3);
        assert!(!result.is_empty());

        let empty = EmbeddingResult::new(vec![]);
        assert_eq!(empty.dimension, 0);
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_skips_api() {
        // No mock server at all: an empty slice must not make a request.
        let config = EmbedConfig::from_spec("openai/text-embedding-3-small")
            .unwrap()
            .with_api_base("http://127.0.0.1:1/v1");
        let provider = OpenAiEmbeddingProvider::with_api_key(config, "test-key");

        let result = provider.embed_texts(&[]).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_embed_texts_batches_and_preserves_order() {
        let server = MockServer::start();

        let first = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/embeddings")
                .header("authorization", "Bearer test-key")
                .json_body_partial(r#"{"input": ["a", "b"]}"#);
            then.status(200).json_body(serde_json::json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0, 0.0]},
                    {"index": 0, "embedding": [1.0, 0.0, 0.0]}
                ]
            }));
        });
        let second = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/embeddings")
                .json_body_partial(r#"{"input": ["c"]}"#);
            then.status(200).json_body(serde_json::json!({
                "data": [{"index": 0, "embedding": [0.0, 0.0, 1.0]}]
            }));
        });

        let provider = OpenAiEmbeddingProvider::with_api_key(mock_config(&server), "test-key");
        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let result = provider.embed_texts(&texts).await.unwrap();

        first.assert();
        second.assert();
        assert_eq!(result.len(), 3);
        // Out-of-order indices in the first batch must be re-sorted.
        assert_eq!(result.embeddings[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(result.embeddings[1], vec![0.0, 1.0, 0.0]);
        assert_eq!(result.embeddings[2], vec![0.0, 0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_api_error_surfaces_status_and_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(401).body("invalid api key");
        });

        let provider = OpenAiEmbeddingProvider::with_api_key(mock_config(&server), "bad-key");
        let err = provider.embed_text("hei").await.unwrap_err();

        match err {
            EmbedError::Api { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("invalid api key"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_count_mismatch_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(200).json_body(serde_json::json!({"data": []}));
        });

        let provider = OpenAiEmbeddingProvider::with_api_key(mock_config(&server), "test-key");
        let err = provider.embed_text("hei").await.unwrap_err();
        assert!(matches!(err, EmbedError::UnexpectedResponse { .. }));
    }

    #[test]
    fn test_make_text_encoder_rejects_unknown_provider() {
        let err = make_text_encoder("huggingface/some-model").unwrap_err();
        match err {
            EmbedError::UnsupportedProvider { provider, spec } => {
                assert_eq!(provider, "huggingface");
                assert_eq!(spec, "huggingface/some-model");
            }
            other => panic!("expected UnsupportedProvider, got {other:?}"),
        }
    }

    #[test]
    fn test_make_text_encoder_with_key_rejects_unknown_provider() {
        // Having an API key must not sidestep the provider dispatch.
        let config = EmbedConfig::from_spec("huggingface/some-model").unwrap();
        let err = make_text_encoder_with_key(config, "test-key").unwrap_err();
        assert!(matches!(err, EmbedError::UnsupportedProvider { .. }));
    }
}
