//! Test-only helpers.

use async_trait::async_trait;
use lov_ai_embed::{EmbeddingProvider, EmbeddingResult, Result};

/// Encoder returning a fixed-dimension constant vector, so backend
/// tests never touch an embedding API.
pub struct StaticEncoder {
    dimension: usize,
}

impl StaticEncoder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for StaticEncoder {
    async fn embed_text(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.1; self.dimension])
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingResult> {
        Ok(EmbeddingResult::new(
            texts.iter().map(|_| vec![0.1; self.dimension]).collect(),
        ))
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &str {
        "static"
    }
}
