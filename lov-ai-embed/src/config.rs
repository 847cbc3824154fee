//! Configuration for embedding models

use crate::error::{EmbedError, Result};
use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible API base.
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// A `provider/model` pair parsed from a model spec string such as
/// `"openai/text-embedding-3-small"`.
///
/// The provider half selects the implementation; the model half is
/// passed through to the provider's API verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Provider identifier (e.g. "openai")
    pub provider: String,
    /// Model name understood by that provider
    pub model: String,
}

impl ModelSpec {
    /// Parse a `provider/model` string.
    ///
    /// Only the first `/` separates provider from model, so model names
    /// containing slashes survive intact.
    pub fn parse(spec: &str) -> Result<Self> {
        match spec.split_once('/') {
            Some((provider, model)) if !provider.is_empty() && !model.is_empty() => Ok(Self {
                provider: provider.to_string(),
                model: model.to_string(),
            }),
            _ => Err(EmbedError::InvalidModelSpec {
                spec: spec.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Configuration for embedding providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Which provider and model to use
    pub model_spec: ModelSpec,
    /// Base URL of the embedding API
    pub api_base: String,
    /// Maximum number of texts sent per API request
    pub batch_size: usize,
    /// Expected embedding dimension, used to validate responses
    pub dimension: usize,
}

impl EmbedConfig {
    /// Create a configuration from a `provider/model` spec string with
    /// provider defaults for everything else.
    pub fn from_spec(spec: &str) -> Result<Self> {
        let model_spec = ModelSpec::parse(spec)?;
        let dimension = default_dimension(&model_spec.model);
        Ok(Self {
            model_spec,
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            batch_size: 32,
            dimension,
        })
    }

    /// Set the API base URL (builder style)
    pub fn with_api_base<S: Into<String>>(self, api_base: S) -> Self {
        Self {
            api_base: api_base.into(),
            ..self
        }
    }

    /// Set the batch size for embedding generation (builder style)
    pub fn with_batch_size(self, batch_size: usize) -> Self {
        Self { batch_size, ..self }
    }

    /// Set the expected embedding dimension (builder style)
    pub fn with_dimension(self, dimension: usize) -> Self {
        Self { dimension, ..self }
    }

    /// Get the model name to send to the provider API
    pub fn model_name(&self) -> &str {
        &self.model_spec.model
    }
}

/// Known dimensions for common embedding models.
fn default_dimension(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        // text-embedding-3-small and text-embedding-ada-002
        _ => 1536,
    }
}
