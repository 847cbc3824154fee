//! # lov-ai-embed
//!
//! Text-embedding providers for the lov-ai retrieval pipeline. Model
//! choices are expressed as `provider/model` spec strings (e.g.
//! `"openai/text-embedding-3-small"`) and resolved to a provider
//! implementation behind the [`EmbeddingProvider`] trait.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lov_ai_embed::make_text_encoder;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let encoder = make_text_encoder("openai/text-embedding-3-small")?;
//! let embedding = encoder.embed_text("Hva sier offentlighetsloven?").await?;
//! println!("dimension: {}", embedding.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`config`]: model specs and provider configuration
//! - [`provider`]: the [`EmbeddingProvider`] trait and the OpenAI
//!   implementation
//! - [`error`]: error types and result handling
//!
//! All operations return the crate's [`Result<T>`] built on
//! [`EmbedError`].

pub mod config;
pub mod error;
pub mod provider;

// Re-export main types for easy access
pub use config::{DEFAULT_OPENAI_API_BASE, EmbedConfig, ModelSpec};
pub use error::{EmbedError, Result};
pub use provider::{
    EmbeddingProvider, EmbeddingResult, OPENAI_API_KEY_ENV, OpenAiEmbeddingProvider,
    make_text_encoder, make_text_encoder_with_config, make_text_encoder_with_key,
};
