//! Error types for the embedding system

/// Result type for embedding operations.
///
/// Convenience alias using [`EmbedError`] as the error type, used
/// throughout the crate for operations that can fail.
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Error type for all embedding operations.
///
/// Covers configuration problems (malformed model specs, missing
/// credentials) as well as runtime failures talking to the embedding
/// API. Integrates with [`thiserror`] for automatic
/// [`std::error::Error`] implementation and error chaining.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// A model spec string was not of the form `provider/model`
    #[error("Invalid model spec '{spec}': expected 'provider/model'")]
    InvalidModelSpec { spec: String },

    /// The provider named in a model spec has no implementation
    #[error("Unsupported embedding provider '{provider}' in spec '{spec}'")]
    UnsupportedProvider { provider: String, spec: String },

    /// A required credential environment variable was not set
    #[error("Missing required environment variable: {var}")]
    MissingEnv { var: String },

    /// The embedding API returned a non-success status
    #[error("Embedding API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The embedding API returned a body we could not interpret
    #[error("Unexpected embedding API response: {message}")]
    UnexpectedResponse { message: String },

    /// HTTP transport failure
    #[error("HTTP request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// Generic errors from other libraries
    #[error("External error: {source}")]
    External {
        #[from]
        source: anyhow::Error,
    },
}

impl EmbedError {
    /// Create an error for a credential env var that is not set.
    pub fn missing_env<S: Into<String>>(var: S) -> Self {
        Self::MissingEnv { var: var.into() }
    }

    /// Create an error for a response body that did not match the
    /// expected shape.
    pub fn unexpected<S: Into<String>>(message: S) -> Self {
        Self::UnexpectedResponse {
            message: message.into(),
        }
    }
}
