//! lov-ai-retrieval: document retrieval from remote vector indexes
//!
//! This crate is the seam between the QA graphs and the vector store:
//! a [`Retriever`] trait, backends for Pinecone and Elasticsearch, and
//! a scoped-acquisition factory ([`make_retriever`]) that guarantees
//! the connection is released on every exit path.
//!
//! ## Key Modules
//!
//! - **[`retriever`]**: the `Retriever` trait
//! - **[`pinecone`]** / **[`elastic`]**: HTTP backends
//! - **[`handle`]**: `make_retriever` and the RAII handle
//! - **[`document`]**: the `Document` type and deduplication
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lov_ai_retrieval::{RetrievalConfig, RetrieverProvider, make_retriever};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RetrievalConfig::new(RetrieverProvider::Pinecone);
//! let retriever = make_retriever(&config)?;
//! let docs = retriever.retrieve("offentleglova § 3").await?;
//! // connection released when `retriever` leaves scope
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod elastic;
pub mod handle;
pub mod pinecone;
pub mod retriever;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{RetrievalConfig, RetrieverProvider, SearchKwargs};
pub use document::{Document, dedupe_by_id};
pub use elastic::{ElasticSettings, ElasticsearchRetriever};
pub use handle::{RetrieverHandle, make_retriever, make_retriever_with_encoder};
pub use pinecone::{PineconeRetriever, PineconeSettings};
pub use retriever::Retriever;
