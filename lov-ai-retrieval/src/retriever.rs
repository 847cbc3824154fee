//! The retriever trait: the seam between the graphs and the vector
//! index backends.

use crate::document::Document;
use anyhow::Result;
use async_trait::async_trait;

/// A connection to a vector index that can fetch documents relevant to
/// a query and accept new documents for indexing.
///
/// Implementations own their embedding encoder: callers hand over raw
/// query text and get documents back.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Fetch the documents most relevant to `query`, at most `k` of
    /// them (per the configured search kwargs).
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>>;

    /// Embed and index a batch of documents.
    async fn add_documents(&self, docs: &[Document]) -> Result<()>;

    /// Name of the backing provider ("pinecone", "elastic").
    fn provider_name(&self) -> &str;
}
