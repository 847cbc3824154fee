//! Document type shared by retrieval backends and the graphs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A retrieved (or to-be-indexed) document.
///
/// `content` is the text the response model sees; `metadata` carries
/// whatever the vector index stored alongside it (source URL, statute
/// name, paragraph number, ...). `score` is set on retrieval results
/// and absent on documents headed for indexing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Stable identifier, used for deduplication across research steps
    pub id: String,
    /// Page content of the document
    pub content: String,
    /// Arbitrary metadata stored with the document
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Similarity score reported by the vector index, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Document {
    /// Create a document with content only.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: HashMap::new(),
            score: None,
        }
    }

    /// Attach a metadata entry (builder style).
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Attach a similarity score (builder style).
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Drop duplicate documents, keeping the first occurrence of each id.
///
/// Research steps often hit the same statute text from different
/// queries; the response prompt should only see it once.
pub fn dedupe_by_id(docs: Vec<Document>) -> Vec<Document> {
    let mut seen = std::collections::HashSet::new();
    docs.into_iter()
        .filter(|doc| seen.insert(doc.id.clone()))
        .collect()
}
