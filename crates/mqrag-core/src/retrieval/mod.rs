//! Retrieval against a hosted vector corpus
//!
//! Provides:
//! - The `VectorStore` seam and a Vectara query API client
//! - Merging of per-query results, deduplicated by source id
//! - A multi-query retriever issuing one search per expanded query

mod merge;
mod multi_query;
mod vectara;

pub use merge::{merge_results, MergedDocuments};
pub use multi_query::MultiQueryRetriever;
pub use vectara::VectaraClient;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Similarity search over a document corpus
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return at most `top_k` documents most similar to `query`
    async fn similarity_search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>>;

    /// Name of the backing corpus, for logs
    fn name(&self) -> &str;
}

/// A document returned by a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Source identifier; merged results are unique on this
    pub id: String,
    pub text: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl RetrievedDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            score,
            metadata: BTreeMap::new(),
        }
    }
}
