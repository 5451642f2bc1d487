//! LLM trait definitions

use crate::error::Result;
use crate::retrieval::RetrievedDocument;
use async_trait::async_trait;

/// Query expansion trait
#[async_trait]
pub trait QueryExpander: Send + Sync {
    /// Expand a question into up to `count` alternative phrasings
    async fn expand(&self, question: &str, count: usize) -> Result<ExpandedQueries>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Alternative phrasings produced for one question
///
/// Order follows the LLM output and carries no ranking. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedQueries {
    pub queries: Vec<String>,
    /// Parsing fell back to a single query
    pub degraded: bool,
}

impl ExpandedQueries {
    pub fn new(queries: Vec<String>) -> Self {
        Self {
            queries,
            degraded: false,
        }
    }
}

/// Answer generation trait
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Answer `question` from the merged documents
    async fn synthesize(&self, question: &str, documents: &[RetrievedDocument]) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}
