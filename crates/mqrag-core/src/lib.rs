//! mqrag Core Library
//!
//! Multi-query retrieval-augmented answering over a hosted vector corpus.
//!
//! # Features
//! - LLM-driven expansion of one question into several phrasings
//! - One similarity search per phrasing against a Vectara corpus, run concurrently
//! - Merge of per-query results, deduplicated by source id in first-seen order
//! - Answer synthesis from the merged documents and the original question
//! - Optional run tracing to a hosted collector

pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod retrieval;
pub mod telemetry;

pub use config::{
    Config, FailurePolicy, LLMServiceConfig, PipelineConfig, TracingConfig, VectaraConfig,
};
pub use error::{MqRagError, Error, Result, Stage};
pub use llm::{
    AnswerPrompt, AnswerSynthesizer, ChatMessage, ExpandedQueries, HttpAnswerSynthesizer,
    HttpQueryExpander, LLMClient, MetricsSnapshot, OpenAIClient, QueryExpander,
};
pub use pipeline::{MultiQueryPipeline, PipelineOutput, Retrieval};
pub use retrieval::{
    merge_results, MergedDocuments, MultiQueryRetriever, RetrievedDocument, VectaraClient,
    VectorStore,
};
pub use telemetry::{HttpRunCollector, NoopCollector, RunCollector, RunRecord, RunType};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "mqrag";
