//! LLM integration
//!
//! Provides traits and implementations for:
//! - Chat completions via OpenAI-compatible services
//! - Query expansion into alternative phrasings
//! - Answer synthesis from retrieved documents

mod client;
mod http_answer_synthesizer;
mod http_query_expander;
mod prompt;
mod traits;

pub use client::{APIMetrics, ChatMessage, LLMClient, MetricsSnapshot, OpenAIClient};
pub use http_answer_synthesizer::HttpAnswerSynthesizer;
pub use http_query_expander::{parse_query_lines, HttpQueryExpander};
pub use prompt::{AnswerPrompt, EMPTY_CONTEXT};
pub use traits::*;
