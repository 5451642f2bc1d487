//! HTTP-based query expander using external LLM service

use super::{ChatMessage, ExpandedQueries, LLMClient, QueryExpander};
use crate::error::{MqRagError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Query expander using external HTTP LLM service
pub struct HttpQueryExpander {
    client: Arc<dyn LLMClient>,
    strict: bool,
}

impl HttpQueryExpander {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            strict: false,
        }
    }

    /// Return `MalformedOutput` instead of degrading when no query lines are found
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[async_trait]
impl QueryExpander for HttpQueryExpander {
    async fn expand(&self, question: &str, count: usize) -> Result<ExpandedQueries> {
        let messages = vec![ChatMessage::user(build_expansion_prompt(question, count))];

        let response = self.client.chat_completion(messages).await?;

        let queries = parse_query_lines(&response, count);
        if !queries.is_empty() {
            tracing::debug!("Expanded into {} queries: {:?}", queries.len(), queries);
            return Ok(ExpandedQueries::new(queries));
        }

        if self.strict {
            return Err(MqRagError::MalformedOutput(format!(
                "query expansion returned no usable lines: {:?}",
                response
            )));
        }

        tracing::warn!("Unparseable expansion output, falling back to the original question");
        tracing::debug!("Raw LLM response: {:?}", response);

        Ok(ExpandedQueries {
            queries: vec![question.trim().to_string()],
            degraded: true,
        })
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

fn build_expansion_prompt(question: &str, count: usize) -> String {
    format!(
        "You are an AI language model assistant. Your task is to generate {count} \
         different versions of the given user question to retrieve relevant documents \
         from a vector database. By generating multiple perspectives on the user \
         question, your goal is to help the user overcome some of the limitations of \
         distance-based similarity search. Provide these alternative questions \
         separated by newlines.\nOriginal question: {question}"
    )
}

/// Split LLM output into queries, one per non-blank line, at most `max`
pub fn parse_query_lines(response: &str, max: usize) -> Vec<String> {
    response
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .take(max)
        .map(|line| line.to_string())
        .collect()
}

/// Remove "1.", "2)", "-" or "*" list prefixes
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix(['-', '*', '•']) {
        return rest.trim_start();
    }

    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(after) = rest.strip_prefix(['.', ')']) {
            if after.is_empty() || after.starts_with(char::is_whitespace) {
                return after.trim_start();
            }
        }
    }

    line
}
