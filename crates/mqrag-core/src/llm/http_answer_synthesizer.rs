//! HTTP-based answer synthesizer using external LLM service

use super::{AnswerPrompt, AnswerSynthesizer, ChatMessage, LLMClient};
use crate::error::{MqRagError, Result};
use crate::retrieval::RetrievedDocument;
use async_trait::async_trait;
use std::sync::Arc;

/// Answer synthesizer using external HTTP LLM service
pub struct HttpAnswerSynthesizer {
    client: Arc<dyn LLMClient>,
    label_sources: bool,
}

impl HttpAnswerSynthesizer {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            label_sources: true,
        }
    }

    pub fn label_sources(mut self, label: bool) -> Self {
        self.label_sources = label;
        self
    }
}

#[async_trait]
impl AnswerSynthesizer for HttpAnswerSynthesizer {
    async fn synthesize(&self, question: &str, documents: &[RetrievedDocument]) -> Result<String> {
        let prompt = AnswerPrompt::new(question, documents)
            .label_sources(self.label_sources)
            .render();

        tracing::debug!(
            "Synthesizing answer from {} documents ({} prompt chars)",
            documents.len(),
            prompt.len()
        );

        let answer = self
            .client
            .chat_completion(vec![ChatMessage::user(prompt)])
            .await?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(MqRagError::Llm("LLM returned an empty answer".to_string()));
        }

        Ok(answer.to_string())
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}
