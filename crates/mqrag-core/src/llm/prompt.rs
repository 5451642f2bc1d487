//! Answer prompt rendering

use crate::retrieval::RetrievedDocument;

/// Context text used when retrieval found nothing
pub const EMPTY_CONTEXT: &str = "(no relevant documents found)";

/// Typed inputs of the answer prompt
#[derive(Debug, Clone, Copy)]
pub struct AnswerPrompt<'a> {
    pub question: &'a str,
    pub documents: &'a [RetrievedDocument],
    pub label_sources: bool,
}

impl<'a> AnswerPrompt<'a> {
    pub fn new(question: &'a str, documents: &'a [RetrievedDocument]) -> Self {
        Self {
            question,
            documents,
            label_sources: true,
        }
    }

    pub fn label_sources(mut self, label: bool) -> Self {
        self.label_sources = label;
        self
    }

    /// Document texts in merge order, one paragraph each
    pub fn context(&self) -> String {
        if self.documents.is_empty() {
            return EMPTY_CONTEXT.to_string();
        }

        self.documents
            .iter()
            .map(|doc| {
                if self.label_sources {
                    format!("[source: {}]\n{}", doc.id, doc.text.trim())
                } else {
                    doc.text.trim().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn render(&self) -> String {
        format!(
            "Answer the question based only on the following context:\n{}\n\nQuestion: {}\n",
            self.context(),
            self.question.trim()
        )
    }
}
