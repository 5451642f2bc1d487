//! JSON output formatter

use mqrag_core::{PipelineOutput, Retrieval, RetrievedDocument};
use serde_json::json;

pub fn format_answer(output: &PipelineOutput) -> String {
    pretty(&serde_json::to_value(output).unwrap_or_default())
}

pub fn format_queries(queries: &[String]) -> String {
    pretty(&json!(queries))
}

pub fn format_retrieval(retrieval: &Retrieval) -> String {
    let documents: Vec<serde_json::Value> = retrieval.documents.iter().map(document).collect();
    pretty(&json!({
        "queries": retrieval.queries,
        "degraded_expansion": retrieval.degraded_expansion,
        "documents": documents,
    }))
}

fn document(doc: &RetrievedDocument) -> serde_json::Value {
    json!({
        "id": doc.id,
        "score": doc.score,
        "text": doc.text,
        "metadata": doc.metadata,
    })
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string()) + "\n"
}
