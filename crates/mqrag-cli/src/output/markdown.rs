//! Markdown output formatter

use super::{preview, FormatOptions};
use mqrag_core::{PipelineOutput, Retrieval, RetrievedDocument};

pub fn format_answer(output: &PipelineOutput, options: &FormatOptions) -> String {
    let mut out = format!("# {}\n\n{}\n\n", output.question, output.answer);

    out.push_str("## Queries\n\n");
    push_queries(&mut out, &output.queries);

    out.push_str("\n## Sources\n\n");
    push_documents(&mut out, &output.documents, options);
    out
}

pub fn format_queries(queries: &[String]) -> String {
    let mut out = String::from("# Queries\n\n");
    push_queries(&mut out, queries);
    out
}

pub fn format_retrieval(retrieval: &Retrieval, options: &FormatOptions) -> String {
    let mut out = String::from("# Retrieval\n\n## Queries\n\n");
    push_queries(&mut out, &retrieval.queries);
    out.push_str("\n## Documents\n\n");
    push_documents(&mut out, retrieval.documents.as_slice(), options);
    out
}

fn push_queries(out: &mut String, queries: &[String]) {
    for (i, q) in queries.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, q));
    }
}

fn push_documents(out: &mut String, documents: &[RetrievedDocument], options: &FormatOptions) {
    if documents.is_empty() {
        out.push_str("*No documents found*\n");
        return;
    }

    for (i, doc) in documents.iter().enumerate() {
        out.push_str(&format!(
            "### {}. `{}` (Score: {:.2})\n\n",
            i + 1,
            doc.id,
            doc.score
        ));
        let lines = if options.full {
            doc.text.lines().map(str::to_string).collect()
        } else {
            preview(&doc.text, 3)
        };
        for line in lines {
            out.push_str(&format!("> {}\n", line));
        }
        out.push_str("\n---\n\n");
    }
}
