//! Terminal output formatter

use super::{preview, FormatOptions};
use mqrag_core::{PipelineOutput, Retrieval, RetrievedDocument};

pub fn format_answer(output: &PipelineOutput, options: &FormatOptions) -> String {
    let mut out = format!("{}\n", output.answer);

    if options.full {
        out.push_str("\nQueries:\n");
        out.push_str(&format_queries(&output.queries));
        out.push_str("\nSources:\n");
        push_documents(&mut out, &output.documents, options);
    } else if !output.documents.is_empty() {
        let ids: Vec<&str> = output.documents.iter().map(|d| d.id.as_str()).collect();
        out.push_str(&format!("\nSources: {}\n", ids.join(", ")));
    }
    out
}

pub fn format_queries(queries: &[String]) -> String {
    queries.iter().map(|q| format!("{}\n", q)).collect()
}

pub fn format_retrieval(retrieval: &Retrieval, options: &FormatOptions) -> String {
    let mut out = String::new();
    for q in &retrieval.queries {
        out.push_str(&format!("? {}\n", q));
    }
    out.push('\n');
    push_documents(&mut out, retrieval.documents.as_slice(), options);
    out
}

fn push_documents(out: &mut String, documents: &[RetrievedDocument], options: &FormatOptions) {
    for doc in documents {
        let score_pct = (doc.score * 100.0).round() as i64;
        out.push_str(&format!("{:>3}% #{}\n", score_pct, doc.id));

        let lines = if options.full {
            doc.text.lines().map(str::to_string).collect()
        } else {
            preview(&doc.text, 2)
        };
        for line in lines {
            out.push_str(&format!("  {}\n", line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output() -> PipelineOutput {
        PipelineOutput {
            question: "q".to_string(),
            queries: vec!["q1".to_string(), "q2".to_string()],
            degraded_expansion: false,
            documents: vec![
                RetrievedDocument::new("doc-a", "alpha", 0.9),
                RetrievedDocument::new("doc-b", "beta\nline two\nline three", 0.4),
            ],
            answer: "An answer.".to_string(),
        }
    }

    #[test]
    fn test_answer_lists_source_ids() {
        let out = format_answer(&output(), &FormatOptions { full: false });
        assert!(out.starts_with("An answer.\n"));
        assert!(out.contains("Sources: doc-a, doc-b"));
    }

    #[test]
    fn test_full_answer_shows_queries_and_text() {
        let out = format_answer(&output(), &FormatOptions { full: true });
        assert!(out.contains("q2\n"));
        assert!(out.contains(" 90% #doc-a"));
        assert!(out.contains("  line three"));
    }

    #[test]
    fn test_preview_truncates() {
        let mut out = String::new();
        push_documents(&mut out, &output().documents[1..], &FormatOptions { full: false });
        assert!(out.contains("  line two\n  ...\n"));
        assert!(!out.contains("line three"));
    }
}
