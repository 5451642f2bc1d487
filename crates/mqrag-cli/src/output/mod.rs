//! Output formatters

pub mod json;
pub mod markdown;
pub mod terminal;

use crate::app::OutputFormat;
use mqrag_core::{PipelineOutput, Retrieval};

/// Format options
pub struct FormatOptions {
    pub full: bool,
}

/// Format a full pipeline answer
pub fn format_answer(output: &PipelineOutput, format: OutputFormat, options: &FormatOptions) -> String {
    match format {
        OutputFormat::Json => json::format_answer(output),
        OutputFormat::Md => markdown::format_answer(output, options),
        OutputFormat::Cli => terminal::format_answer(output, options),
    }
}

/// Format generated queries
pub fn format_queries(queries: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_queries(queries),
        OutputFormat::Md => markdown::format_queries(queries),
        OutputFormat::Cli => terminal::format_queries(queries),
    }
}

/// Format queries plus the merged documents they retrieved
pub fn format_retrieval(
    retrieval: &Retrieval,
    format: OutputFormat,
    options: &FormatOptions,
) -> String {
    match format {
        OutputFormat::Json => json::format_retrieval(retrieval),
        OutputFormat::Md => markdown::format_retrieval(retrieval, options),
        OutputFormat::Cli => terminal::format_retrieval(retrieval, options),
    }
}

/// First `max` lines of a passage, with an ellipsis line when cut
pub(crate) fn preview(text: &str, max: usize) -> Vec<String> {
    let mut lines: Vec<String> = text.lines().take(max).map(str::to_string).collect();
    if text.lines().count() > max {
        lines.push("...".to_string());
    }
    lines
}
