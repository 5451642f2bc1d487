//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mqrag")]
#[command(
    author,
    version,
    about = "Answer questions from a hosted vector corpus with LLM query expansion"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// YAML config file (defaults to the user config directory)
    #[arg(long, global = true, env = "MQRAG_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer a question using expanded queries
    Ask(QueryArgs),

    /// Show the alternative queries generated for a question
    Expand(QueryArgs),

    /// Show the merged documents retrieved for a question
    Retrieve(QueryArgs),

    /// Print the effective configuration with secrets masked
    Config,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Question to ask
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Number of alternative queries to generate
    #[arg(short = 'n', long = "queries")]
    pub queries: Option<usize>,

    /// Documents per similarity search
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Also search with the question itself
    #[arg(long)]
    pub include_original: bool,

    /// Show full document text
    #[arg(long)]
    pub full: bool,
}

impl QueryArgs {
    pub fn question(&self) -> String {
        self.question.join(" ")
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
    Md,
}
