//! Retrieve command

use super::{build_pipeline, prepare_config};
use crate::app::{OutputFormat, QueryArgs};
use crate::output::{format_retrieval, FormatOptions};
use anyhow::Result;
use mqrag_core::Config;

pub async fn run(args: QueryArgs, config: Config, format: OutputFormat) -> Result<()> {
    let config = prepare_config(config, &args)?;
    let pipeline = build_pipeline(&config)?;

    let retrieval = pipeline.retrieve_only(&args.question()).await?;

    if retrieval.degraded_expansion {
        eprintln!("Warning: query expansion output was unusable; searched with the question only");
    }

    let options = FormatOptions { full: args.full };
    print!("{}", format_retrieval(&retrieval, format, &options));
    Ok(())
}
