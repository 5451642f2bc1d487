//! Expand command

use super::{build_pipeline, prepare_config};
use crate::app::{OutputFormat, QueryArgs};
use crate::output::format_queries;
use anyhow::Result;
use mqrag_core::Config;

pub async fn run(args: QueryArgs, config: Config, format: OutputFormat) -> Result<()> {
    let config = prepare_config(config, &args)?;
    let pipeline = build_pipeline(&config)?;

    let queries = pipeline.expand_only(&args.question()).await?;

    print!("{}", format_queries(&queries, format));
    Ok(())
}
