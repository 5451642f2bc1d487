//! Ask command

use super::prepare_config;
use crate::app::{OutputFormat, QueryArgs};
use crate::output::{format_answer, FormatOptions};
use anyhow::Result;
use mqrag_core::{Config, LLMClient, MultiQueryPipeline, OpenAIClient};
use std::sync::Arc;

pub async fn run(args: QueryArgs, config: Config, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = prepare_config(config, &args)?;

    // Keep a handle on the client for the metrics summary
    let llm = Arc::new(OpenAIClient::new(config.llm_service.clone())?);
    let pipeline = MultiQueryPipeline::from_config_with_client(&config, llm.clone() as Arc<dyn LLMClient>)?;

    let output = pipeline.run(&args.question()).await?;

    let options = FormatOptions { full: args.full };
    print!("{}", format_answer(&output, format, &options));

    if verbose {
        let metrics = llm.metrics();
        eprintln!(
            "LLM calls: {} ({} errors, {:.0}ms avg) via {}",
            metrics.total_requests,
            metrics.total_errors,
            metrics.avg_latency_ms,
            llm.model_name()
        );
    }

    Ok(())
}
