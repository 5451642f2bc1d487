//! CLI command handlers

pub mod ask;
pub mod config;
pub mod expand;
pub mod retrieve;

use crate::app::QueryArgs;
use mqrag_core::{Config, MultiQueryPipeline};

/// Apply per-command overrides and fail fast on incomplete configuration
fn prepare_config(mut config: Config, args: &QueryArgs) -> mqrag_core::Result<Config> {
    if let Some(n) = args.queries {
        config.pipeline.query_count = n;
    }
    if let Some(k) = args.top_k {
        config.pipeline.top_k = k;
    }
    if args.include_original {
        config.pipeline.include_original = true;
    }
    config.validate()?;
    Ok(config)
}

fn build_pipeline(config: &Config) -> mqrag_core::Result<MultiQueryPipeline> {
    MultiQueryPipeline::from_config(config)
}
