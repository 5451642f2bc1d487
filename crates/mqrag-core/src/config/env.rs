//! Environment variable overlay

use super::Config;
use crate::error::{MqRagError, Result};
use std::str::FromStr;

impl Config {
    /// Overlay values from a variable lookup
    ///
    /// Unset and empty variables leave the current value alone.
    pub fn apply_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("VECTARA_CUSTOMER_ID") {
            self.vectara.customer_id = Some(v);
        }
        if let Some(v) = get("VECTARA_CORPUS_ID") {
            self.vectara.corpus_id = Some(v);
        }
        if let Some(v) = get("VECTARA_API_KEY") {
            self.vectara.api_key = Some(v);
        }
        if let Some(v) = get("VECTARA_URL") {
            self.vectara.url = v;
        }

        if let Some(v) = get("OPENAI_API_KEY") {
            self.llm_service.api_key = Some(v);
        }
        if let Some(v) = get("MQRAG_LLM_URL") {
            self.llm_service.url = v;
        }
        if let Some(v) = get("MQRAG_LLM_MODEL") {
            self.llm_service.model = v;
        }
        if let Some(v) = get("MQRAG_LLM_TEMPERATURE") {
            self.llm_service.temperature = parse_var("MQRAG_LLM_TEMPERATURE", &v)?;
        }

        if let Some(v) = get("MQRAG_QUERY_COUNT") {
            self.pipeline.query_count = parse_var("MQRAG_QUERY_COUNT", &v)?;
        }
        if let Some(v) = get("MQRAG_TOP_K") {
            self.pipeline.top_k = parse_var("MQRAG_TOP_K", &v)?;
        }
        if let Some(v) = get("MQRAG_INCLUDE_ORIGINAL") {
            self.pipeline.include_original = parse_flag("MQRAG_INCLUDE_ORIGINAL", &v)?;
        }
        if let Some(v) = get("MQRAG_FAILURE_POLICY") {
            self.pipeline.failure_policy = v.parse()?;
        }

        if let Some(v) = get("LANGCHAIN_TRACING_V2") {
            self.tracing.enabled = Some(parse_flag("LANGCHAIN_TRACING_V2", &v)?);
        }
        if let Some(v) = get("LANGCHAIN_API_KEY") {
            self.tracing.api_key = Some(v);
        }
        if let Some(v) = get("LANGCHAIN_PROJECT") {
            self.tracing.project = Some(v);
        }
        if let Some(v) = get("LANGCHAIN_ENDPOINT") {
            self.tracing.endpoint = v;
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MqRagError::Config(format!("{} has invalid value '{}'", key, value)))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MqRagError::Config(format!(
            "{} has invalid boolean value '{}'",
            key, value
        ))),
    }
}
