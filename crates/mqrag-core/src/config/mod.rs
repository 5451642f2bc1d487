//! Configuration management
//!
//! Configuration is resolved once at process start (defaults, then an optional
//! YAML file, then environment variables) and passed explicitly to every
//! component afterwards.

mod env;


use crate::error::{MqRagError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder shown instead of secrets
const REDACTED: &str = "********";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Hosted vector search corpus
    #[serde(default)]
    pub vectara: VectaraConfig,

    /// LLM service used for expansion and synthesis
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Optional run tracing collector
    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Vectara corpus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectaraConfig {
    /// Customer (tenant) identifier
    #[serde(default)]
    pub customer_id: Option<String>,

    /// Corpus identifier
    #[serde(default)]
    pub corpus_id: Option<String>,

    /// API key with query permission on the corpus
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the query API
    #[serde(default = "default_vectara_url")]
    pub url: String,

    /// Hybrid search lambda (0 = pure neural, 1 = pure lexical)
    #[serde(default = "default_lexical_interpolation")]
    pub lexical_interpolation: f32,

    /// Request timeout in seconds
    #[serde(default = "default_vectara_timeout")]
    pub timeout_secs: u64,
}

impl Default for VectaraConfig {
    fn default() -> Self {
        Self {
            customer_id: None,
            corpus_id: None,
            api_key: None,
            url: default_vectara_url(),
            lexical_interpolation: default_lexical_interpolation(),
            timeout_secs: default_vectara_timeout(),
        }
    }
}

fn default_vectara_url() -> String {
    "https://api.vectara.io".to_string()
}

fn default_lexical_interpolation() -> f32 {
    0.025
}

fn default_vectara_timeout() -> u64 {
    30
}

/// LLM service configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service
    #[serde(default = "default_llm_url")]
    pub url: String,

    /// Model name for chat completions
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Completion token limit (service default when unset)
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            model: default_chat_model(),
            api_key: None,
            temperature: 0.0,
            max_tokens: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

/// What to do when one of several per-query retrievals fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail the whole retrieval on the first error
    #[default]
    Abort,
    /// Drop failed queries and merge what succeeded
    Skip,
}

impl std::str::FromStr for FailurePolicy {
    type Err = MqRagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(MqRagError::Config(format!(
                "unknown failure policy '{}' (expected 'abort' or 'skip')",
                other
            ))),
        }
    }
}

/// Pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of alternative queries requested from the LLM
    #[serde(default = "default_query_count")]
    pub query_count: usize,

    /// Documents requested per similarity search
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Also retrieve with the original question
    #[serde(default)]
    pub include_original: bool,

    /// Retrieval calls in flight at once (1 = sequential)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_retrievals: usize,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Fail instead of degrading when expansion output has no usable lines
    #[serde(default)]
    pub strict_parsing: bool,

    /// Prefix each document in the answer prompt with its source id
    #[serde(default = "default_true")]
    pub label_sources: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            query_count: default_query_count(),
            top_k: default_top_k(),
            include_original: false,
            max_concurrent_retrievals: default_max_concurrent(),
            failure_policy: FailurePolicy::default(),
            strict_parsing: false,
            label_sources: true,
        }
    }
}

fn default_query_count() -> usize {
    3
}

fn default_top_k() -> usize {
    5
}

fn default_max_concurrent() -> usize {
    4
}

fn default_true() -> bool {
    true
}

/// Run tracing collector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    /// Explicit on/off switch; `None` means "on if credentials are present"
    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Project (session) runs are filed under
    #[serde(default)]
    pub project: Option<String>,

    #[serde(default = "default_tracing_endpoint")]
    pub endpoint: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            api_key: None,
            project: None,
            endpoint: default_tracing_endpoint(),
        }
    }
}

fn default_tracing_endpoint() -> String {
    "https://api.smith.langchain.com".to_string()
}

impl TracingConfig {
    /// Tracing runs only when not switched off and both key and project are set
    pub fn is_active(&self) -> bool {
        self.enabled != Some(false) && self.api_key.is_some() && self.project.is_some()
    }
}

impl Config {
    /// Resolve configuration for process start
    ///
    /// Reads `path` (or the default config file when it exists) and overlays
    /// the process environment. Callers run [`validate`](Self::validate) once
    /// any command-line overrides are applied.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_lookup(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a YAML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Check that everything needed to run the pipeline is present
    ///
    /// All problems are reported together in a single `Config` error.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        match self.vectara.customer_id.as_deref() {
            None => problems.push("missing Vectara customer id (VECTARA_CUSTOMER_ID)".to_string()),
            Some(id) if id.trim().parse::<u64>().is_err() => {
                problems.push(format!("Vectara customer id '{}' is not numeric", id))
            }
            _ => {}
        }
        match self.vectara.corpus_id.as_deref() {
            None => problems.push("missing Vectara corpus id (VECTARA_CORPUS_ID)".to_string()),
            Some(id) if id.trim().parse::<u64>().is_err() => {
                problems.push(format!("Vectara corpus id '{}' is not numeric", id))
            }
            _ => {}
        }
        if self.vectara.api_key.is_none() {
            problems.push("missing Vectara API key (VECTARA_API_KEY)".to_string());
        }
        if self.llm_service.api_key.is_none() {
            problems.push("missing LLM API key (OPENAI_API_KEY)".to_string());
        }
        if self.pipeline.query_count == 0 {
            problems.push("query_count must be at least 1".to_string());
        }
        if self.pipeline.top_k == 0 {
            problems.push("top_k must be at least 1".to_string());
        }
        if self.pipeline.max_concurrent_retrievals == 0 {
            problems.push("max_concurrent_retrievals must be at least 1".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(MqRagError::Config(problems.join("; ")))
        }
    }

    /// Copy with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mask = |s: &Option<String>| s.as_ref().map(|_| REDACTED.to_string());
        let mut copy = self.clone();
        copy.vectara.api_key = mask(&self.vectara.api_key);
        copy.llm_service.api_key = mask(&self.llm_service.api_key);
        copy.tracing.api_key = mask(&self.tracing.api_key);
        copy
    }
}
