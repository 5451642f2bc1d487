//! Error types for mqrag

use std::fmt;
use thiserror::Error;

/// Result type alias using MqRagError
pub type Result<T> = std::result::Result<T, MqRagError>;

/// Error type alias for convenience
pub type Error = MqRagError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const GENERAL_ERROR: i32 = 1;
    pub const UPSTREAM_ERROR: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Pipeline stage an error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Expansion,
    Retrieval,
    Synthesis,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Expansion => "query expansion",
            Stage::Retrieval => "retrieval",
            Stage::Synthesis => "answer synthesis",
        };
        f.write_str(name)
    }
}

/// Main error type for mqrag
#[derive(Debug, Error)]
pub enum MqRagError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Vector search error: {0}")]
    VectorSearch(String),

    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<MqRagError>,
    },
}

impl MqRagError {
    /// Attribute an error to the pipeline stage it came from
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            // Keep the innermost attribution
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Map a transport error, separating out timeouts
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Http(err)
        }
    }

    /// Stage this error was attributed to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the error originates from a hosted service call
    pub fn is_upstream(&self) -> bool {
        match self {
            Self::Http(_)
            | Self::Timeout(_)
            | Self::Llm(_)
            | Self::VectorSearch(_)
            | Self::ExternalError(_) => true,
            Self::Stage { source, .. } => source.is_upstream(),
            _ => false,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::InvalidInput(_) => exit_codes::INVALID_INPUT,
            Self::Stage { source, .. } => source.exit_code(),
            e if e.is_upstream() => exit_codes::UPSTREAM_ERROR,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wrapping_keeps_innermost() {
        let err = MqRagError::Llm("rate limited".to_string())
            .in_stage(Stage::Expansion)
            .in_stage(Stage::Synthesis);

        assert_eq!(err.stage(), Some(Stage::Expansion));
        assert!(err.is_upstream());
        assert_eq!(
            err.to_string(),
            "query expansion failed: LLM error: rate limited"
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            MqRagError::Config("missing key".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            MqRagError::Timeout("30s".into())
                .in_stage(Stage::Retrieval)
                .exit_code(),
            exit_codes::UPSTREAM_ERROR
        );
        assert_eq!(
            MqRagError::MalformedOutput("empty".into()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
        assert!(!MqRagError::InvalidInput("blank".into()).is_upstream());
    }
}
