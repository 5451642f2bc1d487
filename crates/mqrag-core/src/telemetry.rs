//! Run tracing to an optional hosted collector
//!
//! Each pipeline invocation is recorded as a root run with one child run per
//! stage. When no collector is configured the records go nowhere.

use crate::config::TracingConfig;
use crate::error::{MqRagError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const COLLECTOR_TIMEOUT_SECS: u64 = 10;

/// Kind of work a run represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunType {
    Chain,
    Llm,
    Retriever,
}

/// One traced unit of work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: Uuid,
    pub name: String,
    pub run_type: RunType,
    pub inputs: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_run_id: Option<Uuid>,
}

impl RunRecord {
    /// Start a run now
    pub fn start(name: impl Into<String>, run_type: RunType, inputs: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            run_type,
            inputs,
            outputs: None,
            error: None,
            start_time: Utc::now(),
            end_time: None,
            session_name: None,
            parent_run_id: None,
        }
    }

    /// Start a run nested under this one
    pub fn child(&self, name: impl Into<String>, run_type: RunType, inputs: serde_json::Value) -> Self {
        let mut run = Self::start(name, run_type, inputs);
        run.parent_run_id = Some(self.id);
        run.session_name = self.session_name.clone();
        run
    }

    pub fn succeed(mut self, outputs: serde_json::Value) -> Self {
        self.outputs = Some(outputs);
        self.end_time = Some(Utc::now());
        self
    }

    pub fn fail(mut self, error: &MqRagError) -> Self {
        self.error = Some(error.to_string());
        self.end_time = Some(Utc::now());
        self
    }
}

/// Destination for finished runs
#[async_trait]
pub trait RunCollector: Send + Sync {
    async fn record(&self, run: &RunRecord) -> Result<()>;

    /// Project runs are filed under, if any
    fn project(&self) -> Option<&str> {
        None
    }
}

/// Collector used when tracing is not configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCollector;

#[async_trait]
impl RunCollector for NoopCollector {
    async fn record(&self, _run: &RunRecord) -> Result<()> {
        Ok(())
    }
}

/// Posts runs to a LangSmith-compatible `/runs` endpoint
pub struct HttpRunCollector {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    project: String,
}

impl HttpRunCollector {
    pub fn new(config: &TracingConfig) -> Result<Self> {
        let (Some(api_key), Some(project)) = (config.api_key.clone(), config.project.clone())
        else {
            return Err(MqRagError::Config(
                "run tracing needs both an API key and a project".to_string(),
            ));
        };

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(COLLECTOR_TIMEOUT_SECS))
            .build()
            .map_err(MqRagError::Http)?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            project,
        })
    }
}

#[async_trait]
impl RunCollector for HttpRunCollector {
    async fn record(&self, run: &RunRecord) -> Result<()> {
        let mut run = run.clone();
        if run.session_name.is_none() {
            run.session_name = Some(self.project.clone());
        }

        let response = self
            .http_client
            .post(format!("{}/runs", self.endpoint))
            .header("x-api-key", &self.api_key)
            .json(&run)
            .send()
            .await
            .map_err(MqRagError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MqRagError::ExternalError(format!(
                "run collector error (HTTP {}): {}",
                status, body
            )));
        }

        Ok(())
    }

    fn project(&self) -> Option<&str> {
        Some(&self.project)
    }
}

/// Pick the collector for a tracing configuration
pub fn collector_from_config(config: &TracingConfig) -> Result<Arc<dyn RunCollector>> {
    if config.is_active() {
        let collector = HttpRunCollector::new(config)?;
        tracing::info!("Run tracing enabled for project {}", collector.project);
        Ok(Arc::new(collector))
    } else {
        Ok(Arc::new(NoopCollector))
    }
}

/// Send a run, logging instead of failing
pub async fn submit(collector: &dyn RunCollector, run: &RunRecord) {
    if let Err(e) = collector.record(run).await {
        tracing::warn!("Failed to record run '{}': {}", run.name, e);
    }
}
