//! Question → expansion → multi-query retrieval → answer
//!
//! The pipeline owns no per-request state; every invocation works on its own
//! locals, so one instance can serve concurrent callers.

use crate::config::Config;
use crate::error::{MqRagError, Result, Stage};
use crate::llm::{
    AnswerSynthesizer, ExpandedQueries, HttpAnswerSynthesizer, HttpQueryExpander, LLMClient,
    OpenAIClient, QueryExpander,
};
use crate::retrieval::{MergedDocuments, MultiQueryRetriever, RetrievedDocument, VectaraClient};
use crate::telemetry::{self, NoopCollector, RunCollector, RunRecord, RunType};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;

/// Name of the root run recorded per invocation
pub const PIPELINE_NAME: &str = "multi_query_rag";

/// Everything one invocation produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub question: String,
    /// Queries actually sent to retrieval
    pub queries: Vec<String>,
    /// Expansion output could not be parsed and the question was used instead
    pub degraded_expansion: bool,
    pub documents: Vec<RetrievedDocument>,
    pub answer: String,
}

/// Queries and merged documents, without an answer
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub queries: Vec<String>,
    pub degraded_expansion: bool,
    pub documents: MergedDocuments,
}

/// Multi-query retrieval-augmented answering
pub struct MultiQueryPipeline {
    expander: Arc<dyn QueryExpander>,
    retriever: MultiQueryRetriever,
    synthesizer: Arc<dyn AnswerSynthesizer>,
    collector: Arc<dyn RunCollector>,
    query_count: usize,
    include_original: bool,
}

impl MultiQueryPipeline {
    /// Assemble from parts, with default expansion settings and no run tracing
    pub fn new(
        expander: Arc<dyn QueryExpander>,
        retriever: MultiQueryRetriever,
        synthesizer: Arc<dyn AnswerSynthesizer>,
    ) -> Self {
        Self {
            expander,
            retriever,
            synthesizer,
            collector: Arc::new(NoopCollector),
            query_count: 3,
            include_original: false,
        }
    }

    /// Wire the hosted services described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let llm: Arc<dyn LLMClient> = Arc::new(OpenAIClient::new(config.llm_service.clone())?);
        Self::from_config_with_client(config, llm)
    }

    /// Like [`from_config`](Self::from_config) but sharing an existing LLM client
    pub fn from_config_with_client(config: &Config, llm: Arc<dyn LLMClient>) -> Result<Self> {
        let expander = HttpQueryExpander::new(llm.clone()).strict(config.pipeline.strict_parsing);
        let synthesizer =
            HttpAnswerSynthesizer::new(llm).label_sources(config.pipeline.label_sources);
        let store = Arc::new(VectaraClient::new(&config.vectara)?);
        let retriever = MultiQueryRetriever::from_config(store, &config.pipeline);
        let collector = telemetry::collector_from_config(&config.tracing)?;

        Ok(Self::new(Arc::new(expander), retriever, Arc::new(synthesizer))
            .query_count(config.pipeline.query_count)
            .include_original(config.pipeline.include_original)
            .collector(collector))
    }

    pub fn query_count(mut self, count: usize) -> Self {
        self.query_count = count.max(1);
        self
    }

    pub fn include_original(mut self, include: bool) -> Self {
        self.include_original = include;
        self
    }

    pub fn collector(mut self, collector: Arc<dyn RunCollector>) -> Self {
        self.collector = collector;
        self
    }

    /// Answer a question
    pub async fn invoke(&self, question: &str) -> Result<String> {
        Ok(self.run(question).await?.answer)
    }

    /// Answer a question, keeping the intermediate results
    pub async fn run(&self, question: &str) -> Result<PipelineOutput> {
        let question = validate_question(question)?;
        let root = self.root_run(question);

        let result = self.run_stages(question, &root).await;
        self.finish_root(root, &result, |output| json!({ "answer": output.answer }))
            .await;

        result
    }

    /// Only the expansion stage, with the original question added if configured
    pub async fn expand_only(&self, question: &str) -> Result<Vec<String>> {
        let question = validate_question(question)?;
        let root = self.root_run(question);

        let result = self.expand(question, &root).await.map(|(queries, _)| queries);
        self.finish_root(root, &result, |queries| json!({ "queries": queries }))
            .await;

        result
    }

    /// Expansion and retrieval, without synthesis
    pub async fn retrieve_only(&self, question: &str) -> Result<Retrieval> {
        let question = validate_question(question)?;
        let root = self.root_run(question);

        let result = async {
            let (queries, degraded_expansion) = self.expand(question, &root).await?;
            let documents = self.retrieve(&queries, &root).await?;
            Ok::<_, MqRagError>(Retrieval {
                queries,
                degraded_expansion,
                documents,
            })
        }
        .await;
        self.finish_root(root, &result, |r| json!({ "documents": r.documents.ids() }))
            .await;

        result
    }

    async fn run_stages(&self, question: &str, root: &RunRecord) -> Result<PipelineOutput> {
        let (queries, degraded_expansion) = self.expand(question, root).await?;
        let merged = self.retrieve(&queries, root).await?;
        let documents = merged.into_vec();

        let run = root.child(
            "synthesize_answer",
            RunType::Llm,
            json!({ "question": question, "documents": documents.len() }),
        );
        let answer = self
            .traced(
                run,
                Stage::Synthesis,
                self.synthesizer.synthesize(question, &documents),
                |answer: &String| json!({ "answer": answer }),
            )
            .await?;

        tracing::info!(
            "Answered from {} documents across {} queries",
            documents.len(),
            queries.len()
        );

        Ok(PipelineOutput {
            question: question.to_string(),
            queries,
            degraded_expansion,
            documents,
            answer,
        })
    }

    async fn expand(&self, question: &str, root: &RunRecord) -> Result<(Vec<String>, bool)> {
        tracing::info!("Expanding question into {} queries", self.query_count);

        let run = root.child(
            "expand_queries",
            RunType::Llm,
            json!({ "question": question, "count": self.query_count }),
        );
        let expanded = self
            .traced(
                run,
                Stage::Expansion,
                self.expander.expand(question, self.query_count),
                |e: &ExpandedQueries| json!({ "queries": e.queries, "degraded": e.degraded }),
            )
            .await?;

        let degraded = expanded.degraded;
        Ok((self.retrieval_queries(question, expanded.queries), degraded))
    }

    async fn retrieve(&self, queries: &[String], root: &RunRecord) -> Result<MergedDocuments> {
        let run = root.child("retrieve_documents", RunType::Retriever, json!({ "queries": queries }));
        self.traced(
            run,
            Stage::Retrieval,
            self.retriever.retrieve(queries),
            |merged: &MergedDocuments| json!({ "documents": merged.ids() }),
        )
        .await
    }

    /// Final query list: expansions, plus the question first when configured
    fn retrieval_queries(&self, question: &str, mut queries: Vec<String>) -> Vec<String> {
        if self.include_original && !queries.iter().any(|q| q.trim() == question) {
            queries.insert(0, question.to_string());
        }
        if queries.is_empty() {
            queries.push(question.to_string());
        }
        queries
    }

    async fn finish_root<T, O>(&self, root: RunRecord, result: &Result<T>, outputs: O)
    where
        O: FnOnce(&T) -> serde_json::Value,
    {
        let root = match result {
            Ok(value) => root.succeed(outputs(value)),
            Err(e) => root.fail(e),
        };
        telemetry::submit(self.collector.as_ref(), &root).await;
    }

    fn root_run(&self, question: &str) -> RunRecord {
        let mut root = RunRecord::start(PIPELINE_NAME, RunType::Chain, json!({ "question": question }));
        root.session_name = self.collector.project().map(str::to_string);
        root
    }

    /// Await one stage, attributing errors and recording a child run
    async fn traced<T, F, O>(&self, run: RunRecord, stage: Stage, fut: F, outputs: O) -> Result<T>
    where
        F: Future<Output = Result<T>>,
        O: FnOnce(&T) -> serde_json::Value,
    {
        match fut.await {
            Ok(value) => {
                let run = run.succeed(outputs(&value));
                telemetry::submit(self.collector.as_ref(), &run).await;
                Ok(value)
            }
            Err(e) => {
                let e = e.in_stage(stage);
                tracing::warn!("{}", e);
                let run = run.fail(&e);
                telemetry::submit(self.collector.as_ref(), &run).await;
                Err(e)
            }
        }
    }
}

fn validate_question(question: &str) -> Result<&str> {
    let question = question.trim();
    if question.is_empty() {
        return Err(MqRagError::InvalidInput("question must not be empty".to_string()));
    }
    Ok(question)
}
