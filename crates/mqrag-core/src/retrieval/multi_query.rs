//! One similarity search per expanded query, merged

use super::{merge_results, MergedDocuments, RetrievedDocument, VectorStore};
use crate::config::{FailurePolicy, PipelineConfig};
use crate::error::{MqRagError, Result};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

const DEFAULT_TOP_K: usize = 5;
const DEFAULT_CONCURRENT: usize = 4;

/// Fans queries out to a vector store and merges the results
#[derive(Clone)]
pub struct MultiQueryRetriever {
    store: Arc<dyn VectorStore>,
    top_k: usize,
    max_concurrent: usize,
    failure_policy: FailurePolicy,
}

impl MultiQueryRetriever {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            top_k: DEFAULT_TOP_K,
            max_concurrent: DEFAULT_CONCURRENT,
            failure_policy: FailurePolicy::Abort,
        }
    }

    /// Create with top-k, concurrency and failure policy from pipeline config
    pub fn from_config(store: Arc<dyn VectorStore>, config: &PipelineConfig) -> Self {
        Self::new(store)
            .top_k(config.top_k)
            .max_concurrent(config.max_concurrent_retrievals)
            .failure_policy(config.failure_policy)
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Searches in flight at once; 1 runs them sequentially
    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Search every query and merge, deduplicating by source id
    ///
    /// Results are merged in query order regardless of completion order, so
    /// the merged set is deterministic for a given set of responses. Under
    /// [`FailurePolicy::Abort`] the first failure to arrive ends the search and
    /// drops the requests still in flight.
    pub async fn retrieve(&self, queries: &[String]) -> Result<MergedDocuments> {
        if queries.is_empty() {
            return Ok(MergedDocuments::new());
        }

        tracing::info!(
            "Retrieving top {} for {} queries from {} ({} concurrent)",
            self.top_k,
            queries.len(),
            self.store.name(),
            self.max_concurrent
        );

        // Each search owns its inputs so the stream stays Send
        let top_k = self.top_k;
        let searches = queries.iter().cloned().enumerate().map(|(idx, query)| {
            let store = Arc::clone(&self.store);
            async move {
                let result = store.similarity_search(&query, top_k).await;
                (idx, query, result)
            }
        });
        let mut pending = stream::iter(searches).buffer_unordered(self.max_concurrent);

        let mut results: Vec<(usize, Vec<RetrievedDocument>)> = Vec::with_capacity(queries.len());
        let mut failures: Vec<(usize, MqRagError)> = Vec::new();

        while let Some((idx, query, result)) = pending.next().await {
            match result {
                Ok(docs) => results.push((idx, docs)),
                Err(e) => match self.failure_policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::Skip => {
                        tracing::warn!("Skipping query {:?}: {}", query, e);
                        failures.push((idx, e));
                    }
                },
            }
        }

        if results.is_empty() {
            failures.sort_by_key(|(idx, _)| *idx);
            if let Some((_, e)) = failures.into_iter().next() {
                return Err(e);
            }
        }

        // Restore query order
        results.sort_by_key(|(idx, _)| *idx);

        let merged = merge_results(results.into_iter().map(|(_, docs)| docs));
        tracing::debug!("Merged {} unique documents", merged.len());
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns `doc-<query>` plus a shared doc; fails for queries containing "fail"
    struct EchoStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VectorStore for EchoStore {
        async fn similarity_search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query.contains("fail") {
                return Err(MqRagError::VectorSearch(format!("boom on {}", query)));
            }
            let docs = vec![
                RetrievedDocument::new(format!("doc-{}", query), query, 0.9),
                RetrievedDocument::new("shared", "shared text", 0.5),
            ];
            Ok(docs.into_iter().take(top_k).collect())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn retriever(policy: FailurePolicy) -> (Arc<EchoStore>, MultiQueryRetriever) {
        let store = Arc::new(EchoStore {
            calls: AtomicUsize::new(0),
        });
        let retriever = MultiQueryRetriever::new(store.clone())
            .top_k(2)
            .failure_policy(policy);
        (store, retriever)
    }

    fn queries(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_merges_in_query_order() {
        let (store, retriever) = retriever(FailurePolicy::Abort);
        let merged = retriever.retrieve(&queries(&["a", "b", "c"])).await.unwrap();

        assert_eq!(merged.ids(), vec!["doc-a", "shared", "doc-b", "doc-c"]);
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_abort_policy_fails_whole_retrieval() {
        let (_, retriever) = retriever(FailurePolicy::Abort);
        let err = retriever
            .retrieve(&queries(&["a", "fail-1", "c"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("fail-1"));
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_first_failure() {
        let (store, retriever) = retriever(FailurePolicy::Abort);
        let retriever = retriever.max_concurrent(1);
        let err = retriever
            .retrieve(&queries(&["fail-1", "b", "c", "d"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("fail-1"));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_skip_policy_visits_every_query() {
        let (store, retriever) = retriever(FailurePolicy::Skip);
        let retriever = retriever.max_concurrent(1);
        retriever
            .retrieve(&queries(&["fail-1", "b", "c", "d"]))
            .await
            .unwrap();

        assert_eq!(store.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_retrieve_future_is_send() {
        fn assert_send<T: Send>(_: &T) {}

        let (_, retriever) = retriever(FailurePolicy::Abort);
        let qs = queries(&["a", "b"]);
        assert_send(&retriever.retrieve(&qs));
    }

    #[tokio::test]
    async fn test_skip_policy_keeps_successful_queries() {
        let (_, retriever) = retriever(FailurePolicy::Skip);
        let merged = retriever
            .retrieve(&queries(&["a", "fail-1", "c"]))
            .await
            .unwrap();

        assert_eq!(merged.ids(), vec!["doc-a", "shared", "doc-c"]);
    }

    #[tokio::test]
    async fn test_skip_policy_errors_when_everything_fails() {
        let (_, retriever) = retriever(FailurePolicy::Skip);
        let err = retriever
            .retrieve(&queries(&["fail-1", "fail-2"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("fail-1"));
    }

    #[tokio::test]
    async fn test_no_queries_no_calls() {
        let (store, retriever) = retriever(FailurePolicy::Abort);
        let merged = retriever.retrieve(&[]).await.unwrap();

        assert!(merged.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sequential_matches_concurrent() {
        let (_, concurrent) = retriever(FailurePolicy::Abort);
        let sequential = concurrent.clone().max_concurrent(1);
        let qs = queries(&["x", "y", "x"]);

        let a = concurrent.retrieve(&qs).await.unwrap();
        let b = sequential.retrieve(&qs).await.unwrap();
        assert_eq!(a, b);
    }
}
