//! Vectara query API client

use super::{RetrievedDocument, VectorStore};
use crate::config::VectaraConfig;
use crate::error::{MqRagError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Similarity search against one Vectara corpus
pub struct VectaraClient {
    http_client: reqwest::Client,
    url: String,
    api_key: String,
    customer_id: u64,
    corpus_id: u64,
    lambda: f32,
    name: String,
}

impl VectaraClient {
    /// Create from configuration; credentials must be present and ids numeric
    pub fn new(config: &VectaraConfig) -> Result<Self> {
        let customer_id = parse_id("customer id", config.customer_id.as_deref())?;
        let corpus_id = parse_id("corpus id", config.corpus_id.as_deref())?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| MqRagError::Config("missing Vectara API key".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(MqRagError::Http)?;

        Ok(Self {
            http_client,
            url: config.url.trim_end_matches('/').to_string(),
            api_key,
            customer_id,
            corpus_id,
            lambda: config.lexical_interpolation,
            name: format!("vectara:{}/{}", customer_id, corpus_id),
        })
    }

    fn build_request(&self, query: &str, top_k: usize) -> QueryBatch {
        QueryBatch {
            query: vec![QueryRequest {
                query: query.to_string(),
                start: 0,
                num_results: top_k,
                corpus_key: vec![CorpusKey {
                    customer_id: self.customer_id,
                    corpus_id: self.corpus_id,
                    lexical_interpolation_config: LexicalInterpolation {
                        lambda: self.lambda,
                    },
                }],
            }],
        }
    }
}

fn parse_id(what: &str, value: Option<&str>) -> Result<u64> {
    let value =
        value.ok_or_else(|| MqRagError::Config(format!("missing Vectara {}", what)))?;
    value
        .trim()
        .parse()
        .map_err(|_| MqRagError::Config(format!("Vectara {} '{}' is not numeric", what, value)))
}

#[derive(Debug, Serialize)]
struct QueryBatch {
    query: Vec<QueryRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    query: String,
    start: usize,
    num_results: usize,
    corpus_key: Vec<CorpusKey>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CorpusKey {
    customer_id: u64,
    corpus_id: u64,
    lexical_interpolation_config: LexicalInterpolation,
}

#[derive(Debug, Serialize)]
struct LexicalInterpolation {
    lambda: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    response_set: Vec<ResponseSet>,
    #[serde(default)]
    status: Vec<Status>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseSet {
    #[serde(default)]
    response: Vec<Passage>,
    #[serde(default)]
    document: Vec<SourceDocument>,
    #[serde(default)]
    status: Vec<Status>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Passage {
    #[serde(default)]
    text: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    metadata: Vec<MetadataEntry>,
    #[serde(default)]
    document_index: Option<usize>,
    #[serde(default)]
    result_offset: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SourceDocument {
    id: String,
    #[serde(default)]
    metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Deserialize)]
struct MetadataEntry {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    #[serde(default)]
    code: String,
    #[serde(default)]
    status_detail: String,
}

impl Status {
    fn is_ok(&self) -> bool {
        self.code.is_empty() || self.code == "OK"
    }
}

/// Metadata key holding the parent document id of a passage
const DOCUMENT_ID_KEY: &str = "document_id";

/// Source id for one passage
///
/// Stable across queries: the same passage gets the same id in every
/// response, and distinct passages of one document get distinct ids.
fn passage_id(parent: Option<&str>, passage: &Passage) -> String {
    match (parent, passage.result_offset) {
        (Some(doc), Some(offset)) => format!("{}#{}", doc, offset),
        (Some(doc), None) => format!("{}#{}", doc, text_key(&passage.text)),
        (None, _) => format!("passage-{}", text_key(&passage.text)),
    }
}

fn text_key(text: &str) -> String {
    let hash = blake3::hash(text.as_bytes()).to_hex();
    hash.as_str()[..16].to_string()
}

/// Turn the first response set into passages, resolving source ids
fn into_documents(response: QueryResponse) -> Result<Vec<RetrievedDocument>> {
    if let Some(bad) = response.status.iter().find(|s| !s.is_ok()) {
        return Err(MqRagError::VectorSearch(format!(
            "{}: {}",
            bad.code, bad.status_detail
        )));
    }

    let Some(set) = response.response_set.into_iter().next() else {
        return Ok(Vec::new());
    };

    if let Some(bad) = set.status.iter().find(|s| !s.is_ok()) {
        return Err(MqRagError::VectorSearch(format!(
            "{}: {}",
            bad.code, bad.status_detail
        )));
    }

    let documents = set
        .response
        .into_iter()
        .map(|passage| {
            let source = passage.document_index.and_then(|i| set.document.get(i));
            let id = passage_id(source.map(|doc| doc.id.as_str()), &passage);

            let mut metadata = BTreeMap::new();
            if let Some(doc) = source {
                for entry in &doc.metadata {
                    metadata.insert(entry.name.clone(), entry.value.clone());
                }
            }
            // Passage-level values override document-level ones
            for entry in passage.metadata {
                metadata.insert(entry.name, entry.value);
            }
            if let Some(doc) = source {
                metadata.insert(DOCUMENT_ID_KEY.to_string(), doc.id.clone());
            }

            RetrievedDocument {
                id,
                text: passage.text,
                score: passage.score,
                metadata,
            }
        })
        .collect();

    Ok(documents)
}

#[async_trait]
impl VectorStore for VectaraClient {
    async fn similarity_search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>> {
        let url = format!("{}/v1/query", self.url);
        let request = self.build_request(query, top_k);

        tracing::debug!("Vectara query (top {}): {:?}", top_k, query);

        let response = self
            .http_client
            .post(&url)
            .header("customer-id", self.customer_id.to_string())
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(MqRagError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MqRagError::VectorSearch(format!(
                "Vectara error (HTTP {}): {}",
                status, body
            )));
        }

        let body: QueryResponse = response.json().await.map_err(MqRagError::from_transport)?;
        let documents = into_documents(body)?;

        tracing::debug!("Vectara returned {} passages", documents.len());
        Ok(documents)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::merge_results;

    fn config() -> VectaraConfig {
        VectaraConfig {
            customer_id: Some("1234".into()),
            corpus_id: Some("5".into()),
            api_key: Some("zqt_key".into()),
            ..VectaraConfig::default()
        }
    }

    #[test]
    fn test_request_body_shape() {
        let client = VectaraClient::new(&config()).unwrap();
        let json = serde_json::to_value(client.build_request("capital of France", 4)).unwrap();

        let q = &json["query"][0];
        assert_eq!(q["query"], "capital of France");
        assert_eq!(q["start"], 0);
        assert_eq!(q["numResults"], 4);
        assert_eq!(q["corpusKey"][0]["customerId"], 1234);
        assert_eq!(q["corpusKey"][0]["corpusId"], 5);
        assert!(q["corpusKey"][0]["lexicalInterpolationConfig"]["lambda"].is_number());
    }

    #[test]
    fn test_new_rejects_bad_ids() {
        let mut cfg = config();
        cfg.corpus_id = Some("corpus-five".into());
        assert!(matches!(VectaraClient::new(&cfg), Err(MqRagError::Config(_))));

        cfg.corpus_id = None;
        assert!(matches!(VectaraClient::new(&cfg), Err(MqRagError::Config(_))));
    }

    #[test]
    fn test_response_maps_source_ids_and_metadata() {
        let body = serde_json::json!({
            "responseSet": [{
                "response": [
                    {"text": "Paris is the capital of France.", "score": 0.91,
                     "metadata": [{"name": "lang", "value": "en"}], "documentIndex": 1,
                     "resultOffset": 0, "resultLength": 31},
                    {"text": "It is on the Seine.", "score": 0.72, "documentIndex": 1,
                     "resultOffset": 120, "resultLength": 19},
                    {"text": "Orphan passage.", "score": 0.1}
                ],
                "document": [
                    {"id": "doc0", "metadata": []},
                    {"id": "doc1", "metadata": [{"name": "title", "value": "France"},
                                                {"name": "lang", "value": "fr"}]}
                ],
                "status": []
            }],
            "status": []
        });
        let response: QueryResponse = serde_json::from_value(body).unwrap();
        let docs = into_documents(response).unwrap();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].id, "doc1#0");
        assert_eq!(docs[0].metadata.get("lang").map(String::as_str), Some("en"));
        assert_eq!(docs[0].metadata.get("title").map(String::as_str), Some("France"));
        assert_eq!(docs[0].metadata.get(DOCUMENT_ID_KEY).map(String::as_str), Some("doc1"));
        assert_eq!(docs[1].id, "doc1#120");
        assert!(docs[2].id.starts_with("passage-"));
        assert!(docs[2].metadata.get(DOCUMENT_ID_KEY).is_none());
    }

    fn response(passages: serde_json::Value, documents: serde_json::Value) -> QueryResponse {
        serde_json::from_value(serde_json::json!({
            "responseSet": [{"response": passages, "document": documents}]
        }))
        .unwrap()
    }

    #[test]
    fn test_passages_of_one_document_survive_merge() {
        let docs = into_documents(response(
            serde_json::json!([
                {"text": "Paris is the capital of France.", "score": 0.9,
                 "documentIndex": 0, "resultOffset": 0},
                {"text": "Paris hosts the Louvre.", "score": 0.8,
                 "documentIndex": 0, "resultOffset": 410}
            ]),
            serde_json::json!([{"id": "france.pdf"}]),
        ))
        .unwrap();

        let merged = merge_results(vec![docs.clone()]);
        assert_eq!(merged.as_slice(), docs.as_slice());
        assert_eq!(merged.ids(), vec!["france.pdf#0", "france.pdf#410"]);
    }

    #[test]
    fn test_passages_without_offset_are_keyed_by_text() {
        let docs = into_documents(response(
            serde_json::json!([
                {"text": "First passage.", "documentIndex": 0},
                {"text": "Second passage.", "documentIndex": 0}
            ]),
            serde_json::json!([{"id": "notes.md"}]),
        ))
        .unwrap();

        assert_ne!(docs[0].id, docs[1].id);
        assert!(docs[0].id.starts_with("notes.md#"));
    }

    #[test]
    fn test_orphan_passages_from_different_queries_stay_distinct() {
        let first = into_documents(response(
            serde_json::json!([{"text": "Alpha passage", "score": 0.7}]),
            serde_json::json!([]),
        ))
        .unwrap();
        let second = into_documents(response(
            serde_json::json!([{"text": "Beta passage", "score": 0.6}]),
            serde_json::json!([]),
        ))
        .unwrap();
        let repeat = into_documents(response(
            serde_json::json!([{"text": "Alpha passage", "score": 0.5}]),
            serde_json::json!([]),
        ))
        .unwrap();

        let merged = merge_results(vec![first, second, repeat]);
        let texts: Vec<&str> = merged.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["Alpha passage", "Beta passage"]);
    }

    #[test]
    fn test_response_status_error() {
        let body = serde_json::json!({
            "responseSet": [{
                "response": [],
                "document": [],
                "status": [{"code": "UNAUTHORIZED", "statusDetail": "Unauthorized to access corpus 5"}]
            }]
        });
        let response: QueryResponse = serde_json::from_value(body).unwrap();
        let err = into_documents(response).unwrap_err();

        assert!(matches!(err, MqRagError::VectorSearch(_)));
        assert!(err.to_string().contains("UNAUTHORIZED"));
    }

    #[test]
    fn test_empty_response() {
        let docs = into_documents(QueryResponse::default()).unwrap();
        assert!(docs.is_empty());
    }
}
