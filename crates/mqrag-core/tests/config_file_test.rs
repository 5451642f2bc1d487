//! Integration tests for loading configuration files

use mqrag_core::{Config, FailurePolicy, MqRagError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_yaml_file_with_env_overlay() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(
        &path,
        r#"
vectara:
  customer_id: "1111"
  corpus_id: "2"
  api_key: from-file
llm_service:
  model: gpt-4o-mini
  temperature: 0.2
pipeline:
  query_count: 4
  top_k: 8
  failure_policy: skip
"#,
    )
    .unwrap();

    let mut config = Config::from_file(&path).unwrap();
    config
        .apply_lookup(|key| match key {
            "VECTARA_API_KEY" => Some("from-env".to_string()),
            "OPENAI_API_KEY" => Some("sk-env".to_string()),
            _ => None,
        })
        .unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.vectara.customer_id.as_deref(), Some("1111"));
    assert_eq!(config.vectara.api_key.as_deref(), Some("from-env"));
    assert_eq!(config.llm_service.model, "gpt-4o-mini");
    assert_eq!(config.pipeline.query_count, 4);
    assert_eq!(config.pipeline.top_k, 8);
    assert_eq!(config.pipeline.failure_policy, FailurePolicy::Skip);
    assert_eq!(config.pipeline.max_concurrent_retrievals, 4);
}

#[test]
fn test_invalid_yaml_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, "pipeline: [not, a, map]\n").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, MqRagError::Yaml(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Config::from_file(&dir.path().join("absent.yml")).unwrap_err();
    assert!(matches!(err, MqRagError::Io(_)));
}

#[test]
fn test_redacted_yaml_round_trip_hides_keys() {
    let mut config = Config::default();
    config.vectara.api_key = Some("zqt_secret".to_string());
    config.llm_service.api_key = Some("sk-secret".to_string());

    let yaml = serde_yaml::to_string(&config.redacted()).unwrap();
    assert!(!yaml.contains("zqt_secret"));
    assert!(!yaml.contains("sk-secret"));
}
