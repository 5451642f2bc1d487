//! Integration tests for the mqrag binary
//!
//! None of these reach the network: each case fails or finishes before
//! the first upstream call.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command with a scrubbed environment and an empty config directory
fn mqrag_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mqrag").unwrap();
    cmd.env_clear()
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd
}

fn with_credentials(cmd: &mut Command) -> &mut Command {
    cmd.env("VECTARA_CUSTOMER_ID", "1234")
        .env("VECTARA_CORPUS_ID", "7")
        .env("VECTARA_API_KEY", "zqt_secret_vectara")
        .env("OPENAI_API_KEY", "sk-secret-openai")
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    mqrag_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("retrieve"));
}

#[test]
fn test_ask_without_credentials_is_a_config_error() {
    let home = TempDir::new().unwrap();
    mqrag_cmd(&home)
        .args(["ask", "What is the capital of France?"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("VECTARA_CUSTOMER_ID"))
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_ask_requires_a_question() {
    let home = TempDir::new().unwrap();
    mqrag_cmd(&home).arg("ask").assert().failure();
}

#[test]
fn test_blank_question_is_invalid_input() {
    let home = TempDir::new().unwrap();
    let mut cmd = mqrag_cmd(&home);
    with_credentials(&mut cmd)
        .args(["ask", "   "])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("question"));
}

#[test]
fn test_zero_queries_is_rejected() {
    let home = TempDir::new().unwrap();
    let mut cmd = mqrag_cmd(&home);
    with_credentials(&mut cmd)
        .args(["expand", "-n", "0", "anything"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("query_count"));
}

#[test]
fn test_non_numeric_corpus_id_is_rejected() {
    let home = TempDir::new().unwrap();
    let mut cmd = mqrag_cmd(&home);
    with_credentials(&mut cmd)
        .env("VECTARA_CORPUS_ID", "my-corpus")
        .args(["retrieve", "anything"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not numeric"));
}

#[test]
fn test_config_masks_secrets() {
    let home = TempDir::new().unwrap();
    let mut cmd = mqrag_cmd(&home);
    with_credentials(&mut cmd)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("sk-secret-openai").not())
        .stdout(predicate::str::contains("zqt_secret_vectara").not());
}

#[test]
fn test_config_reads_yaml_file() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("mqrag.yml");
    fs::write(
        &path,
        "vectara:\n  customer_id: \"42\"\n  corpus_id: \"9\"\n  api_key: zqt_from_file\n\
         pipeline:\n  query_count: 5\n  failure_policy: skip\n",
    )
    .unwrap();

    mqrag_cmd(&home)
        .args(["--format", "json", "config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"query_count\": 5"))
        .stdout(predicate::str::contains("\"failure_policy\": \"skip\""))
        .stdout(predicate::str::contains("zqt_from_file").not())
        // No LLM key anywhere, so the command warns but still prints
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_unknown_failure_policy_is_rejected() {
    let home = TempDir::new().unwrap();
    let mut cmd = mqrag_cmd(&home);
    with_credentials(&mut cmd)
        .env("MQRAG_FAILURE_POLICY", "retry")
        .arg("config")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("retry"));
}
