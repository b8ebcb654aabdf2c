//! Integration tests for the embedgate CLI
//!
//! These tests run the binary end to end with `HOME` and the working directory
//! pointed at temporary directories, so no real configuration is read. HTTP
//! providers are stood in for by wiremock servers.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Get a Command for the embedgate binary, isolated in `dir`
///
/// The working directory is `dir` and the home directory is `dir/home`.
#[allow(deprecated)]
fn embedgate(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("embedgate").expect("Failed to find embedgate binary");
    cmd.current_dir(dir)
        .env("HOME", dir.join("home"))
        .env_remove("EMBEDGATE_CONFIG")
        .env_remove("EMBEDGATE_PROVIDER")
        .env_remove("EMBEDGATE_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// Write a local config file under `dir`
fn write_local_config(dir: &Path, content: &str) {
    let config_dir = dir.join(".embedgate");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), content).unwrap();
}

fn openai_config(base_url: &str) -> String {
    format!(
        r#"
default_provider = "openai"

[providers.openai]
api_key = "sk-integration-test-key"
base_url = "{}"
model_name = "text-embedding-3-small"
timeout_secs = 5
"#,
        base_url
    )
}

// ============================================================================
// Providers Command
// ============================================================================

#[test]
fn test_providers_lists_every_identifier() {
    let temp = TempDir::new().unwrap();
    embedgate(temp.path())
        .arg("providers")
        .assert()
        .success()
        .stdout(predicate::str::contains("openai"))
        .stdout(predicate::str::contains("azure openai"))
        .stdout(predicate::str::contains("ollama"))
        .stdout(predicate::str::contains("ml studio"))
        .stdout(predicate::str::contains("gemini"))
        .stdout(predicate::str::contains("siliconflow"))
        .stdout(predicate::str::contains("deepseek"));
}

#[test]
fn test_providers_json() {
    let temp = TempDir::new().unwrap();
    let output = embedgate(temp.path())
        .args(["providers", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let providers: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(providers.as_array().unwrap().len(), 7);
    assert_eq!(providers[2]["id"], "ollama");
    assert_eq!(providers[2]["requires_api_key"], false);
}

// ============================================================================
// Config Command
// ============================================================================

#[test]
fn test_config_init_set_use_show() {
    let temp = TempDir::new().unwrap();

    embedgate(temp.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    assert!(temp.path().join(".embedgate/config.toml").exists());

    embedgate(temp.path())
        .args(["config", "set", "Ollama", "base_url", "http://localhost:11434"])
        .assert()
        .success();
    embedgate(temp.path())
        .args(["config", "set", "gemini", "api_key", "AIzaSyExampleKey123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AIzaS...123"))
        .stdout(predicate::str::contains("AIzaSyExampleKey123").not());

    embedgate(temp.path())
        .args(["config", "use", "ollama"])
        .assert()
        .success();

    let output = embedgate(temp.path())
        .args(["config", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["default_provider"], "ollama");
    assert_eq!(
        config["providers"]["ollama"]["base_url"],
        "http://localhost:11434"
    );
    assert_eq!(config["providers"]["gemini"]["api_key"], "AIzaS...123");
    // Starter profile is still there
    assert_eq!(
        config["providers"]["openai"]["api_key_env"],
        "OPENAI_API_KEY"
    );
}

#[test]
fn test_config_init_keeps_existing_file() {
    let temp = TempDir::new().unwrap();
    write_local_config(temp.path(), "default_provider = \"ollama\"\n[providers.ollama]\n");

    embedgate(temp.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stderr(predicate::str::contains("left unchanged"));

    let content = std::fs::read_to_string(temp.path().join(".embedgate/config.toml")).unwrap();
    assert!(content.contains("ollama"));
    assert!(!content.contains("OPENAI_API_KEY"));
}

#[test]
fn test_config_init_global_uses_home() {
    let temp = TempDir::new().unwrap();
    embedgate(temp.path())
        .args(["config", "init", "--global"])
        .assert()
        .success();
    assert!(temp.path().join("home/.embedgate/config.toml").exists());
    assert!(!temp.path().join(".embedgate/config.toml").exists());
}

#[test]
fn test_config_set_unknown_provider() {
    let temp = TempDir::new().unwrap();
    embedgate(temp.path())
        .args(["config", "set", "word2vec", "base_url", "http://x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Known providers"));
}

#[test]
fn test_config_set_unknown_field() {
    let temp = TempDir::new().unwrap();
    embedgate(temp.path())
        .args(["config", "set", "openai", "temperature", "0.2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("temperature"));
}

#[test]
fn test_config_use_requires_profile() {
    let temp = TempDir::new().unwrap();
    embedgate(temp.path())
        .args(["config", "use", "deepseek"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no profile"));
}

#[test]
fn test_config_path_json() {
    let temp = TempDir::new().unwrap();
    let output = embedgate(temp.path())
        .args(["config", "path", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let paths: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(paths["local_exists"], false);
    assert!(paths["local"]
        .as_str()
        .unwrap()
        .ends_with("config.toml"));
}

// ============================================================================
// Test Command
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_test_command_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.5, 0.25, 0.125], "index": 0}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    write_local_config(temp.path(), &openai_config(&server.uri()));

    embedgate(temp.path())
        .arg("test")
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider:  openai"))
        .stdout(predicate::str::contains("sk-in...key"))
        .stdout(predicate::str::contains("sk-integration-test-key").not())
        .stdout(predicate::str::contains("Dimension: 3"))
        .stdout(predicate::str::contains("0.500000"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_test_command_failure_exits_non_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    write_local_config(temp.path(), &openai_config(&server.uri()));

    embedgate(temp.path())
        .arg("test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("test failed"));
}

#[test]
fn test_test_command_construction_error() {
    let temp = TempDir::new().unwrap();
    embedgate(temp.path())
        .args([
            "--provider",
            "azure openai",
            "--base-url",
            "https://not-a-deployment-url",
            "--api-key",
            "k",
            "test",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to create adapter"));
}

#[test]
fn test_test_command_without_provider() {
    let temp = TempDir::new().unwrap();
    embedgate(temp.path())
        .arg("test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no provider selected"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_overrides_select_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": [1.0, 2.0]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    embedgate(temp.path())
        .args([
            "--provider",
            "ollama",
            "--base-url",
            &server.uri(),
            "--model",
            "nomic-embed-text",
            "test",
            "--text",
            "hello",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dimension: 2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_provider_alias_selects_canonical_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.5, 0.5, 0.5, 0.5]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    embedgate(temp.path())
        .args(["config", "set", "LM Studio", "base_url", &server.uri()])
        .assert()
        .success();
    embedgate(temp.path())
        .args(["config", "set", "lmstudio", "model_name", "nomic-embed"])
        .assert()
        .success();

    embedgate(temp.path())
        .args(["--provider", "lm-studio", "test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider:  ml studio"))
        .stdout(predicate::str::contains("Dimension: 4"));
}

#[test]
fn test_provider_alias_finds_azure_profile() {
    let temp = TempDir::new().unwrap();
    embedgate(temp.path())
        .args([
            "config",
            "set",
            "azure",
            "base_url",
            "https://r.openai.azure.com/openai/deployments/d/embeddings?api-version=1",
        ])
        .assert()
        .success();

    let output = embedgate(temp.path())
        .args(["--provider", "azure", "config", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["default_provider"], "azure openai");
    assert!(config["providers"]["azure openai"]["base_url"]
        .as_str()
        .unwrap()
        .contains("/openai/deployments/d/"));
}

// ============================================================================
// Embed Command
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_embed_json_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"embedding": [0.5, 0.25], "index": 0},
                {"embedding": [0.75, 1.0], "index": 1}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    write_local_config(temp.path(), &openai_config(&server.uri()));

    let output = embedgate(temp.path())
        .args(["embed", "first", "second", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let vectors: Vec<Vec<f32>> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(vectors, vec![vec![0.5, 0.25], vec![0.75, 1.0]]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_embed_failed_item_does_not_abort() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_partial_json(json!({"prompt": "bad"})))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": [1.0, 2.0, 3.0]
        })))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    embedgate(temp.path())
        .args([
            "--provider",
            "ollama",
            "--base-url",
            &server.uri(),
            "--model",
            "m",
            "embed",
            "good",
            "bad",
            "also good",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[0] 3 dims"))
        .stdout(predicate::str::contains("[1] empty"))
        .stdout(predicate::str::contains("[2] 3 dims"));
}

#[test]
fn test_embed_stdin() {
    let temp = TempDir::new().unwrap();
    // Unreachable local port: both lines degrade to empty vectors
    embedgate(temp.path())
        .args([
            "--provider",
            "ollama",
            "--base-url",
            "http://127.0.0.1:1",
            "--model",
            "m",
            "embed",
            "--stdin",
        ])
        .write_stdin("one\ntwo\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[0] empty"))
        .stdout(predicate::str::contains("[1] empty"));
}

#[test]
fn test_embed_without_input_fails() {
    let temp = TempDir::new().unwrap();
    embedgate(temp.path())
        .args(["--provider", "ollama", "embed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No input texts"));
}

// ============================================================================
// Explicit Config File
// ============================================================================

#[test]
fn test_explicit_config_file_skips_local() {
    let temp = TempDir::new().unwrap();
    write_local_config(temp.path(), "default_provider = \"openai\"\n[providers.openai]\n");

    let explicit = temp.path().join("other.toml");
    std::fs::write(
        &explicit,
        "default_provider = \"ollama\"\n[providers.ollama]\nbase_url = \"http://localhost:11434\"\n",
    )
    .unwrap();

    let output = embedgate(temp.path())
        .args(["--config", explicit.to_str().unwrap(), "config", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["default_provider"], "ollama");
    assert!(config["providers"].get("openai").is_none());
}

#[test]
fn test_broken_config_is_reported() {
    let temp = TempDir::new().unwrap();
    write_local_config(temp.path(), "default_provider = [");

    embedgate(temp.path())
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
