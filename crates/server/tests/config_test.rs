//! # Configuration Tests
//!
//! Exercises the layering of defaults, the YAML file and environment variables
//! in `get_config`.

use doctag_server::config::{get_config, ConfigError};
use std::env;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Environment variables are process-global, so tests touching them run one at a time.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Clears every variable `get_config` reads.
fn clear_env_vars() {
    for var in [
        "PORT",
        "DB_URL",
        "TABLE_NAME",
        "BUCKET_NAME",
        "DOCTAG_CONFIG",
        "DOCTAG_PORT",
        "DOCTAG_CLASSIFIER__PROVIDER",
        "DOCTAG_CLASSIFIER__API_URL",
        "DOCTAG_CLASSIFIER__API_KEY",
        "DOCTAG_OBJECT_STORE__KIND",
        "DOCTAG_OBJECT_STORE__ENDPOINT",
        "TEST_DOCTAG_TABLE",
    ] {
        env::remove_var(var);
    }
}

#[test]
fn test_get_config_defaults() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let config = get_config(None).expect("Configuration should load from defaults");

    assert_eq!(config.port, 9090);
    assert_eq!(config.db_url, "db/doctag.db");
    assert_eq!(config.table_name, "Documents");
    assert_eq!(config.bucket_name, "avc-system");
    assert_eq!(config.classifier.provider, "messages");
    assert_eq!(config.classifier.api_url, None);
    assert_eq!(
        config.classifier.anthropic_version.as_deref(),
        Some("bedrock-2023-05-31")
    );
    assert_eq!(config.object_store.kind, "local");
    assert_eq!(config.object_store.root.as_deref(), Some("data"));
}

#[test]
fn test_get_config_env_overrides() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    env::set_var("PORT", "9999");
    env::set_var("TABLE_NAME", "FaxDocuments");
    env::set_var("BUCKET_NAME", "fax-bucket");
    env::set_var(
        "DOCTAG_CLASSIFIER__API_URL",
        "http://localhost:8080/model/invoke",
    );
    env::set_var("DOCTAG_OBJECT_STORE__KIND", "http");

    let config = get_config(None).expect("Configuration should load");

    assert_eq!(config.port, 9999);
    assert_eq!(config.table_name, "FaxDocuments");
    assert_eq!(config.bucket_name, "fax-bucket");
    assert_eq!(
        config.classifier.api_url.as_deref(),
        Some("http://localhost:8080/model/invoke")
    );
    assert_eq!(config.object_store.kind, "http");

    clear_env_vars();
}

#[test]
fn test_get_config_from_yaml_with_substitution() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
port: 8181
table_name: ${{TEST_DOCTAG_TABLE}}
classifier:
  provider: local
  api_url: http://localhost:1234/v1/chat/completions
  model_name: gemma-3
object_store:
  kind: http
  endpoint: http://localhost:9000
"#
    )
    .unwrap();
    env::set_var("TEST_DOCTAG_TABLE", "MailDocuments");
    env::set_var("PORT", "7000");

    let path = file.path().to_str().unwrap().to_string();
    let config = get_config(Some(&path)).expect("Configuration should load from file");

    // Environment variables win over the file.
    assert_eq!(config.port, 7000);
    assert_eq!(config.table_name, "MailDocuments");
    assert_eq!(config.bucket_name, "avc-system");
    assert_eq!(config.classifier.provider, "local");
    assert_eq!(config.classifier.model_name.as_deref(), Some("gemma-3"));
    assert_eq!(
        config.object_store.endpoint.as_deref(),
        Some("http://localhost:9000")
    );

    clear_env_vars();
}

#[test]
fn test_get_config_file_from_env_var() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "bucket_name: archive-bucket").unwrap();
    env::set_var("DOCTAG_CONFIG", file.path());

    let config = get_config(None).expect("Configuration should load from DOCTAG_CONFIG");
    assert_eq!(config.bucket_name, "archive-bucket");

    clear_env_vars();
}

#[test]
fn test_get_config_missing_explicit_file() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let result = get_config(Some("does/not/exist.yml"));
    match result {
        Err(ConfigError::NotFound(msg)) => assert!(msg.contains("does/not/exist.yml")),
        other => panic!("Expected ConfigError::NotFound, got {other:?}"),
    }
}
