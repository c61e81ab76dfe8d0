//! # Application Configuration
//!
//! This module defines the configuration structure for the `doctag-server` and
//! the logic for loading it from an optional YAML file and environment
//! variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use doctag::providers::{
    ai::messages::DEFAULT_ANTHROPIC_VERSION,
    db::sqlite::DEFAULT_TABLE_NAME,
    factory::{ClassifierConfig, ObjectStoreConfig},
    object::DEFAULT_BUCKET_NAME,
};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT`.
    pub port: u16,
    /// The path to the SQLite database file. Loaded from `DB_URL`.
    pub db_url: String,
    /// The document table. Loaded from `TABLE_NAME`.
    pub table_name: String,
    /// The bucket holding raw and extracted content. Loaded from `BUCKET_NAME`.
    pub bucket_name: String,
    pub classifier: ClassifierConfig,
    pub object_store: ObjectStoreConfig,
}

const DEFAULT_PORT: i64 = 9090;
const DEFAULT_DB_URL: &str = "db/doctag.db";
const DEFAULT_CONFIG_FILE: &str = "config.yml";

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration.
///
/// Layers, lowest precedence first:
/// 1. Built-in defaults (`TABLE_NAME=Documents`, `BUCKET_NAME=avc-system`, ...).
/// 2. A YAML file: `config_path_override`, else `$DOCTAG_CONFIG`, else `config.yml`.
///    Only an explicitly named file is required to exist.
/// 3. Plain environment variables for top-level keys (`PORT`, `TABLE_NAME`, ...).
/// 4. `DOCTAG_`-prefixed variables for nested keys (e.g. `DOCTAG_CLASSIFIER__API_URL`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        .set_default("port", DEFAULT_PORT)?
        .set_default("db_url", DEFAULT_DB_URL)?
        .set_default("table_name", DEFAULT_TABLE_NAME)?
        .set_default("bucket_name", DEFAULT_BUCKET_NAME)?
        .set_default("classifier.provider", "messages")?
        .set_default("classifier.anthropic_version", DEFAULT_ANTHROPIC_VERSION)?
        .set_default("object_store.kind", "local")?
        .set_default("object_store.root", "data")?;

    let explicit_path = config_path_override
        .map(String::from)
        .or_else(|| env::var("DOCTAG_CONFIG").ok());
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    match read_and_substitute(&config_path)? {
        Some(content) => {
            info!("Loading configuration from '{config_path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if explicit_path.is_some() => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{config_path}'."
            )));
        }
        None => {}
    }

    let settings = builder
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("DOCTAG")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
