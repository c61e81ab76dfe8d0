//! # Provider Factory
//!
//! Builds the classification provider and the object store from their
//! configuration sections, so every consumer wires them the same way.

use crate::{
    errors::{ObjectStoreError, ProviderError},
    providers::{
        ai::{local::LocalAiProvider, messages::MessagesProvider, ClassificationProvider},
        object::{http::HttpObjectStore, local::LocalObjectStore, ObjectStore},
    },
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Configuration of the classification service client.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassifierConfig {
    /// The type of provider ("messages" or "local").
    #[serde(default = "default_classifier_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    /// Version tag sent by the "messages" provider.
    #[serde(default)]
    pub anthropic_version: Option<String>,
}

fn default_classifier_provider() -> String {
    "messages".to_string()
}

/// Configuration of the object store holding extracted text.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ObjectStoreConfig {
    /// The type of store ("local" or "http").
    #[serde(default = "default_object_store_kind")]
    pub kind: String,
    /// Root directory for the "local" store.
    #[serde(default)]
    pub root: Option<String>,
    /// Base URL for the "http" store.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

fn default_object_store_kind() -> String {
    "local".to_string()
}

/// An unset `${VAR}` in the config file arrives as an empty string; treat it as absent.
fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

/// Instantiates the classification provider described by `config`.
///
/// Empty `api_key`, `model_name` and `anthropic_version` values count as unset.
pub fn create_classification_provider(
    config: &ClassifierConfig,
) -> Result<Arc<dyn ClassificationProvider>, ProviderError> {
    let api_url = non_empty(&config.api_url).ok_or_else(|| {
        ProviderError::Configuration(format!(
            "api_url is required for the '{}' classification provider",
            config.provider
        ))
    })?;
    info!(provider = %config.provider, %api_url, "Configuring classification provider.");

    let provider: Arc<dyn ClassificationProvider> = match config.provider.as_str() {
        "messages" => Arc::new(MessagesProvider::new(
            api_url,
            non_empty(&config.api_key),
            non_empty(&config.model_name),
            non_empty(&config.anthropic_version),
        )?),
        "local" => Arc::new(LocalAiProvider::new(
            api_url,
            non_empty(&config.api_key),
            non_empty(&config.model_name),
        )?),
        other => {
            return Err(ProviderError::Configuration(format!(
                "Unsupported classification provider type '{other}'"
            )))
        }
    };
    Ok(provider)
}

/// Instantiates the object store described by `config` for `bucket`.
pub fn create_object_store(
    config: &ObjectStoreConfig,
    bucket: &str,
) -> Result<Arc<dyn ObjectStore>, ObjectStoreError> {
    info!(kind = %config.kind, bucket, "Configuring object store.");
    match config.kind.as_str() {
        "local" => {
            let root = config.root.clone().unwrap_or_else(|| "data".to_string());
            Ok(Arc::new(LocalObjectStore::new(root, bucket)))
        }
        "http" => {
            let endpoint = non_empty(&config.endpoint).ok_or_else(|| {
                ObjectStoreError::Configuration("endpoint is required for the 'http' object store".to_string())
            })?;
            Ok(Arc::new(HttpObjectStore::new(
                endpoint,
                bucket.to_string(),
                non_empty(&config.token),
            )?))
        }
        other => Err(ObjectStoreError::Configuration(format!(
            "Unsupported object store kind '{other}'"
        ))),
    }
}
