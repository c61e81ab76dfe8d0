//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. Each external service is constructed here once
//! and injected into the `DocumentHandler`.

use crate::config::AppConfig;
use doctag::{
    providers::{
        db::sqlite::SqliteDocumentStore,
        factory::{create_classification_provider, create_object_store},
    },
    DocumentHandler,
};
use std::{path::Path, sync::Arc};
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub document_handler: DocumentHandler,
}

/// Builds the shared application state from the configuration.
///
/// This function initializes all necessary services:
/// - the SQLite document store, creating the database directory if needed;
/// - the object store for the configured bucket;
/// - the classification provider client.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    if config.db_url != ":memory:" {
        if let Some(parent) = Path::new(&config.db_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let store = SqliteDocumentStore::new(&config.db_url, &config.table_name).await?;
    let objects = create_object_store(&config.object_store, &config.bucket_name)?;
    let classifier = create_classification_provider(&config.classifier)?;
    info!(
        table = %config.table_name,
        bucket = %config.bucket_name,
        "Application state initialized."
    );

    Ok(AppState {
        document_handler: DocumentHandler::new(Arc::new(store), objects, classifier),
        config: Arc::new(config),
    })
}
