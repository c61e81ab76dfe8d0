//! # Common Test Utilities
//!
//! `TestApp` spawns the real server on a random port. The classification
//! service and the HTTP object store both point at one `httpmock::MockServer`,
//! and the document store is an in-memory SQLite database shared with the test
//! so records can be seeded and inspected directly.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use doctag::providers::{
    db::{sqlite::SqliteDocumentStore, storage::DocumentStore},
    factory::{
        create_classification_provider, create_object_store, ClassifierConfig, ObjectStoreConfig,
    },
};
use doctag::{DocumentHandler, DocumentRecord};
use doctag_server::{config::AppConfig, router::create_router, state::AppState};
use httpmock::MockServer;
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, task::JoinHandle};

pub const CLASSIFY_PATH: &str = "/model/invoke";
pub const BUCKET: &str = "avc-system";

/// Builds a configuration whose external services live on `mock_server`.
pub fn test_config(mock_server: &MockServer) -> AppConfig {
    AppConfig {
        port: 0,
        db_url: ":memory:".to_string(),
        table_name: "Documents".to_string(),
        bucket_name: BUCKET.to_string(),
        classifier: ClassifierConfig {
            provider: "messages".to_string(),
            api_url: Some(mock_server.url(CLASSIFY_PATH)),
            ..Default::default()
        },
        object_store: ObjectStoreConfig {
            kind: "http".to_string(),
            endpoint: Some(mock_server.base_url()),
            ..Default::default()
        },
    }
}

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub store: Arc<SqliteDocumentStore>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server and returns a `TestApp` instance.
    pub async fn spawn() -> Result<Self> {
        // `try_init` is used to prevent panic if the logger is already initialized.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;
        let config = test_config(&mock_server);

        let store = Arc::new(SqliteDocumentStore::new(&config.db_url, &config.table_name).await?);
        let objects = create_object_store(&config.object_store, &config.bucket_name)?;
        let classifier = create_classification_provider(&config.classifier)?;

        let app_state = AppState {
            document_handler: DocumentHandler::new(store.clone(), objects, classifier),
            config: Arc::new(config),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            store,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub async fn seed(&self, record: &DocumentRecord) -> Result<()> {
        self.store.put_document(record).await?;
        Ok(())
    }

    pub async fn fetch(&self, id: &str) -> Result<Option<DocumentRecord>> {
        Ok(self.store.get_document(id).await?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            // The receiver might already be gone if the server task panicked.
            let _ = tx.send(());
        }
    }
}
