use anyhow::Result;
use async_trait::async_trait;
use doctag::errors::{ObjectStoreError, ProviderError};
use doctag::providers::{
    ai::{ClassificationProvider, ClassificationRequest},
    db::{sqlite::SqliteDocumentStore, storage::DocumentStore},
    object::ObjectStore,
};
use doctag::{DocumentHandler, DocumentRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// --- Test Setup ---

/// Wires a `DocumentHandler` to an isolated in-memory store and test doubles.
pub struct TestSetup {
    pub store: Arc<SqliteDocumentStore>,
    pub objects: MockObjectStore,
    pub classifier: MockClassifier,
    pub handler: DocumentHandler,
}

impl TestSetup {
    /// Creates a new setup whose classifier answers with `reply`.
    pub async fn new(reply: &str) -> Result<Self> {
        Self::with_classifier(MockClassifier::replying(reply)).await
    }

    pub async fn with_classifier(classifier: MockClassifier) -> Result<Self> {
        let store = Arc::new(SqliteDocumentStore::new(":memory:", "Documents").await?);
        let objects = MockObjectStore::new();
        let handler = DocumentHandler::new(
            store.clone(),
            Arc::new(objects.clone()),
            Arc::new(classifier.clone()),
        );
        Ok(Self {
            store,
            objects,
            classifier,
            handler,
        })
    }

    /// Stores `record` as-is.
    pub async fn seed(&self, record: &DocumentRecord) -> Result<()> {
        self.store.put_document(record).await?;
        Ok(())
    }

    pub async fn fetch(&self, id: &str) -> Result<Option<DocumentRecord>> {
        Ok(self.store.get_document(id).await?)
    }
}

// --- Mock Classification Provider ---

#[derive(Clone, Debug)]
enum MockReply {
    Text(String),
    Failure(String),
}

/// A classification provider that returns a canned reply and records every request.
#[derive(Clone, Debug)]
pub struct MockClassifier {
    reply: MockReply,
    calls: Arc<Mutex<Vec<ClassificationRequest>>>,
}

impl MockClassifier {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: MockReply::Text(reply.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider whose every call fails with an API error.
    pub fn failing(message: &str) -> Self {
        Self {
            reply: MockReply::Failure(message.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<ClassificationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClassificationProvider for MockClassifier {
    async fn invoke(&self, request: &ClassificationRequest) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(request.clone());
        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Failure(message) => Err(ProviderError::AiApi(message.clone())),
        }
    }
}

// --- Mock Object Store ---

/// An in-memory object store that records every key requested.
#[derive(Clone, Debug, Default)]
pub struct MockObjectStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, content: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), content.as_bytes().to_vec());
    }

    pub fn get_requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        self.requests.lock().unwrap().push(key.to_string());
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))
    }
}

/// A reply shaped the way the classification service usually answers.
pub fn classification_reply(tags: &[&str], category: &str, confidence: f64) -> String {
    format!(
        "分類結果は以下の通りです。\n{{\"tags\": {tags:?}, \"category\": \"{category}\", \"confidence\": {confidence}, \"reasoning\": \"テスト\"}}"
    )
}
