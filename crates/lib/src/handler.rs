//! # Document Request Handler
//!
//! Routes a request descriptor to the tag updater, the classifier or the
//! document reader, and formats every outcome (including failures) into a
//! response descriptor. The stores and the classification client are injected,
//! so the handler holds no global state.

use crate::{
    classify::{classify_text, derive_text_key},
    errors::HandlerError,
    providers::{ai::ClassificationProvider, db::storage::DocumentStore, object::ObjectStore},
    types::{ApiRequest, ApiResponse, DocumentUpdate, TagUpdate},
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::{collections::BTreeMap, sync::Arc};
use tracing::{error, info, warn};

/// The message attached to a successful classification.
pub const CLASSIFY_SUCCESS_MESSAGE: &str = "自動分類が完了しました";

const DOCUMENT_NOT_FOUND: &str = "Document not found";

/// The operation selected for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    UpdateTags(String),
    Classify(String),
    GetDocument(String),
}

/// Resolves a method and path to a route.
///
/// The document id is the second path segment. Fewer than two segments is a bad
/// request; an unrecognized method/suffix combination is not found.
pub fn resolve_route(method: &str, path: &str) -> Result<Route, HandlerError> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    if segments.len() < 2 {
        return Err(HandlerError::BadRequest("Invalid path".to_string()));
    }
    let doc_id = segments[1].to_string();

    match method.to_ascii_uppercase().as_str() {
        "PATCH" if path.ends_with("/tags") => Ok(Route::UpdateTags(doc_id)),
        "POST" if path.ends_with("/classify") => Ok(Route::Classify(doc_id)),
        "GET" if segments.len() == 2 && segments[0] == "documents" => {
            Ok(Route::GetDocument(doc_id))
        }
        _ => Err(HandlerError::NotFound("Not Found".to_string())),
    }
}

/// Current UTC time as ISO-8601 with millisecond precision and a `Z` suffix.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Handles document metadata requests against the injected services.
#[derive(Clone, Debug)]
pub struct DocumentHandler {
    store: Arc<dyn DocumentStore>,
    objects: Arc<dyn ObjectStore>,
    classifier: Arc<dyn ClassificationProvider>,
}

impl DocumentHandler {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
        classifier: Arc<dyn ClassificationProvider>,
    ) -> Self {
        Self {
            store,
            objects,
            classifier,
        }
    }

    /// Routes and executes a request. Failures are always rendered as error responses.
    pub async fn dispatch(&self, request: &ApiRequest) -> ApiResponse {
        info!(method = %request.method, path = %request.path, "Dispatching request.");

        let outcome = match resolve_route(&request.method, &request.path) {
            Ok(Route::UpdateTags(id)) => self.update_tags(&id, request.body.as_deref()).await,
            Ok(Route::Classify(id)) => self.classify(&id).await,
            Ok(Route::GetDocument(id)) => self.get_document(&id).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(body) => success_response(&body),
            Err(e) => {
                if e.status_code() >= 500 {
                    error!("Request failed: {e:?}");
                }
                error_response(e.status_code(), &e.to_string())
            }
        }
    }

    /// Applies the fields present in `body` plus a fresh `updatedAt`.
    pub async fn update_tags(&self, doc_id: &str, body: Option<&str>) -> Result<Value, HandlerError> {
        let tag_update: TagUpdate = serde_json::from_str(body.unwrap_or("{}"))?;
        if tag_update.is_empty() {
            return Err(HandlerError::BadRequest("No fields to update".to_string()));
        }

        let update = DocumentUpdate {
            tags: tag_update.tags,
            folder: tag_update.folder,
            category: tag_update.category,
            updated_at: Some(utc_timestamp()),
            ..Default::default()
        };
        let record = self.store.update_document(doc_id, &update).await?;
        info!(doc_id, "Updated document tags.");

        Ok(serde_json::to_value(record)?)
    }

    /// Classifies the document's text and stores the result on the record.
    pub async fn classify(&self, doc_id: &str) -> Result<Value, HandlerError> {
        // 1. Lookup
        let document = self
            .store
            .get_document(doc_id)
            .await?
            .ok_or_else(|| HandlerError::NotFound(DOCUMENT_NOT_FOUND.to_string()))?;

        // 2. Text resolution
        let text = match document.usable_text() {
            Some(text) => Some(text.to_string()),
            None => match document.s3_key.as_deref() {
                Some(s3_key) => self.fetch_text_fallback(s3_key).await,
                None => None,
            },
        };
        let text = text.filter(|t| !t.is_empty()).ok_or_else(|| {
            HandlerError::BadRequest("No text content available for classification".to_string())
        })?;

        // 3. Classification call
        info!(doc_id, chars = text.chars().count(), "Classifying document.");
        let classification = classify_text(self.classifier.as_ref(), &text).await;
        let result = &classification.result;

        // 4. Persistence
        let update = DocumentUpdate {
            tags: Some(result.tags.clone()),
            category: Some(result.category.clone()),
            classification_confidence: Some(result.confidence),
            updated_at: Some(utc_timestamp()),
            ..Default::default()
        };
        let record = self.store.update_document(doc_id, &update).await?;

        // 5. Response: the record with the raw payload and message set on top.
        let mut body = match serde_json::to_value(record)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        body.insert("classification".to_string(), classification.payload);
        body.insert(
            "message".to_string(),
            Value::String(CLASSIFY_SUCCESS_MESSAGE.to_string()),
        );
        Ok(Value::Object(body))
    }

    /// Returns the stored record.
    pub async fn get_document(&self, doc_id: &str) -> Result<Value, HandlerError> {
        let document = self
            .store
            .get_document(doc_id)
            .await?
            .ok_or_else(|| HandlerError::NotFound(DOCUMENT_NOT_FOUND.to_string()))?;
        Ok(serde_json::to_value(document)?)
    }

    /// Fetches the extracted-text object that sits beside the stored PDF.
    ///
    /// A failed fetch is logged and treated as "no text".
    async fn fetch_text_fallback(&self, s3_key: &str) -> Option<String> {
        let text_key = derive_text_key(s3_key);
        match self.objects.get_text(&text_key).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(%text_key, "Failed to fetch text from object store: {e}");
                None
            }
        }
    }
}

fn success_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        (
            "Access-Control-Allow-Methods".to_string(),
            "GET, POST, PATCH, OPTIONS".to_string(),
        ),
        (
            "Access-Control-Allow-Headers".to_string(),
            "Content-Type".to_string(),
        ),
    ])
}

fn error_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
    ])
}

/// Renders a 200 response. serde_json writes non-ASCII text unescaped.
pub fn success_response(body: &Value) -> ApiResponse {
    ApiResponse {
        status_code: 200,
        headers: success_headers(),
        body: body.to_string(),
    }
}

/// Renders `{"error": message}` with the given status.
pub fn error_response(status_code: u16, message: &str) -> ApiResponse {
    ApiResponse {
        status_code,
        headers: error_headers(),
        body: json!({ "error": message }).to_string(),
    }
}
