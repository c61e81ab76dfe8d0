//! # Core Data Types
//!
//! Typed records exchanged between the routing layer, the handler and the
//! providers. Stored documents keep any attribute this crate does not know
//! about in `extra`, so partial updates never drop fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The stored metadata entry for one document, keyed by `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Every other stored attribute (`type`, `subject`, `sender`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Returns `extractedText` unless it is missing or empty.
    ///
    /// Whitespace-only text still counts and is classified as is.
    pub fn usable_text(&self) -> Option<&str> {
        self.extracted_text.as_deref().filter(|text| !text.is_empty())
    }
}

/// The body accepted by `PATCH /documents/{id}/tags`.
///
/// Keys other than these three are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TagUpdate {
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl TagUpdate {
    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.folder.is_none() && self.category.is_none()
    }
}

/// A partial field set applied to a stored record.
///
/// Only the `Some` fields are written; everything else in the record is left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl DocumentUpdate {
    /// Renders the update as the attribute map a store merges into the record.
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Ok(Map::new()),
        }
    }
}

fn default_tags() -> Vec<String> {
    vec![crate::prompts::FALLBACK_TAG.to_string()]
}

fn default_category() -> String {
    crate::prompts::FALLBACK_CATEGORY.to_string()
}

fn default_confidence() -> f64 {
    crate::classify::UNPARSEABLE_CONFIDENCE
}

/// The structured reply of the classification service.
///
/// Values are accepted as-is; nothing checks them against the vocabularies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

/// An inbound request as delivered by the routing layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>, body: Option<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body,
        }
    }
}

/// The formatted response handed back to the routing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    /// Parses the body back into JSON. Mostly useful to callers and tests.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}
