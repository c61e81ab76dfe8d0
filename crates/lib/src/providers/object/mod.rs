pub mod http;
pub mod local;

use crate::errors::ObjectStoreError;
use async_trait::async_trait;
use std::fmt::Debug;

/// The bucket name used when none is configured.
pub const DEFAULT_BUCKET_NAME: &str = "avc-system";

/// A trait for the object store holding raw document content.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Fetches the object stored under `key` in the configured bucket.
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError>;

    /// Fetches an object and decodes it as UTF-8 text.
    async fn get_text(&self, key: &str) -> Result<String, ObjectStoreError> {
        let bytes = self.get_object(key).await?;
        String::from_utf8(bytes).map_err(|_| ObjectStoreError::InvalidText(key.to_string()))
    }
}
