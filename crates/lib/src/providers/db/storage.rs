use crate::{
    errors::StoreError,
    types::{DocumentRecord, DocumentUpdate},
};
use async_trait::async_trait;
use std::fmt::Debug;

/// A trait for the key-value store holding document records.
///
/// Records are keyed by their `id`. Updates are partial: a backend writes the
/// fields present in a `DocumentUpdate` and leaves every other attribute untouched,
/// atomically for that single record.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Returns the name of the storage backend (e.g., "SQLite").
    fn name(&self) -> &str;

    /// Fetches a record by id, or `None` if no such record exists.
    async fn get_document(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError>;

    /// Applies a partial update and returns the full post-update record.
    ///
    /// A missing record is created from the update alone.
    async fn update_document(
        &self,
        id: &str,
        update: &DocumentUpdate,
    ) -> Result<DocumentRecord, StoreError>;

    /// Writes a whole record, replacing any existing record with the same id.
    async fn put_document(&self, record: &DocumentRecord) -> Result<(), StoreError>;
}
