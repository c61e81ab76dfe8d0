//! # Document Tagging and Classification
//!
//! This crate updates document metadata (tags, folder, category) held in a
//! key-value store and enriches it through a text-classification service.
//!
//! The [`handler::DocumentHandler`] is independent of any transport: it takes a
//! request descriptor and always returns a formatted response descriptor. The
//! document store, object store and classification client are injected through
//! the traits in [`providers`].

pub mod classify;
pub mod errors;
pub mod handler;
pub mod prompts;
pub mod providers;
pub mod types;

pub use errors::{HandlerError, ObjectStoreError, ProviderError, StoreError};
pub use handler::DocumentHandler;
pub use types::{
    ApiRequest, ApiResponse, ClassificationResult, DocumentRecord, DocumentUpdate, TagUpdate,
};
