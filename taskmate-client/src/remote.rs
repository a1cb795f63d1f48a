//! Contract for the remote document store holding authoritative task records.

use async_trait::async_trait;
use taskmate_core::{FieldPatch, StoreError, StoredDocument, TaskDocument};

/// A document-oriented store addressed by collection name and document id.
///
/// Implementations only translate calls; they never retry.
#[async_trait]
pub trait RemoteTaskStore: Send + Sync {
    /// Enumerate every document in the collection, in the store's own order.
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// Read one document. `Ok(None)` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError>;

    /// Create a document under a store-generated id and return that id.
    async fn add(&self, collection: &str, document: TaskDocument) -> Result<String, StoreError>;

    /// Overwrite the whole document, creating it if absent.
    async fn set(&self, collection: &str, id: &str, document: TaskDocument)
        -> Result<(), StoreError>;

    /// Merge a partial field patch into an existing document.
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    async fn patch(&self, collection: &str, id: &str, patch: FieldPatch) -> Result<(), StoreError>;

    /// Remove a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}
