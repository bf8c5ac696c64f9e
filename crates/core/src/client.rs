//! Client traits — the request/response boundary to the external backends.
//!
//! The conversational pipeline in `wellspring-chat` talks exclusively to
//! these traits, so all of its sequencing logic is testable with scripted
//! mocks and no network. Production implementations live in
//! `wellspring-snowflake`.
//!
//! None of these calls carry a client-side timeout, retry, or cancellation:
//! every suspension point is a single synchronous round-trip awaited to
//! completion, and a failure is fatal for the operation that issued it.

use crate::chunk::RetrievedChunk;
use crate::error::ServiceError;
use crate::model::ModelId;
use async_trait::async_trait;

/// Searches the managed retrieval service for document chunks.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Retrieve up to `limit` ranked chunks for `query`.
    ///
    /// When `category` is anything other than [`crate::ALL_CATEGORIES`], the
    /// service filters results to an exact category match server-side. An
    /// empty result set is a normal outcome, not an error.
    async fn search(
        &self,
        query: &str,
        category: &str,
        limit: usize,
    ) -> std::result::Result<Vec<RetrievedChunk>, ServiceError>;
}

/// Sends a prompt to the hosted completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// One round-trip: the full generated text, or an error. Never a partial
    /// result.
    async fn complete(
        &self,
        model: ModelId,
        prompt: &str,
    ) -> std::result::Result<String, ServiceError>;
}

/// Document storage: signed links and the document/category catalog.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Request a time-limited signed URL for one stored document.
    async fn presigned_url(
        &self,
        path: &str,
        validity_secs: u32,
    ) -> std::result::Result<String, ServiceError>;

    /// Names of every document currently in the stage.
    async fn list_documents(&self) -> std::result::Result<Vec<String>, ServiceError>;

    /// Distinct category tags across the chunk table.
    async fn list_categories(&self) -> std::result::Result<Vec<String>, ServiceError>;
}
