//! Persistence gateway over the document store.
//!
//! Defines the [`Gateway`] trait: four pass-through document operations
//! whose outcomes are normalized into a uniform [`GatewayResult`].
//! Gateway operations never fail with an `Err`; failures are carried in
//! the result. Concrete implementations:
//! - [`memory::InMemoryGateway`] — in-process store for the offline demo and tests
//! - [`remote::RemoteGateway`] — WebSocket client for `tasklist-store`

pub mod memory;
pub mod remote;

use std::future::Future;
use std::sync::Arc;

use tasklist_proto::document::{Document, DocumentFields, DocumentId};

/// Uniform outcome of a gateway operation.
///
/// `success == true` implies `data` is set and `error` is not; a failed
/// operation carries the store's message in `error`, passed through as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResult<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload of a successful operation.
    pub data: Option<T>,
    /// Store error message of a failed operation.
    pub error: Option<String>,
}

impl<T> GatewayResult<T> {
    /// A successful result carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A failed result carrying the store's error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Converts into a standard `Result`, with the error message as `Err`.
    ///
    /// # Errors
    ///
    /// Returns the error message if the operation failed, or a generic
    /// message if the result is internally inconsistent.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (true, None, _) => Err("store returned no data".to_string()),
            (false, _, Some(error)) => Err(error),
            (false, _, None) => Err("unknown store error".to_string()),
        }
    }
}

impl<T> From<Result<T, String>> for GatewayResult<T> {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::failure(error),
        }
    }
}

/// Errors establishing a gateway connection.
///
/// Only setup can fail with an `Err`; once connected, failures are
/// reported through [`GatewayResult`].
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The store URL is not a valid `ws://` or `wss://` URL.
    #[error("invalid store URL: {0}")]
    InvalidUrl(String),

    /// Connecting took longer than the configured timeout.
    #[error("store connection timed out")]
    Timeout,

    /// The store could not be reached.
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// The connection was closed.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Async CRUD access to a document store.
///
/// Implementations perform I/O only; they hold no copy of the task list.
pub trait Gateway: Send + Sync {
    /// Fetches every document in the named collection.
    fn list_collection(
        &self,
        collection: &str,
    ) -> impl Future<Output = GatewayResult<Vec<Document>>> + Send;

    /// Creates a document and returns its store-generated id.
    fn add_document(
        &self,
        collection: &str,
        fields: DocumentFields,
    ) -> impl Future<Output = GatewayResult<DocumentId>> + Send;

    /// Replaces the fields of the document with the given id.
    fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: DocumentFields,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Removes the document with the given id.
    fn delete_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> impl Future<Output = GatewayResult<()>> + Send;
}

impl<G: Gateway> Gateway for Arc<G> {
    fn list_collection(
        &self,
        collection: &str,
    ) -> impl Future<Output = GatewayResult<Vec<Document>>> + Send {
        (**self).list_collection(collection)
    }

    fn add_document(
        &self,
        collection: &str,
        fields: DocumentFields,
    ) -> impl Future<Output = GatewayResult<DocumentId>> + Send {
        (**self).add_document(collection, fields)
    }

    fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: DocumentFields,
    ) -> impl Future<Output = GatewayResult<()>> + Send {
        (**self).update_document(collection, id, fields)
    }

    fn delete_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> impl Future<Output = GatewayResult<()>> + Send {
        (**self).delete_document(collection, id)
    }
}
