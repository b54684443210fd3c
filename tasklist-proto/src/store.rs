//! Document store wire protocol.
//!
//! Clients send [`StoreRequest`]s and the server answers each with exactly
//! one [`StoreResponse`] carrying the same `request_id`. Responses may
//! arrive in any order; clients match them up by id. Both directions are
//! postcard-encoded and sent as WebSocket binary frames.

use serde::{Deserialize, Serialize};

use crate::codec::{self, CodecError};
use crate::document::{Document, DocumentFields, DocumentId};

/// Request id used by the server when it cannot tell which request an
/// error belongs to (e.g. the frame did not decode).
pub const UNKNOWN_REQUEST_ID: u64 = 0;

/// A single client request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRequest {
    /// Client-chosen correlation id, echoed in the response. Never 0.
    pub request_id: u64,
    /// The operation to perform.
    pub op: StoreOp,
}

/// Operations supported by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreOp {
    /// Fetch every document in a collection.
    ListCollection {
        /// Collection name.
        collection: String,
    },
    /// Create a document; the store assigns its id.
    AddDocument {
        /// Collection name.
        collection: String,
        /// Initial fields.
        fields: DocumentFields,
    },
    /// Replace the fields of an existing document.
    UpdateDocument {
        /// Collection name.
        collection: String,
        /// Target document.
        id: DocumentId,
        /// Replacement fields.
        fields: DocumentFields,
    },
    /// Remove a document.
    DeleteDocument {
        /// Collection name.
        collection: String,
        /// Target document.
        id: DocumentId,
    },
}

impl StoreOp {
    /// Short operation name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ListCollection { .. } => "list_collection",
            Self::AddDocument { .. } => "add_document",
            Self::UpdateDocument { .. } => "update_document",
            Self::DeleteDocument { .. } => "delete_document",
        }
    }

    /// Collection the operation targets.
    #[must_use]
    pub fn collection(&self) -> &str {
        match self {
            Self::ListCollection { collection }
            | Self::AddDocument { collection, .. }
            | Self::UpdateDocument { collection, .. }
            | Self::DeleteDocument { collection, .. } => collection,
        }
    }
}

/// The server's answer to one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreResponse {
    /// Id of the request this answers.
    pub request_id: u64,
    /// Result of the operation.
    pub outcome: StoreOutcome,
}

/// Result of a store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreOutcome {
    /// Documents of a listed collection.
    Documents(Vec<Document>),
    /// Id of a newly added document.
    Added(DocumentId),
    /// Update or delete completed.
    Done,
    /// The operation failed; human-readable reason.
    Error(String),
}

/// Encodes a [`StoreRequest`].
///
/// # Errors
///
/// Returns [`CodecError`] if serialization fails.
pub fn encode_request(request: &StoreRequest) -> Result<Vec<u8>, CodecError> {
    codec::encode(request)
}

/// Decodes a [`StoreRequest`].
///
/// # Errors
///
/// Returns [`CodecError`] if the bytes are not a valid request.
pub fn decode_request(bytes: &[u8]) -> Result<StoreRequest, CodecError> {
    codec::decode(bytes)
}

/// Encodes a [`StoreResponse`].
///
/// # Errors
///
/// Returns [`CodecError`] if serialization fails.
pub fn encode_response(response: &StoreResponse) -> Result<Vec<u8>, CodecError> {
    codec::encode(response)
}

/// Decodes a [`StoreResponse`].
///
/// # Errors
///
/// Returns [`CodecError`] if the bytes are not a valid response.
pub fn decode_response(bytes: &[u8]) -> Result<StoreResponse, CodecError> {
    codec::decode(bytes)
}

/// Reads the `request_id` at the front of an encoded request without
/// decoding the rest of the frame.
///
/// Lets the server answer an oversized or truncated request under the id
/// its sender is waiting on. Returns `None` when no id can be read.
#[must_use]
pub fn peek_request_id(bytes: &[u8]) -> Option<u64> {
    postcard::take_from_bytes::<u64>(bytes)
        .ok()
        .map(|(request_id, _rest)| request_id)
        .filter(|&request_id| request_id != UNKNOWN_REQUEST_ID)
}
