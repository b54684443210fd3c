//! Document model shared by the store server and its clients.
//!
//! A collection is a named bag of documents. Each document carries a
//! store-assigned [`DocumentId`] and a flat map of string fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field map of a document (`field name -> value`).
pub type DocumentFields = BTreeMap<String, String>;

/// Opaque document identifier assigned by the store on creation.
///
/// Clients never mint identifiers; they only echo back ids the store
/// handed out. Ids are immutable for the lifetime of the document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh, time-ordered identifier (UUID v7, simple form).
    ///
    /// Only the store should call this.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Returns the string form of this identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored document: identifier plus fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier.
    pub id: DocumentId,
    /// Document contents.
    pub fields: DocumentFields,
}

impl Document {
    /// Creates a document from an id and its fields.
    #[must_use]
    pub const fn new(id: DocumentId, fields: DocumentFields) -> Self {
        Self { id, fields }
    }

    /// Returns the value of a field, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}
