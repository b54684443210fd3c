//! Task model carried in the `tasks` collection.
//!
//! A task is a document with exactly one field, `name`. Conversion from a
//! raw [`Document`] fails when that field is missing.

use serde::{Deserialize, Serialize};

use crate::document::{Document, DocumentFields, DocumentId};

/// Name of the collection holding tasks.
pub const TASKS_COLLECTION: &str = "tasks";

/// Document field holding the task name.
pub const NAME_FIELD: &str = "name";

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier, immutable after creation.
    pub id: DocumentId,
    /// Display name of the task.
    pub name: String,
}

/// Errors converting a document into a [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskDocumentError {
    /// The document has no `name` field.
    #[error("document {0} has no name field")]
    MissingName(DocumentId),
}

impl Task {
    /// Creates a task from its id and name.
    pub fn new(id: DocumentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Builds the document fields stored for a task with the given name.
    #[must_use]
    pub fn fields(name: &str) -> DocumentFields {
        let mut fields = DocumentFields::new();
        fields.insert(NAME_FIELD.to_string(), name.to_string());
        fields
    }

    /// Converts a stored document into a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDocumentError::MissingName`] if the document has no
    /// `name` field.
    pub fn from_document(document: Document) -> Result<Self, TaskDocumentError> {
        let Document { id, mut fields } = document;
        match fields.remove(NAME_FIELD) {
            Some(name) => Ok(Self { id, name }),
            None => Err(TaskDocumentError::MissingName(id)),
        }
    }
}

impl TryFrom<Document> for Task {
    type Error = TaskDocumentError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        Self::from_document(document)
    }
}
