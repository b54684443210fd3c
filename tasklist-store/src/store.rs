//! In-memory document collections with an optional JSON snapshot file.
//!
//! The [`DocumentStore`] keeps one ordered map per collection. Document ids
//! are UUID v7, so map order is creation order. When a snapshot path is
//! configured, every successful mutation rewrites the snapshot (temp file +
//! rename); if that write fails the mutation is rolled back so memory and
//! disk never disagree.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tasklist_proto::document::{Document, DocumentFields, DocumentId};
use tokio::sync::RwLock;

/// Errors returned by [`DocumentStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document with this id exists in the collection.
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// The request named an empty collection.
    #[error("collection name cannot be empty")]
    EmptyCollection,

    /// The snapshot file exists but could not be read.
    #[error("failed to read snapshot {path}: {source}")]
    ReadSnapshot {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The snapshot file could not be parsed or serialized.
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The snapshot file could not be written.
    #[error("failed to write snapshot {path}: {source}")]
    WriteSnapshot {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

type Collections = HashMap<String, BTreeMap<DocumentId, DocumentFields>>;

/// On-disk snapshot layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    collections: BTreeMap<String, Vec<Document>>,
}

/// Undo record for a single mutation.
enum Undo {
    Remove(DocumentId),
    Restore(DocumentId, DocumentFields),
    Nothing,
}

/// Thread-safe document store.
pub struct DocumentStore {
    collections: RwLock<Collections>,
    snapshot_path: Option<PathBuf>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Creates an empty, memory-only store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            snapshot_path: None,
        }
    }

    /// Opens a store backed by a snapshot file.
    ///
    /// A missing file is treated as an empty store; it is created on the
    /// first mutation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ReadSnapshot`] if the file exists but cannot be
    /// read, or [`StoreError::Snapshot`] if it is not a valid snapshot.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let collections = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let snapshot: Snapshot = serde_json::from_str(&contents)?;
                from_snapshot(snapshot)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StoreError::ReadSnapshot { path, source: e }),
        };

        let documents: usize = collections.values().map(BTreeMap::len).sum();
        tracing::info!(path = %path.display(), documents, "opened document store");

        Ok(Self {
            collections: RwLock::new(collections),
            snapshot_path: Some(path),
        })
    }

    /// Returns every document in a collection in creation order.
    ///
    /// An unknown collection is simply empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyCollection`] for an empty collection name.
    pub async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        check_collection(collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Adds a document and returns its newly generated id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyCollection`] for an empty collection name,
    /// or a snapshot error if persisting fails.
    pub async fn add(
        &self,
        collection: &str,
        fields: DocumentFields,
    ) -> Result<DocumentId, StoreError> {
        check_collection(collection)?;
        let id = DocumentId::generate();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        self.persist_or_undo(&mut collections, collection, Undo::Remove(id.clone()))
            .await?;
        drop(collections);
        tracing::debug!(collection, id = %id, "document added");
        Ok(id)
    }

    /// Replaces the fields of an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the document does not exist, or a
    /// snapshot error if persisting fails.
    pub async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: DocumentFields,
    ) -> Result<(), StoreError> {
        check_collection(collection)?;
        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let previous = std::mem::replace(slot, fields);
        self.persist_or_undo(&mut collections, collection, Undo::Restore(id.clone(), previous))
            .await?;
        drop(collections);
        tracing::debug!(collection, id = %id, "document updated");
        Ok(())
    }

    /// Removes a document. Deleting an absent document succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyCollection`] for an empty collection name,
    /// or a snapshot error if persisting fails.
    pub async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        check_collection(collection)?;
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));
        let undo = match removed {
            Some(fields) => Undo::Restore(id.clone(), fields),
            None => Undo::Nothing,
        };
        let existed = !matches!(undo, Undo::Nothing);
        if existed {
            self.persist_or_undo(&mut collections, collection, undo).await?;
        }
        drop(collections);
        tracing::debug!(collection, id = %id, existed, "document deleted");
        Ok(())
    }

    /// Writes the snapshot, reverting the last mutation if the write fails.
    async fn persist_or_undo(
        &self,
        collections: &mut Collections,
        collection: &str,
        undo: Undo,
    ) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let Err(e) = write_snapshot(path, collections).await else {
            return Ok(());
        };

        tracing::error!(path = %path.display(), error = %e, "snapshot write failed, reverting");
        if let Some(docs) = collections.get_mut(collection) {
            match undo {
                Undo::Remove(id) => {
                    docs.remove(&id);
                }
                Undo::Restore(id, fields) => {
                    docs.insert(id, fields);
                }
                Undo::Nothing => {}
            }
        }
        Err(e)
    }
}

fn check_collection(collection: &str) -> Result<(), StoreError> {
    if collection.is_empty() {
        return Err(StoreError::EmptyCollection);
    }
    Ok(())
}

fn from_snapshot(snapshot: Snapshot) -> Collections {
    snapshot
        .collections
        .into_iter()
        .map(|(name, docs)| {
            let docs = docs.into_iter().map(|d| (d.id, d.fields)).collect();
            (name, docs)
        })
        .collect()
}

fn to_snapshot(collections: &Collections) -> Snapshot {
    Snapshot {
        collections: collections
            .iter()
            .map(|(name, docs)| {
                let docs = docs
                    .iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect();
                (name.clone(), docs)
            })
            .collect(),
    }
}

async fn write_snapshot(path: &Path, collections: &Collections) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(&to_snapshot(collections))?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| StoreError::WriteSnapshot {
            path: tmp.clone(),
            source: e,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::WriteSnapshot {
            path: path.to_path_buf(),
            source: e,
        })
}
