//! In-process gateway for the offline demo and for testing.
//!
//! Keeps collections in a [`parking_lot::Mutex`]-guarded map and mirrors the
//! store server's semantics: updating a missing document fails, deleting a
//! missing document succeeds. Tests can queue failures per operation with
//! [`InMemoryGateway::fail_next`] and inspect how often each operation ran.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use tasklist_proto::document::{Document, DocumentFields, DocumentId};
use tasklist_proto::task::{TASKS_COLLECTION, Task};

use super::{Gateway, GatewayResult};

/// Gateway operation kinds, used for failure injection and call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    /// `list_collection`.
    List,
    /// `add_document`.
    Add,
    /// `update_document`.
    Update,
    /// `delete_document`.
    Delete,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    failures: HashMap<GatewayOp, VecDeque<String>>,
    calls: HashMap<GatewayOp, usize>,
}

impl Inner {
    /// Records a call and returns the queued failure for it, if any.
    fn begin(&mut self, op: GatewayOp) -> Option<String> {
        *self.calls.entry(op).or_default() += 1;
        self.failures.get_mut(&op).and_then(VecDeque::pop_front)
    }
}

/// Gateway backed by in-process collections.
#[derive(Default)]
pub struct InMemoryGateway {
    inner: Mutex<Inner>,
}

impl InMemoryGateway {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway whose `tasks` collection holds the given names,
    /// each with a fresh id.
    #[must_use]
    pub fn with_tasks(names: &[&str]) -> Self {
        let gateway = Self::new();
        {
            let mut inner = gateway.inner.lock();
            let docs = inner
                .collections
                .entry(TASKS_COLLECTION.to_string())
                .or_default();
            docs.extend(
                names
                    .iter()
                    .map(|name| Document::new(DocumentId::generate(), Task::fields(name))),
            );
        }
        gateway
    }

    /// Inserts a document with a caller-chosen id.
    pub fn insert(&self, collection: &str, document: Document) {
        self.inner
            .lock()
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Makes the next call of `op` fail with `message`.
    ///
    /// Failures queue up: calling this twice fails the next two calls.
    pub fn fail_next(&self, op: GatewayOp, message: impl Into<String>) {
        self.inner
            .lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(message.into());
    }

    /// Number of times `op` has been called, failed calls included.
    #[must_use]
    pub fn calls(&self, op: GatewayOp) -> usize {
        self.inner.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Total number of gateway calls of any kind.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.inner.lock().calls.values().sum()
    }

    /// Current documents of a collection, in insertion order.
    #[must_use]
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.inner
            .lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

impl Gateway for InMemoryGateway {
    async fn list_collection(&self, collection: &str) -> GatewayResult<Vec<Document>> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.begin(GatewayOp::List) {
            return GatewayResult::failure(error);
        }
        GatewayResult::ok(
            inner
                .collections
                .get(collection)
                .cloned()
                .unwrap_or_default(),
        )
    }

    async fn add_document(
        &self,
        collection: &str,
        fields: DocumentFields,
    ) -> GatewayResult<DocumentId> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.begin(GatewayOp::Add) {
            return GatewayResult::failure(error);
        }
        let id = DocumentId::generate();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));
        GatewayResult::ok(id)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: DocumentFields,
    ) -> GatewayResult<()> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.begin(GatewayOp::Update) {
            return GatewayResult::failure(error);
        }
        let doc = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == *id));
        match doc {
            Some(doc) => {
                doc.fields = fields;
                GatewayResult::ok(())
            }
            None => GatewayResult::failure(format!("document not found: {id}")),
        }
    }

    async fn delete_document(&self, collection: &str, id: &DocumentId) -> GatewayResult<()> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.begin(GatewayOp::Delete) {
            return GatewayResult::failure(error);
        }
        if let Some(docs) = inner.collections.get_mut(collection) {
            docs.retain(|d| d.id != *id);
        }
        GatewayResult::ok(())
    }
}
