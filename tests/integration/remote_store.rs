//! End-to-end tests: controller over `RemoteGateway` against a live store.
//!
//! Each test starts an in-process `tasklist-store` server on an ephemeral
//! port and drives it through the same controller the TUI uses.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tasklist::gateway::Gateway;
use tasklist::gateway::remote::RemoteGateway;
use tasklist::tasks::{TaskError, TaskListController};
use tasklist_proto::document::DocumentId;
use tasklist_proto::task::{TASKS_COLLECTION, Task};
use tasklist_store::server::{StoreState, start_server, start_server_with_state};
use tasklist_store::store::DocumentStore;

const TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

async fn connect(addr: std::net::SocketAddr) -> RemoteGateway {
    RemoteGateway::connect(&format!("ws://{addr}/ws"), TIMEOUT)
        .await
        .expect("connect to store")
}

fn temp_snapshot() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tasklist-e2e-{}", DocumentId::generate()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join("store.json")
}

fn names<G: Gateway>(controller: &TaskListController<G>) -> Vec<String> {
    controller.tasks().iter().map(|t| t.name.clone()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_crud_cycle() {
    let (addr, _handle) = start_server("127.0.0.1:0").await.unwrap();
    let mut controller = TaskListController::new(connect(addr).await);
    assert_eq!(controller.load().await, Ok(0));

    controller.set_draft("Walk dog");
    controller.submit().await.unwrap();
    controller.set_draft("Buy milk");
    controller.submit().await.unwrap();
    assert_eq!(names(&controller), ["Buy milk", "Walk dog"]);

    let milk = controller.tasks()[0].clone();
    controller.begin_edit(&milk);
    controller.set_draft("Buy oat milk");
    controller.submit().await.unwrap();
    assert_eq!(names(&controller), ["Buy oat milk", "Walk dog"]);

    let dog = controller.tasks()[1].clone();
    controller.delete(&dog.id).await.unwrap();

    // A fresh client sees exactly what the first one left behind.
    let mut fresh = TaskListController::new(connect(addr).await);
    fresh.load().await.unwrap();
    assert_eq!(names(&fresh), ["Buy oat milk"]);
    assert_eq!(fresh.tasks()[0].id, milk.id);
}

#[tokio::test]
async fn store_error_reaches_view() {
    let (addr, _handle) = start_server("127.0.0.1:0").await.unwrap();
    let mut controller = TaskListController::with_tasks(
        connect(addr).await,
        vec![Task::new(DocumentId::new("ghost"), "never stored")],
    );

    let ghost = controller.tasks()[0].clone();
    controller.begin_edit(&ghost);
    controller.set_draft("renamed");
    let result = controller.submit().await;

    assert_eq!(
        result,
        Err(TaskError::Persistence(
            "document not found: ghost".to_string()
        ))
    );
    assert_eq!(
        controller.view().error_message.as_deref(),
        Some("document not found: ghost")
    );
    assert_eq!(names(&controller), ["never stored"]);
}

#[tokio::test]
async fn delete_of_missing_document_succeeds() {
    let (addr, _handle) = start_server("127.0.0.1:0").await.unwrap();
    let gateway = connect(addr).await;
    let result = gateway
        .delete_document(TASKS_COLLECTION, &DocumentId::new("nope"))
        .await;
    assert!(result.success);
}

#[tokio::test]
async fn two_clients_share_the_collection() {
    let (addr, _handle) = start_server("127.0.0.1:0").await.unwrap();
    let shared = Arc::new(connect(addr).await);

    let mut first = TaskListController::new(Arc::clone(&shared));
    first.load().await.unwrap();
    first.set_draft("from first");
    first.add().await.unwrap();

    let mut second = TaskListController::new(connect(addr).await);
    second.load().await.unwrap();
    assert_eq!(names(&second), ["from first"]);
}

#[tokio::test]
async fn snapshot_survives_store_restart() {
    let path = temp_snapshot();

    let state = Arc::new(StoreState::with_config(
        64 * 1024,
        DocumentStore::open(&path).await.unwrap(),
    ));
    let (addr, handle) = start_server_with_state("127.0.0.1:0", state)
        .await
        .unwrap();
    let mut controller = TaskListController::new(connect(addr).await);
    controller.load().await.unwrap();
    controller.set_draft("persisted");
    let added = controller.add().await.unwrap();
    handle.abort();

    let state = Arc::new(StoreState::with_config(
        64 * 1024,
        DocumentStore::open(&path).await.unwrap(),
    ));
    let (addr, _handle) = start_server_with_state("127.0.0.1:0", state)
        .await
        .unwrap();
    let mut reopened = TaskListController::new(connect(addr).await);
    reopened.load().await.unwrap();
    assert_eq!(reopened.tasks(), [added].as_slice());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[tokio::test]
async fn oversized_add_reports_error_and_keeps_list() {
    let state = Arc::new(StoreState::with_config(1024, DocumentStore::new()));
    let (addr, _handle) = start_server_with_state("127.0.0.1:0", state)
        .await
        .unwrap();
    let mut controller = TaskListController::new(connect(addr).await);
    controller.load().await.unwrap();
    controller.set_draft("small");
    controller.add().await.unwrap();

    let long_name = "x".repeat(2000);
    controller.set_draft(long_name.as_str());
    let result = tokio::time::timeout(TIMEOUT, controller.add())
        .await
        .expect("add resolves");

    assert!(matches!(result, Err(TaskError::Persistence(_))));
    assert!(
        controller
            .view()
            .error_message
            .as_deref()
            .unwrap_or_default()
            .contains("too large")
    );
    assert_eq!(names(&controller), ["small"]);
    assert_eq!(controller.view().draft_name, long_name);

    // The same connection keeps serving later requests.
    controller.set_draft("after");
    controller.add().await.unwrap();
    assert_eq!(names(&controller), ["after", "small"]);
}

#[tokio::test]
async fn connect_rejects_non_websocket_url() {
    let result = RemoteGateway::connect("http://127.0.0.1:9100/ws", TIMEOUT).await;
    assert!(result.is_err());
}
