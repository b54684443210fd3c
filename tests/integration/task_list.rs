//! Integration tests for the task list controller.
//!
//! Runs the controller against the in-memory gateway and checks the
//! observable list and form state after each operation, including how
//! store failures are surfaced.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use tasklist::gateway::memory::{GatewayOp, InMemoryGateway};
use tasklist::tasks::{TaskError, TaskListController};
use tasklist_proto::task::{TASKS_COLLECTION, Task};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

type Controller = TaskListController<Arc<InMemoryGateway>>;

/// Creates a loaded controller over a gateway seeded with `names`.
async fn loaded(names: &[&str]) -> (Controller, Arc<InMemoryGateway>) {
    let gateway = Arc::new(InMemoryGateway::with_tasks(names));
    let mut controller = TaskListController::new(Arc::clone(&gateway));
    controller.load().await.unwrap();
    (controller, gateway)
}

/// Adds a task named `name` through the form.
async fn add(controller: &mut Controller, name: &str) -> Task {
    controller.set_draft(name);
    controller.add().await.unwrap()
}

fn visible_names(controller: &Controller) -> Vec<String> {
    controller.visible_tasks().map(|t| t.name.clone()).collect()
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_then_visible_contains_exactly_one() {
    let (mut controller, _) = loaded(&[]).await;
    add(&mut controller, "Buy milk").await;

    let matching: Vec<_> = controller
        .visible_tasks()
        .filter(|t| t.name == "Buy milk")
        .collect();
    assert_eq!(matching.len(), 1);
}

#[tokio::test]
async fn add_uses_store_generated_id() {
    let (mut controller, gateway) = loaded(&[]).await;
    let task = add(&mut controller, "Buy milk").await;

    let stored = gateway.documents(TASKS_COLLECTION);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, task.id);
    assert_eq!(stored[0].field("name"), Some("Buy milk"));
}

#[tokio::test]
async fn add_with_empty_draft_never_calls_gateway() {
    let (mut controller, gateway) = loaded(&[]).await;
    let calls_after_load = gateway.total_calls();

    let result = controller.add().await;
    assert_eq!(result, Err(TaskError::Validation));
    assert_eq!(gateway.total_calls(), calls_after_load);
    assert_eq!(
        controller.view().error_message.as_deref(),
        Some("You must enter a task.")
    );
}

#[tokio::test]
async fn add_failure_sets_error_and_keeps_list() {
    let (mut controller, gateway) = loaded(&["existing"]).await;
    gateway.fail_next(GatewayOp::Add, "network down");
    let before = controller.tasks().to_vec();

    controller.set_draft("Buy milk");
    assert!(controller.add().await.is_err());
    assert_eq!(
        controller.view().error_message.as_deref(),
        Some("network down")
    );
    assert_eq!(controller.tasks(), before.as_slice());
}

#[tokio::test]
async fn successful_add_clears_previous_error() {
    let (mut controller, gateway) = loaded(&[]).await;
    gateway.fail_next(GatewayOp::Add, "network down");
    controller.set_draft("Buy milk");
    controller.add().await.unwrap_err();

    controller.add().await.unwrap();
    assert!(controller.view().error_message.is_none());
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_exactly_one_entry() {
    let (mut controller, gateway) = loaded(&["a", "b", "c"]).await;
    let target = controller.tasks()[1].clone();

    controller.delete(&target.id).await.unwrap();
    assert_eq!(controller.tasks().len(), 2);
    assert!(controller.tasks().iter().all(|t| t.id != target.id));
    assert_eq!(gateway.documents(TASKS_COLLECTION).len(), 2);
}

#[tokio::test]
async fn delete_failure_keeps_entry() {
    let (mut controller, gateway) = loaded(&["a"]).await;
    gateway.fail_next(GatewayOp::Delete, "permission denied");
    let id = controller.tasks()[0].id.clone();

    assert_eq!(
        controller.delete(&id).await,
        Err(TaskError::Persistence("permission denied".to_string()))
    );
    assert_eq!(controller.tasks().len(), 1);
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn begin_edit_then_save_replaces_name() {
    let (mut controller, gateway) = loaded(&["a", "b"]).await;
    let target = controller.tasks()[0].clone();

    controller.begin_edit(&target);
    assert_eq!(controller.view().draft_name, "a");
    assert_eq!(controller.view().editing_id.as_ref(), Some(&target.id));

    controller.set_draft("c");
    controller.submit().await.unwrap();

    assert_eq!(controller.tasks().len(), 2);
    let renamed = controller
        .tasks()
        .iter()
        .find(|t| t.id == target.id)
        .unwrap();
    assert_eq!(renamed.name, "c");
    assert!(!controller.view().edit_mode);
    assert!(controller.view().draft_name.is_empty());

    let stored = gateway
        .documents(TASKS_COLLECTION)
        .into_iter()
        .find(|d| d.id == target.id)
        .unwrap();
    assert_eq!(stored.field("name"), Some("c"));
}

#[tokio::test]
async fn save_with_empty_draft_keeps_edit_mode() {
    let (mut controller, gateway) = loaded(&["a"]).await;
    let target = controller.tasks()[0].clone();
    controller.begin_edit(&target);
    controller.set_draft("");

    assert_eq!(controller.submit().await, Err(TaskError::Validation));
    assert!(controller.view().edit_mode);
    assert_eq!(gateway.calls(GatewayOp::Update), 0);
}

#[tokio::test]
async fn save_of_task_deleted_elsewhere_reports_store_error() {
    let (mut controller, gateway) = loaded(&["a"]).await;
    let target = controller.tasks()[0].clone();
    controller.begin_edit(&target);

    // Another client removed the document in the meantime.
    let mut other = TaskListController::new(Arc::clone(&gateway));
    other.delete(&target.id).await.unwrap();

    controller.set_draft("renamed");
    let result = controller.submit().await;
    assert_eq!(
        result,
        Err(TaskError::Persistence(format!(
            "document not found: {}",
            target.id
        )))
    );
    assert!(controller.view().edit_mode);
}

// ---------------------------------------------------------------------------
// Ordering and search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn visible_is_sorted_regardless_of_insertion_order() {
    let (mut controller, _) = loaded(&["pear", "apple"]).await;
    add(&mut controller, "fig").await;
    add(&mut controller, "banana").await;
    add(&mut controller, "zucchini").await;

    assert_eq!(
        visible_names(&controller),
        ["apple", "banana", "fig", "pear", "zucchini"]
    );
}

#[tokio::test]
async fn rename_keeps_list_sorted() {
    let (mut controller, _) = loaded(&["a", "b", "c"]).await;
    let first = controller.tasks()[0].clone();
    controller.begin_edit(&first);
    controller.set_draft("bb");
    controller.save().await.unwrap();

    assert_eq!(visible_names(&controller), ["b", "bb", "c"]);
}

#[tokio::test]
async fn search_is_case_insensitive_substring() {
    let (mut controller, _) = loaded(&["Buy milk", "Walk dog"]).await;
    controller.set_search_term("MILK");
    assert_eq!(visible_names(&controller), ["Buy milk"]);
}

#[tokio::test]
async fn search_term_a_selects_a_only() {
    let (mut controller, _) = loaded(&["A", "B"]).await;
    controller.set_search_term("a");
    assert_eq!(visible_names(&controller), ["A"]);
}

#[tokio::test]
async fn empty_search_shows_everything() {
    let (mut controller, _) = loaded(&["A", "B"]).await;
    controller.set_search_term("zzz");
    assert!(visible_names(&controller).is_empty());
    controller.set_search_term("");
    assert_eq!(visible_names(&controller), ["A", "B"]);
    assert_eq!(controller.tasks().len(), 2);
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_failure_surfaces_error() {
    let gateway = Arc::new(InMemoryGateway::with_tasks(&["a"]));
    gateway.fail_next(GatewayOp::List, "store offline");
    let mut controller = TaskListController::new(Arc::clone(&gateway));

    assert!(controller.load().await.is_err());
    assert!(controller.tasks().is_empty());
    assert_eq!(
        controller.view().error_message.as_deref(),
        Some("store offline")
    );
}

#[tokio::test]
async fn reload_sees_changes_from_other_controller() {
    let (mut first, gateway) = loaded(&[]).await;
    add(&mut first, "shared").await;

    let mut second = TaskListController::new(Arc::clone(&gateway));
    second.load().await.unwrap();
    assert_eq!(visible_names(&second), ["shared"]);
}
