//! Integration tests for the TUI ↔ controller wiring.
//!
//! Drives an `App` with key events, forwards the commands it produces to a
//! spawned controller task, and feeds the resulting snapshots back, the
//! same way the binary's event loop does.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use tasklist::app::{App, PanelFocus};
use tasklist::dispatch::{Command, ControllerEvent, spawn_controller};
use tasklist::gateway::memory::{GatewayOp, InMemoryGateway};
use tasklist::tasks::TaskListController;
use tasklist_proto::task::TASKS_COLLECTION;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    app: App,
    gateway: Arc<InMemoryGateway>,
    cmd_tx: mpsc::Sender<Command>,
    evt_rx: mpsc::Receiver<ControllerEvent>,
}

impl Harness {
    async fn start(names: &[&str]) -> Self {
        let gateway = Arc::new(InMemoryGateway::with_tasks(names));
        let controller = TaskListController::new(Arc::clone(&gateway));
        let (cmd_tx, evt_rx, _handle) = spawn_controller(controller, 16);
        let mut harness = Self {
            app: App::new(),
            gateway,
            cmd_tx,
            evt_rx,
        };
        harness.next_snapshot().await;
        harness
    }

    /// Wait for the next snapshot and apply it to the app.
    async fn next_snapshot(&mut self) {
        let event = tokio::time::timeout(EVENT_TIMEOUT, self.evt_rx.recv())
            .await
            .expect("snapshot within timeout")
            .expect("controller task alive");
        match event {
            ControllerEvent::Snapshot(snapshot) => self.app.apply_snapshot(snapshot),
        }
    }

    /// Press a key; if it produced a command, run it and apply the result.
    async fn press(&mut self, code: KeyCode) {
        if let Some(cmd) = self
            .app
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
        {
            self.cmd_tx.send(cmd).await.unwrap();
            self.next_snapshot().await;
        }
    }

    async fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c)).await;
        }
    }

    fn visible_names(&self) -> Vec<&str> {
        self.app
            .snapshot
            .visible
            .iter()
            .map(|t| t.name.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initial_snapshot_is_loaded_and_sorted() {
    let harness = Harness::start(&["b", "a"]).await;
    assert!(harness.app.snapshot.loaded);
    assert_eq!(harness.visible_names(), ["a", "b"]);
}

#[tokio::test]
async fn type_and_submit_adds_task() {
    let mut harness = Harness::start(&[]).await;
    harness.type_text("Buy milk").await;
    harness.press(KeyCode::Enter).await;

    assert_eq!(harness.visible_names(), ["Buy milk"]);
    assert!(harness.app.input.text().is_empty());
    assert_eq!(harness.gateway.documents(TASKS_COLLECTION).len(), 1);
}

#[tokio::test]
async fn empty_submit_shows_validation_error() {
    let mut harness = Harness::start(&[]).await;
    harness.press(KeyCode::Enter).await;

    assert_eq!(
        harness.app.snapshot.view.error_message.as_deref(),
        Some("You must enter a task.")
    );
    assert_eq!(harness.gateway.calls(GatewayOp::Add), 0);
}

#[tokio::test]
async fn edit_from_list_renames_task() {
    let mut harness = Harness::start(&["a", "b"]).await;
    harness.app.focus = PanelFocus::List;

    harness.press(KeyCode::Char('e')).await;
    assert_eq!(harness.app.focus, PanelFocus::Form);
    assert!(harness.app.snapshot.view.edit_mode);
    assert_eq!(harness.app.input.text(), "a");

    harness.press(KeyCode::Backspace).await;
    harness.type_text("z").await;
    harness.press(KeyCode::Enter).await;

    assert_eq!(harness.visible_names(), ["b", "z"]);
    assert!(!harness.app.snapshot.view.edit_mode);
    assert!(harness.app.input.text().is_empty());
}

#[tokio::test]
async fn escape_cancels_edit() {
    let mut harness = Harness::start(&["a"]).await;
    harness.app.focus = PanelFocus::List;
    harness.press(KeyCode::Char('e')).await;

    harness.press(KeyCode::Esc).await;
    assert!(!harness.app.snapshot.view.edit_mode);
    assert!(harness.app.input.text().is_empty());
    assert!(!harness.app.should_quit);
}

#[tokio::test]
async fn confirmed_delete_removes_task() {
    let mut harness = Harness::start(&["a", "b"]).await;
    harness.app.focus = PanelFocus::List;
    harness.press(KeyCode::Char('j')).await;
    harness.press(KeyCode::Char('d')).await;
    assert!(harness.app.confirm_delete.is_some());

    harness.press(KeyCode::Char('y')).await;
    assert_eq!(harness.visible_names(), ["a"]);
    assert_eq!(harness.gateway.calls(GatewayOp::Delete), 1);
}

#[tokio::test]
async fn declined_delete_keeps_task() {
    let mut harness = Harness::start(&["a"]).await;
    harness.app.focus = PanelFocus::List;
    harness.press(KeyCode::Char('d')).await;
    harness.press(KeyCode::Char('n')).await;

    assert_eq!(harness.visible_names(), ["a"]);
    assert_eq!(harness.gateway.calls(GatewayOp::Delete), 0);
}

#[tokio::test]
async fn search_filters_visible_tasks() {
    let mut harness = Harness::start(&["Buy milk", "Walk dog"]).await;
    harness.app.focus = PanelFocus::Search;
    harness.type_text("MILK").await;

    assert_eq!(harness.visible_names(), ["Buy milk"]);
    assert_eq!(harness.app.snapshot.tasks.len(), 2);
}

#[tokio::test]
async fn store_failure_is_shown_and_draft_kept() {
    let mut harness = Harness::start(&[]).await;
    harness.gateway.fail_next(GatewayOp::Add, "network down");
    harness.type_text("Buy milk").await;
    harness.press(KeyCode::Enter).await;

    assert_eq!(
        harness.app.snapshot.view.error_message.as_deref(),
        Some("network down")
    );
    assert!(harness.visible_names().is_empty());
    assert_eq!(harness.app.input.text(), "Buy milk");
}
