//! Command dispatch between the TUI and the task list controller.
//!
//! The controller runs in its own tokio task, which owns it exclusively.
//! The synchronous TUI loop sends [`Command`]s and drains
//! [`ControllerEvent`]s on each tick.
//!
//! ```text
//! TUI (main thread)  ←── ControllerEvent ───  controller task
//!                     ─── Command ─────────→
//! ```
//!
//! Commands are handled one at a time. Each store-backed command awaits
//! its gateway call and then updates the controller state before the next
//! command is read, so no two operations interleave.

use tasklist_proto::document::DocumentId;
use tasklist_proto::task::Task;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::gateway::Gateway;
use crate::tasks::{TaskListController, TaskListSnapshot};

/// Commands sent from the TUI main loop to the controller task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the draft with text the user typed.
    SetDraft {
        /// New draft text.
        text: String,
        /// Draft revision the edit was made against.
        revision: u64,
    },
    /// Replace the search term.
    SetSearchTerm(String),
    /// Submit the form (add, or save in edit mode).
    Submit,
    /// Start editing a task.
    BeginEdit(Task),
    /// Leave edit mode.
    CancelEdit,
    /// Delete the task with this id.
    Delete(DocumentId),
    /// Stop the controller task.
    Shutdown,
}

/// Events sent from the controller task to the TUI main loop.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// Controller state after the initial load or a command.
    Snapshot(TaskListSnapshot),
}

/// Spawns the controller task and returns its channel handles.
///
/// The task loads the task list first, publishes a snapshot, then handles
/// commands until [`Command::Shutdown`] arrives or every sender is dropped.
pub fn spawn_controller<G>(
    controller: TaskListController<G>,
    channel_capacity: usize,
) -> (
    mpsc::Sender<Command>,
    mpsc::Receiver<ControllerEvent>,
    JoinHandle<()>,
)
where
    G: Gateway + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(channel_capacity);
    let (evt_tx, evt_rx) = mpsc::channel(channel_capacity);
    let handle = tokio::spawn(command_loop(controller, cmd_rx, evt_tx));
    (cmd_tx, evt_rx, handle)
}

/// Background task: load, then apply commands in arrival order.
async fn command_loop<G: Gateway>(
    mut controller: TaskListController<G>,
    mut cmd_rx: mpsc::Receiver<Command>,
    evt_tx: mpsc::Sender<ControllerEvent>,
) {
    // Load errors are already in the view state.
    let _ = controller.load().await;
    if evt_tx
        .send(ControllerEvent::Snapshot(controller.snapshot()))
        .await
        .is_err()
    {
        return;
    }

    while let Some(cmd) = cmd_rx.recv().await {
        if !apply(&mut controller, cmd).await {
            tracing::info!("controller task shutting down");
            break;
        }
        if evt_tx
            .send(ControllerEvent::Snapshot(controller.snapshot()))
            .await
            .is_err()
        {
            // TUI dropped; exit.
            break;
        }
    }
}

/// Applies one command. Returns `false` on shutdown.
async fn apply<G: Gateway>(controller: &mut TaskListController<G>, cmd: Command) -> bool {
    match cmd {
        Command::SetDraft { text, revision } => {
            controller.apply_draft_edit(text, revision);
        }
        Command::SetSearchTerm(term) => controller.set_search_term(term),
        Command::Submit => {
            if let Err(e) = controller.submit().await {
                if e.is_validation() {
                    tracing::debug!(err = %e, "submit rejected");
                } else {
                    tracing::warn!(err = %e, "submit failed");
                }
            }
        }
        Command::BeginEdit(task) => controller.begin_edit(&task),
        Command::CancelEdit => controller.cancel_edit(),
        Command::Delete(id) => {
            if let Err(e) = controller.delete(&id).await {
                tracing::warn!(%id, err = %e, "delete failed");
            }
        }
        Command::Shutdown => return false,
    }
    true
}
