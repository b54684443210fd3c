//! Transient view state and the snapshot handed to rendering.

use tasklist_proto::document::DocumentId;
use tasklist_proto::task::Task;

/// Form and search state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Text currently in the form input.
    pub draft_name: String,
    /// Whether the form commits to update rather than create.
    pub edit_mode: bool,
    /// Id of the task being edited; set iff `edit_mode`.
    pub editing_id: Option<DocumentId>,
    /// Message from the last failed validation or store call.
    pub error_message: Option<String>,
    /// Case-insensitive filter applied to the list.
    pub search_term: String,
    /// Bumped whenever the controller itself rewrites `draft_name`.
    ///
    /// Draft edits tagged with an older revision are stale and dropped.
    pub draft_revision: u64,
}

/// Whether `name` matches the search `term`.
///
/// Matching is a case-insensitive substring test; an empty term matches
/// every name.
#[must_use]
pub fn matches_search(name: &str, term: &str) -> bool {
    term.is_empty() || name.to_lowercase().contains(&term.to_lowercase())
}

/// Immutable copy of the controller state, produced after every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListSnapshot {
    /// Every task, sorted by name.
    pub tasks: Vec<Task>,
    /// The tasks matching the current search term, in list order.
    pub visible: Vec<Task>,
    /// Form and search state.
    pub view: ViewState,
    /// Whether the initial load has finished (successfully or not).
    pub loaded: bool,
}

impl TaskListSnapshot {
    /// Whether the underlying collection holds no tasks at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Position of a task in the visible list.
    #[must_use]
    pub fn visible_position(&self, id: &DocumentId) -> Option<usize> {
        self.visible.iter().position(|t| t.id == *id)
    }
}
