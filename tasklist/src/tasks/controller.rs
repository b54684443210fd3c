//! Task list controller: CRUD through a gateway plus form/search state.
//!
//! `TaskListController` owns the sorted task list and the [`ViewState`].
//! Store-backed operations call the gateway first and update local state
//! only on success; on failure the list is left as it was and the store's
//! message becomes the view's error message.

use std::collections::HashSet;

use tasklist_proto::document::DocumentId;
use tasklist_proto::task::{TASKS_COLLECTION, Task};

use super::TaskError;
use super::view::{TaskListSnapshot, ViewState, matches_search};
use crate::gateway::Gateway;

/// Owns the task list and drives it through a [`Gateway`].
pub struct TaskListController<G> {
    /// Persistence backend.
    gateway: G,
    /// Tasks sorted by name, unique by id.
    tasks: Vec<Task>,
    /// Form and search state.
    view: ViewState,
    /// Whether [`load`](Self::load) has run.
    loaded: bool,
}

impl<G: Gateway> TaskListController<G> {
    /// Creates a controller with an empty list.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            tasks: Vec::new(),
            view: ViewState::default(),
            loaded: false,
        }
    }

    /// Creates a controller pre-populated with `tasks`, as if loaded.
    #[must_use]
    pub fn with_tasks(gateway: G, tasks: Vec<Task>) -> Self {
        let mut controller = Self::new(gateway);
        controller.tasks = sorted_unique(tasks);
        controller.loaded = true;
        controller
    }

    /// Fetches the `tasks` collection and replaces the list with it.
    ///
    /// Documents without a name are skipped. On failure the list is left
    /// empty and the error is shown.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Persistence`] if the store cannot be listed.
    pub async fn load(&mut self) -> Result<usize, TaskError> {
        let result = self
            .gateway
            .list_collection(TASKS_COLLECTION)
            .await
            .into_result();
        self.loaded = true;

        let documents = match result {
            Ok(documents) => documents,
            Err(error) => {
                tracing::warn!(%error, "failed to load tasks");
                return self.record(Err(TaskError::Persistence(error)));
            }
        };

        let tasks = documents
            .into_iter()
            .filter_map(|doc| match Task::from_document(doc) {
                Ok(task) => Some(task),
                Err(e) => {
                    tracing::warn!(err = %e, "skipping malformed task document");
                    None
                }
            })
            .collect();
        self.tasks = sorted_unique(tasks);
        tracing::info!(count = self.tasks.len(), "tasks loaded");
        Ok(self.tasks.len())
    }

    /// Clears the previous error and checks that the draft is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] if the draft is empty.
    pub fn validate_draft(&mut self) -> Result<(), TaskError> {
        self.view.error_message = None;
        if self.view.draft_name.is_empty() {
            return Err(TaskError::Validation);
        }
        Ok(())
    }

    /// Creates a task from the draft.
    ///
    /// On success the task is inserted at its sorted position and the draft
    /// is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] for an empty draft (the gateway is
    /// not called) or [`TaskError::Persistence`] if the store rejects it.
    pub async fn add(&mut self) -> Result<Task, TaskError> {
        let result = self.try_add().await;
        self.record(result)
    }

    async fn try_add(&mut self) -> Result<Task, TaskError> {
        self.validate_draft()?;
        let name = self.view.draft_name.clone();
        let id = self
            .gateway
            .add_document(TASKS_COLLECTION, Task::fields(&name))
            .await
            .into_result()
            .map_err(TaskError::Persistence)?;

        let task = Task::new(id, name);
        let at = self.tasks.partition_point(|t| t.name <= task.name);
        self.tasks.insert(at, task.clone());
        self.rewrite_draft(String::new());
        tracing::debug!(id = %task.id, "task added");
        Ok(task)
    }

    /// Renames the task being edited to the draft and leaves edit mode.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] for an empty draft,
    /// [`TaskError::NotEditing`] when no task is being edited, or
    /// [`TaskError::Persistence`] if the store rejects the update. In every
    /// error case edit mode is kept.
    pub async fn save(&mut self) -> Result<Task, TaskError> {
        let result = self.try_save().await;
        self.record(result)
    }

    async fn try_save(&mut self) -> Result<Task, TaskError> {
        self.validate_draft()?;
        let id = self.view.editing_id.clone().ok_or(TaskError::NotEditing)?;
        let name = self.view.draft_name.clone();
        self.gateway
            .update_document(TASKS_COLLECTION, &id, Task::fields(&name))
            .await
            .into_result()
            .map_err(TaskError::Persistence)?;

        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.name.clone_from(&name);
            self.tasks.sort_by(|a, b| a.name.cmp(&b.name));
        } else {
            tracing::warn!(%id, "saved task is no longer in the list");
        }
        self.leave_edit_mode();
        tracing::debug!(%id, "task saved");
        Ok(Task::new(id, name))
    }

    /// Deletes a task. No validation is done and the error message is not
    /// cleared first.
    ///
    /// Deleting the task being edited also leaves edit mode.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Persistence`] if the store rejects the delete.
    pub async fn delete(&mut self, id: &DocumentId) -> Result<(), TaskError> {
        let result = self
            .gateway
            .delete_document(TASKS_COLLECTION, id)
            .await
            .into_result()
            .map_err(TaskError::Persistence);
        self.record(result)?;

        self.tasks.retain(|t| t.id != *id);
        if self.view.editing_id.as_ref() == Some(id) {
            self.cancel_edit();
        }
        tracing::debug!(%id, "task deleted");
        Ok(())
    }

    /// Submits the form: saves in edit mode, adds otherwise.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add) and [`save`](Self::save).
    pub async fn submit(&mut self) -> Result<Task, TaskError> {
        if self.view.edit_mode {
            self.save().await
        } else {
            self.add().await
        }
    }
}

impl<G> TaskListController<G> {
    /// Enters edit mode for `task`, loading its name into the draft.
    pub fn begin_edit(&mut self, task: &Task) {
        self.view.edit_mode = true;
        self.view.editing_id = Some(task.id.clone());
        self.rewrite_draft(task.name.clone());
    }

    /// Leaves edit mode, clearing the draft and any error.
    pub fn cancel_edit(&mut self) {
        self.view.error_message = None;
        self.leave_edit_mode();
    }

    /// Replaces the draft text.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.view.draft_name = text.into();
    }

    /// Replaces the draft text if `revision` is current.
    ///
    /// Returns `false` and leaves the draft alone when the edit was made
    /// against a draft the controller has since rewritten.
    pub fn apply_draft_edit(&mut self, text: impl Into<String>, revision: u64) -> bool {
        if revision != self.view.draft_revision {
            tracing::debug!(
                revision,
                current = self.view.draft_revision,
                "dropping stale draft edit"
            );
            return false;
        }
        self.set_draft(text);
        true
    }

    /// Sets the list filter.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.view.search_term = term.into();
    }

    /// Tasks whose name contains the search term, ignoring case.
    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> {
        let term = self.view.search_term.as_str();
        self.tasks.iter().filter(move |t| matches_search(&t.name, term))
    }

    /// All tasks, sorted by name.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Current form and search state.
    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    /// The persistence backend.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Whether the initial load has run.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Copies the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> TaskListSnapshot {
        TaskListSnapshot {
            tasks: self.tasks.clone(),
            visible: self.visible_tasks().cloned().collect(),
            view: self.view.clone(),
            loaded: self.loaded,
        }
    }

    fn leave_edit_mode(&mut self) {
        self.view.edit_mode = false;
        self.view.editing_id = None;
        self.rewrite_draft(String::new());
    }

    /// Sets the draft on the controller's behalf, invalidating in-flight
    /// edits made against the old text.
    fn rewrite_draft(&mut self, text: String) {
        self.view.draft_name = text;
        self.view.draft_revision = self.view.draft_revision.wrapping_add(1);
    }

    /// Shows the error of a failed operation.
    fn record<T>(&mut self, result: Result<T, TaskError>) -> Result<T, TaskError> {
        if let Err(e) = &result {
            self.view.error_message = Some(e.to_string());
        }
        result
    }
}

/// Sorts by name (stable) and drops later duplicates of an id.
fn sorted_unique(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    let mut tasks: Vec<Task> = tasks
        .into_iter()
        .filter(|t| {
            let fresh = seen.insert(t.id.clone());
            if !fresh {
                tracing::warn!(id = %t.id, "duplicate task id, keeping first");
            }
            fresh
        })
        .collect();
    tasks.sort_by(|a, b| a.name.cmp(&b.name));
    tasks
}
