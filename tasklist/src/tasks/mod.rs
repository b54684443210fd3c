//! Task list state and the controller that mutates it.
//!
//! The controller holds the in-memory list mirrored from the store's
//! `tasks` collection, plus the transient form and search state. Every
//! mutation goes through a [`Gateway`](crate::gateway::Gateway) call first
//! and only touches local state once the store has accepted it.

pub mod controller;
pub mod view;

pub use controller::TaskListController;
pub use view::{TaskListSnapshot, ViewState, matches_search};

use thiserror::Error;

/// Errors that can occur during task operations.
///
/// These never escape the controller: each one is turned into the view's
/// error message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The draft task name is empty.
    #[error("You must enter a task.")]
    Validation,
    /// Save was requested while no task is being edited.
    #[error("no task is being edited")]
    NotEditing,
    /// The store rejected the operation; carries its message verbatim.
    #[error("{0}")]
    Persistence(String),
}

impl TaskError {
    /// Whether this error was raised before any store call was made.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation | Self::NotEditing)
    }
}
