//! Application state and event handling.
//!
//! `App` is the TUI's view of the world: the latest controller snapshot
//! plus the state that only the terminal cares about (focus, selection,
//! editable text buffers, pending confirmation). Key handling returns the
//! [`Command`] to forward to the controller task, if any.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tasklist_proto::task::Task;

use crate::dispatch::Command;
use crate::tasks::TaskListSnapshot;

/// Which panel is currently focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// The add/edit form (default).
    Form,
    /// The search box above the list.
    Search,
    /// The task list.
    List,
}

/// Single-line editable text with a character-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    /// Cursor position in characters, `0..=text.chars().count()`.
    cursor: usize,
}

impl TextInput {
    /// The current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replaces the text and moves the cursor to the end.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    /// Byte offset of the character at `char_index`.
    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    /// Insert a character at the cursor position.
    fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor. Returns whether text changed.
    fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    /// Delete the character under the cursor. Returns whether text changed.
    fn delete(&mut self) -> bool {
        if self.cursor >= self.text.chars().count() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    /// Handle an editing key. Returns whether the text changed.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => {
                self.insert(c);
                true
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.text.chars().count());
                false
            }
            KeyCode::Home => {
                self.cursor = 0;
                false
            }
            KeyCode::End => {
                self.cursor = self.text.chars().count();
                false
            }
            _ => false,
        }
    }
}

/// Main application state.
pub struct App {
    /// Latest controller state.
    pub snapshot: TaskListSnapshot,
    /// The form's input buffer.
    pub input: TextInput,
    /// The search box buffer.
    pub search: TextInput,
    /// Which panel is focused.
    pub focus: PanelFocus,
    /// Selected index into the visible tasks.
    pub selected: usize,
    /// Task awaiting delete confirmation.
    pub confirm_delete: Option<Task>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Whether the store connection is up.
    pub is_connected: bool,
    /// Human-readable description of the backend.
    pub connection_info: String,
    /// One-line notice shown in the status bar.
    pub notice: Option<String>,
    /// Draft revision the input buffer was last synced to.
    draft_revision: u64,
}

impl App {
    /// Create an app with nothing loaded yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshot: TaskListSnapshot::default(),
            input: TextInput::default(),
            search: TextInput::default(),
            focus: PanelFocus::Form,
            selected: 0,
            confirm_delete: None,
            should_quit: false,
            is_connected: false,
            connection_info: String::new(),
            notice: None,
            draft_revision: 0,
        }
    }

    /// Update the connection indicator.
    pub fn set_connection_status(&mut self, connected: bool, info: &str) {
        self.is_connected = connected;
        self.connection_info = info.to_string();
    }

    /// Show a notice in the status bar.
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// The currently selected visible task.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.snapshot.visible.get(self.selected)
    }

    /// Adopt a new controller snapshot.
    ///
    /// The input buffer is replaced only when the controller rewrote the
    /// draft; otherwise local typing stays as is. The selection follows the
    /// previously selected task when it is still visible.
    pub fn apply_snapshot(&mut self, snapshot: TaskListSnapshot) {
        if snapshot.view.draft_revision != self.draft_revision {
            self.draft_revision = snapshot.view.draft_revision;
            self.input.set(snapshot.view.draft_name.clone());
        }

        let selected_id = self.selected_task().map(|t| t.id.clone());
        self.snapshot = snapshot;
        self.selected = selected_id
            .and_then(|id| self.snapshot.visible_position(&id))
            .unwrap_or(self.selected)
            .min(self.snapshot.visible.len().saturating_sub(1));
    }

    /// Handle a key event, returning the command it produces, if any.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<Command> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        if self.confirm_delete.is_some() {
            return self.handle_confirm_key(key);
        }

        // Global shortcuts
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                if self.snapshot.view.edit_mode {
                    return Some(Command::CancelEdit);
                }
                self.should_quit = true;
                return None;
            }
            (KeyCode::Tab, KeyModifiers::SHIFT) | (KeyCode::BackTab, _) => {
                self.cycle_focus_backward();
                return None;
            }
            (KeyCode::Tab, _) => {
                self.cycle_focus_forward();
                return None;
            }
            _ => {}
        }

        // Focus-specific shortcuts
        match self.focus {
            PanelFocus::Form => self.handle_form_key(key),
            PanelFocus::Search => self.handle_search_key(key),
            PanelFocus::List => self.handle_list_key(key),
        }
    }

    /// Handle key event while the form is focused.
    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.code == KeyCode::Enter {
            return Some(Command::Submit);
        }
        if is_chord(key) {
            return None;
        }
        self.input.handle_key(key.code).then(|| Command::SetDraft {
            text: self.input.text().to_string(),
            revision: self.draft_revision,
        })
    }

    /// Handle key event while the search box is focused.
    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.code == KeyCode::Enter {
            self.focus = PanelFocus::List;
            return None;
        }
        if is_chord(key) {
            return None;
        }
        self.search
            .handle_key(key.code)
            .then(|| Command::SetSearchTerm(self.search.text().to_string()))
    }

    /// Handle key event while the list is focused.
    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.snapshot.visible.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let task = self.selected_task()?.clone();
                self.focus = PanelFocus::Form;
                Some(Command::BeginEdit(task))
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.confirm_delete = self.selected_task().cloned();
                None
            }
            _ => None,
        }
    }

    /// Handle key event while the delete confirmation is shown.
    fn handle_confirm_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Char('y' | 'Y') => self
                .confirm_delete
                .take()
                .map(|task| Command::Delete(task.id)),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                self.confirm_delete = None;
                None
            }
            _ => None,
        }
    }

    /// Cycle focus forward: Form -> Search -> List -> Form.
    const fn cycle_focus_forward(&mut self) {
        self.focus = match self.focus {
            PanelFocus::Form => PanelFocus::Search,
            PanelFocus::Search => PanelFocus::List,
            PanelFocus::List => PanelFocus::Form,
        };
    }

    /// Cycle focus backward: Form -> List -> Search -> Form.
    const fn cycle_focus_backward(&mut self) {
        self.focus = match self.focus {
            PanelFocus::Form => PanelFocus::List,
            PanelFocus::List => PanelFocus::Search,
            PanelFocus::Search => PanelFocus::Form,
        };
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// A character typed with Ctrl or Alt held. These never insert text.
/// AltGr arrives as Ctrl+Alt and still types its character.
fn is_chord(key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    matches!(key.code, KeyCode::Char(_)) && (ctrl != alt)
}
