//! Task list panel rendering (search box + list).

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::{input_line, theme};
use crate::app::{App, PanelFocus};

/// Shown when the collection holds no tasks.
pub const EMPTY_LIST_TEXT: &str = "No tasks scheduled.";

/// Shown when tasks exist but none match the search.
pub const NO_MATCHES_TEXT: &str = "No matching tasks.";

/// Render the task list panel.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    render_search(frame, chunks[0], app);
    render_list(frame, chunks[1], app);
}

/// Render the search box.
fn render_search(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus == PanelFocus::Search;
    let line = input_line(&app.search, is_focused, "Search...");

    let block = Block::default()
        .title("Search")
        .borders(Borders::ALL)
        .border_style(theme::border(is_focused));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Render the task list, or a placeholder line.
fn render_list(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus == PanelFocus::List;

    let block = Block::default()
        .title(Span::styled(
            "Task List",
            theme::panel_title(theme::LIST_TITLE),
        ))
        .borders(Borders::ALL)
        .border_style(theme::border(is_focused));

    let placeholder = if !app.snapshot.loaded {
        Some("Loading...")
    } else if app.snapshot.is_empty() {
        Some(EMPTY_LIST_TEXT)
    } else if app.snapshot.visible.is_empty() {
        Some(NO_MATCHES_TEXT)
    } else {
        None
    };

    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(Line::from(Span::styled(text, theme::dimmed()))).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let editing = app.snapshot.view.editing_id.as_ref();
    let items: Vec<ListItem> = app
        .snapshot
        .visible
        .iter()
        .map(|task| {
            let marker = if Some(&task.id) == editing { "✎ " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, theme::normal().fg(theme::EDIT_TITLE)),
                Span::styled(task.name.as_str(), theme::normal()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::selected());

    let mut state = ListState::default();
    if is_focused {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
