//! Terminal UI rendering.

pub mod form_panel;
pub mod status_bar;
pub mod task_panel;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::{App, TextInput};

/// Text of the delete confirmation prompt.
pub const CONFIRM_DELETE_TEXT: &str = "Delete this task? (y/n)";

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    // Create main layout with status bar at bottom
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let content_area = main_chunks[0];
    let status_area = main_chunks[1];

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(2, 3), // Task list
            Constraint::Ratio(1, 3), // Form
        ])
        .split(content_area);

    task_panel::render(frame, content_chunks[0], app);
    form_panel::render(frame, content_chunks[1], app);
    status_bar::render(frame, status_area, app);

    if let Some(task) = &app.confirm_delete {
        render_confirm(frame, content_area, &task.name);
    }
}

/// Render the delete confirmation popup centered in `area`.
fn render_confirm(frame: &mut Frame, area: Rect, task_name: &str) {
    let popup = centered(area, 44, 4);
    let block = Block::default()
        .title("Confirm")
        .borders(Borders::ALL)
        .style(theme::confirm_popup());
    let text = vec![
        Line::from(CONFIRM_DELETE_TEXT),
        Line::from(Span::styled(task_name, theme::dimmed())),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(text).block(block), popup);
}

/// A `width` x `height` rectangle centered in `area`, clipped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Build the display line for a text input, with a block cursor when focused.
fn input_line<'a>(input: &'a TextInput, is_focused: bool, placeholder: &'a str) -> Line<'a> {
    if input.text().is_empty() && !is_focused {
        return Line::from(Span::styled(placeholder, theme::dimmed()));
    }

    let mut display_text = input.text().to_string();
    if is_focused {
        let at = display_text
            .char_indices()
            .nth(input.cursor())
            .map_or(display_text.len(), |(i, _)| i);
        display_text.insert(at, '█');
    }
    Line::from(Span::styled(display_text, theme::normal()))
}
