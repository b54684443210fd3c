//! Add/edit form rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{input_line, theme};
use crate::app::{App, PanelFocus};

/// Render the form: error line, input box and hint.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus == PanelFocus::Form;
    let edit_mode = app.snapshot.view.edit_mode;

    let (title, title_color, hint) = if edit_mode {
        ("Edit Task", theme::EDIT_TITLE, "Enter: Save | Esc: Cancel")
    } else {
        ("Add Task", theme::ADD_TITLE, "Enter: Add")
    };

    let outer = Block::default()
        .title(Span::styled(title, theme::panel_title(title_color)))
        .borders(Borders::ALL)
        .border_style(theme::border(is_focused));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Error
            Constraint::Length(3), // Input
            Constraint::Length(1), // Hint
            Constraint::Min(0),
        ])
        .split(inner);

    if let Some(error) = &app.snapshot.view.error_message {
        let paragraph = Paragraph::new(Line::from(Span::styled(error.as_str(), theme::error())))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, chunks[0]);
    }

    let input = Paragraph::new(input_line(&app.input, is_focused, "Enter a task..."))
        .block(Block::default().borders(Borders::ALL).border_style(theme::dimmed()));
    frame.render_widget(input, chunks[1]);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(hint, theme::dimmed()))),
        chunks[2],
    );
}
