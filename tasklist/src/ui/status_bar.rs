//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, PanelFocus};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.confirm_delete.is_some() {
        "y: delete | n/Esc: keep"
    } else {
        match app.focus {
            PanelFocus::Form => "Enter: submit | Tab: switch panel | Esc: cancel/quit",
            PanelFocus::Search => "Type to filter | Tab: switch panel | Esc: quit",
            PanelFocus::List => "↑↓/jk: navigate | e: edit | d: delete | Tab: switch panel",
        }
    };

    let (dot_color, status_text) = if app.is_connected {
        (theme::SUCCESS, format!("Connected to {}", app.connection_info))
    } else if app.connection_info.is_empty() {
        (theme::DISCONNECTED, "Disconnected".to_string())
    } else {
        (theme::WARNING, app.connection_info.clone())
    };

    let mut spans = vec![
        Span::styled(concat!("Tasklist v", env!("CARGO_PKG_VERSION")), theme::bold()),
        Span::raw(" | "),
        Span::styled("●", theme::normal().fg(dot_color)),
        Span::raw(format!(" {status_text}")),
    ];
    if let Some(notice) = &app.notice {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(notice.as_str(), theme::normal().fg(theme::WARNING)));
    }
    spans.push(Span::raw(" | "));
    spans.push(Span::styled(help_text, theme::dimmed()));

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
