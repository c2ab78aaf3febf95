//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, InputMode};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match app.mode {
        InputMode::Normal => {
            "n: new | /: search | Space: toggle | d: delete | f/s: filter/sort | r: refresh | q: quit"
        }
        InputMode::Search => "Enter: done | Esc: close | type to filter",
        InputMode::NewTask => "Enter: add task | Esc: cancel",
    };

    let (dot_color, backend) = if app.backend_label == "offline" {
        (theme::WARNING, "offline demo".to_string())
    } else {
        (theme::SUCCESS, app.backend_label.clone())
    };

    let mut spans = vec![
        Span::styled("TaskDeck v0.1.0", theme::bold()),
        Span::raw(" | "),
        Span::styled("●", theme::normal().fg(dot_color)),
        Span::raw(format!(" {backend}")),
        Span::raw(" | "),
    ];

    if let Some(notice) = &app.notice {
        spans.push(Span::styled(
            notice.text.clone(),
            theme::normal().fg(theme::WARNING),
        ));
    } else {
        spans.push(Span::styled(help_text, theme::dimmed()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
