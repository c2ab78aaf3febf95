//! Input line rendering for the search and new-task editors.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::{App, InputMode};

/// Render the active text editor with a block cursor.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let title = match app.mode {
        InputMode::Search => "Search",
        InputMode::NewTask => "New task",
        InputMode::Normal => return,
    };

    let chars: Vec<char> = app.input.chars().collect();
    let before: String = chars.iter().take(app.cursor).collect();
    let at_cursor = chars.get(app.cursor).copied().unwrap_or(' ');
    let after: String = chars.iter().skip(app.cursor + 1).collect();

    let line = Line::from(vec![
        Span::raw(before),
        Span::styled(at_cursor.to_string(), theme::selected()),
        Span::raw(after),
    ]);

    let block = Block::default()
        .title(Span::styled(title, theme::highlighted()))
        .borders(Borders::ALL)
        .border_style(theme::highlighted());

    frame.render_widget(Paragraph::new(line).block(block), area);
}
