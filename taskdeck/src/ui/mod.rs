//! Terminal UI rendering.

pub mod editor;
pub mod sidebar;
pub mod status_bar;
pub mod task_panel;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::{App, InputMode};

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    // Main layout: content, optional editor line, status bar at bottom
    let editing = app.mode != InputMode::Normal;
    let mut constraints = vec![Constraint::Min(3)];
    if editing {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Length(1));

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    let content_area = main_chunks[0];
    let status_area = main_chunks[main_chunks.len() - 1];

    // Two-column layout for content
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28), // Sidebar
            Constraint::Percentage(72), // Tasks
        ])
        .split(content_area);

    sidebar::render(frame, content_chunks[0], app);
    task_panel::render(frame, content_chunks[1], app);

    if editing {
        editor::render(frame, main_chunks[1], app);
    }

    status_bar::render(frame, status_area, app);
}
