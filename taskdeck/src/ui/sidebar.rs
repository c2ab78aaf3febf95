//! Sidebar rendering: filters, sort key, and collection statistics.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::App;
use crate::view::StatusFilter;

/// Render the sidebar with filter counts and statistics.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let counts = app.counts();
    let stats = app.stats();

    let filters = [
        (StatusFilter::All, counts.all),
        (StatusFilter::Active, counts.active),
        (StatusFilter::Completed, counts.completed),
    ];

    let mut lines: Vec<Line> = filters
        .iter()
        .map(|(filter, count)| {
            let label = format!(" {filter} ({count})");
            if *filter == app.query.filter {
                Line::from(Span::styled(label, theme::highlighted()))
            } else {
                Line::from(Span::styled(label, theme::normal()))
            }
        })
        .collect();

    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled(" Sort: ", theme::dimmed()),
        Span::styled(app.query.sort.to_string(), theme::normal()),
    ]));

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(" Stats", theme::bold())));
    lines.push(Line::from(Span::styled(
        format!(" done {}/{}", stats.completed, stats.total),
        theme::dimmed(),
    )));
    lines.push(Line::from(Span::styled(
        format!(" rate {}%", stats.completion_rate),
        theme::dimmed(),
    )));

    let block = Block::default()
        .title(Span::styled(
            "Filters",
            theme::panel_title(theme::SIDEBAR_TITLE),
        ))
        .borders(Borders::ALL)
        .border_style(theme::normal());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
