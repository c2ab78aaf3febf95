//! Task list rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use taskdeck_proto::{Priority, Task};

use super::theme;
use crate::app::App;

/// Render the filtered, sorted task list.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let visible = app.visible();

    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let is_selected = idx == app.selected;
            let line = task_line(task, &app.date_format);
            let style = if is_selected {
                theme::selected()
            } else if task.completed {
                theme::dimmed()
            } else {
                theme::normal()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let title = if app.query.search.is_empty() {
        format!("Tasks ({})", visible.len())
    } else {
        format!("Tasks ({}) /{}", visible.len(), app.query.search)
    };

    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::TASKS_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::normal());

    let list = List::new(items).block(block);

    frame.render_widget(list, area);
}

fn task_line<'a>(task: &'a Task, date_format: &str) -> Line<'a> {
    let checkbox = if task.completed { "[✓]" } else { "[ ]" };
    let meta = if task.completed {
        theme::dimmed()
    } else {
        theme::normal()
    };

    let mut spans = vec![Span::raw(checkbox), Span::raw(" ")];

    if let Some(priority) = task.priority {
        spans.push(Span::styled(
            priority_marker(priority),
            meta.fg(theme::priority_color(priority)),
        ));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::raw(task.title.as_str()));

    if let Some(category) = &task.category {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!("#{category}"), theme::dimmed()));
    }

    if let Some(due) = task.due_date {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("({})", due.format(date_format)),
            theme::dimmed(),
        ));
    }

    Line::from(spans)
}

const fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "!!",
        Priority::Medium => " !",
        Priority::Low => " ·",
    }
}
