//! Application state and event handling.
//!
//! [`App`] owns the latest task snapshot, the active view query, and the
//! shortcut table. Key events resolve through the shortcut dispatcher
//! first; whatever requires the network comes back to the main loop as a
//! [`Command`] for dispatch to the sync engine, mirroring how store
//! events flow in through [`App::apply_event`].

use crossterm::event::{KeyCode, KeyEvent};

use taskdeck_proto::task::MAX_TITLE_LENGTH;
use taskdeck_proto::{Task, TaskDraft, TaskId, TaskPatch};

use crate::keys::{Binding, ShortcutSet};
use crate::store::{OpKind, StoreEvent};
use crate::view::{self, SortKey, StatusCounts, StatusFilter, TaskQuery, TaskStats};

/// How long a transient notice stays on screen, in UI ticks.
const NOTICE_TTL_TICKS: u16 = 60;

/// Which input surface currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Task list navigation (default).
    #[default]
    Normal,
    /// Editing the search text.
    Search,
    /// Entering a new task title.
    NewTask,
}

/// Actions the shortcut table resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Exit the application.
    Quit,
    /// Open the new-task editor.
    NewTask,
    /// Focus the search editor.
    FocusSearch,
    /// Re-fetch the collection.
    Refresh,
    /// Toggle completion of the selected task.
    ToggleDone,
    /// Delete the selected task.
    DeleteTask,
    /// Cycle the status filter.
    CycleFilter,
    /// Cycle the sort key.
    CycleSort,
    /// Move selection down.
    SelectNext,
    /// Move selection up.
    SelectPrev,
    /// Clear the search text.
    ClearSearch,
}

/// Network work requested by a key event, dispatched by the main loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a task.
    Create(TaskDraft),
    /// Apply a partial update.
    Update(TaskId, TaskPatch),
    /// Delete a task.
    Delete(TaskId),
    /// Re-fetch the full collection.
    Refresh,
}

/// A transient status-bar message.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Text shown in the status bar.
    pub text: String,
    ttl: u16,
}

/// Main application state.
pub struct App {
    /// Latest snapshot of the task collection.
    pub tasks: Vec<Task>,
    /// Active filter/search/sort.
    pub query: TaskQuery,
    /// Which input surface has focus.
    pub mode: InputMode,
    /// New-task/search editor contents.
    pub input: String,
    /// Cursor position in the editor (character index).
    pub cursor: usize,
    /// Selected row in the visible projection.
    pub selected: usize,
    /// Transient status message, if any.
    pub notice: Option<Notice>,
    /// Human-readable backend description for the status bar.
    pub backend_label: String,
    /// Due date display format (chrono format string).
    pub date_format: String,
    /// Whether the app should quit.
    pub should_quit: bool,
    shortcuts: ShortcutSet<Action>,
}

impl App {
    /// Creates an app with the default shortcut table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            query: TaskQuery::default(),
            mode: InputMode::Normal,
            input: String::new(),
            cursor: 0,
            selected: 0,
            notice: None,
            backend_label: "offline".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            should_quit: false,
            shortcuts: default_shortcuts(),
        }
    }

    /// Sets the initial filter and sort from configuration.
    #[must_use]
    pub fn with_query(mut self, filter: StatusFilter, sort: SortKey) -> Self {
        self.query.filter = filter;
        self.query.sort = sort;
        self
    }

    /// Swaps the active shortcut table.
    pub fn set_shortcuts(&mut self, bindings: Vec<Binding<Action>>) {
        self.shortcuts.replace(bindings);
    }

    /// The projection currently on screen.
    #[must_use]
    pub fn visible(&self) -> Vec<&Task> {
        view::project(&self.tasks, &self.query)
    }

    /// Per-status counts over the full collection.
    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        view::status_counts(&self.tasks)
    }

    /// Aggregate statistics over the full collection.
    #[must_use]
    pub fn stats(&self) -> TaskStats {
        view::stats(&self.tasks)
    }

    /// Id of the selected visible task, if any.
    #[must_use]
    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.visible().get(self.selected).map(|t| t.id)
    }

    /// Handles a key event; returns the network command it produced.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<Command> {
        let in_editor = self.mode != InputMode::Normal;
        let resolved = self
            .shortcuts
            .resolve(&key, in_editor)
            .map(|binding| (binding.action, binding.consume));

        if let Some((action, consume)) = resolved {
            let command = self.apply_action(action);
            if consume || !in_editor {
                return command;
            }
            // Non-consuming match while editing: the key also reaches
            // the editor, like an unsuppressed default action.
            return command.or_else(|| self.handle_editor_key(key));
        }

        match self.mode {
            InputMode::Normal => None,
            InputMode::Search | InputMode::NewTask => self.handle_editor_key(key),
        }
    }

    /// Applies a store event to local state.
    pub fn apply_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Tasks(snapshot) => {
                self.tasks = snapshot;
                self.clamp_selection();
            }
            StoreEvent::Confirmed(op) => match op {
                OpKind::Create => self.set_notice("Task added"),
                OpKind::Delete => self.set_notice("Task deleted"),
                OpKind::Update | OpKind::Fetch => {}
            },
            StoreEvent::Failed { op, message } => {
                self.set_notice(format!("{op} failed: {message}"));
            }
        }
    }

    /// Advances UI timers; call once per main-loop tick.
    pub fn tick(&mut self) {
        if let Some(notice) = &mut self.notice {
            notice.ttl = notice.ttl.saturating_sub(1);
            if notice.ttl == 0 {
                self.notice = None;
            }
        }
    }

    /// Shows a transient status message.
    pub fn set_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            ttl: NOTICE_TTL_TICKS,
        });
    }

    fn apply_action(&mut self, action: Action) -> Option<Command> {
        match action {
            Action::Quit => {
                self.should_quit = true;
                None
            }
            Action::NewTask => {
                self.mode = InputMode::NewTask;
                self.input.clear();
                self.cursor = 0;
                None
            }
            Action::FocusSearch => {
                self.mode = InputMode::Search;
                self.input.clone_from(&self.query.search);
                self.cursor = self.input.chars().count();
                None
            }
            Action::Refresh => Some(Command::Refresh),
            Action::ToggleDone => {
                let task = *self.visible().get(self.selected)?;
                Some(Command::Update(
                    task.id,
                    TaskPatch::completed(!task.completed),
                ))
            }
            Action::DeleteTask => self.selected_task_id().map(Command::Delete),
            Action::CycleFilter => {
                self.query.filter = self.query.filter.next();
                self.clamp_selection();
                None
            }
            Action::CycleSort => {
                self.query.sort = self.query.sort.next();
                None
            }
            Action::SelectNext => {
                let len = self.visible().len();
                if self.selected + 1 < len {
                    self.selected += 1;
                }
                None
            }
            Action::SelectPrev => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            Action::ClearSearch => {
                self.query.search.clear();
                self.clamp_selection();
                None
            }
        }
    }

    /// Text editing for the search and new-task surfaces.
    fn handle_editor_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => self.submit_editor(),
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.input.clear();
                self.cursor = 0;
                None
            }
            KeyCode::Char(c) => {
                let at = byte_index(&self.input, self.cursor);
                self.input.insert(at, c);
                self.cursor += 1;
                self.sync_editor();
                None
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = byte_index(&self.input, self.cursor);
                    self.input.remove(at);
                    self.sync_editor();
                }
                None
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Right => {
                if self.cursor < self.input.chars().count() {
                    self.cursor += 1;
                }
                None
            }
            KeyCode::Home => {
                self.cursor = 0;
                None
            }
            KeyCode::End => {
                self.cursor = self.input.chars().count();
                None
            }
            _ => None,
        }
    }

    /// Search edits apply live; the new-task editor applies on Enter.
    fn sync_editor(&mut self) {
        if self.mode == InputMode::Search {
            self.query.search.clone_from(&self.input);
            self.clamp_selection();
        }
    }

    fn submit_editor(&mut self) -> Option<Command> {
        match self.mode {
            InputMode::Search => {
                self.mode = InputMode::Normal;
                self.input.clear();
                self.cursor = 0;
                None
            }
            InputMode::NewTask => {
                let title = self.input.trim().to_string();
                if title.is_empty() {
                    return None;
                }
                if title.chars().count() > MAX_TITLE_LENGTH {
                    self.set_notice("Title too long");
                    return None;
                }
                self.mode = InputMode::Normal;
                self.input.clear();
                self.cursor = 0;
                Some(Command::Create(TaskDraft::new(title)))
            }
            InputMode::Normal => None,
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a character index into a byte offset.
fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .map(|(i, _)| i)
        .nth(char_index)
        .unwrap_or(s.len())
}

/// The default shortcut table.
///
/// Registration order is the tie-break for overlapping bindings.
fn default_shortcuts() -> ShortcutSet<Action> {
    let mut set = ShortcutSet::new();
    set.bind(Binding::new(KeyCode::Char('/'), Action::FocusSearch).consume());
    set.bind(Binding::new(KeyCode::Char('n'), Action::NewTask).consume());
    set.bind(Binding::new(KeyCode::Char('q'), Action::Quit).consume());
    set.bind(Binding::new(KeyCode::Char('c'), Action::Quit).ctrl().consume());
    set.bind(Binding::new(KeyCode::Char('r'), Action::Refresh).consume());
    set.bind(Binding::new(KeyCode::Char(' '), Action::ToggleDone).consume());
    set.bind(Binding::new(KeyCode::Char('d'), Action::DeleteTask).consume());
    set.bind(Binding::new(KeyCode::Char('f'), Action::CycleFilter).consume());
    set.bind(Binding::new(KeyCode::Char('s'), Action::CycleSort).consume());
    set.bind(Binding::new(KeyCode::Char('j'), Action::SelectNext));
    set.bind(Binding::new(KeyCode::Down, Action::SelectNext));
    set.bind(Binding::new(KeyCode::Char('k'), Action::SelectPrev));
    set.bind(Binding::new(KeyCode::Up, Action::SelectPrev));
    set.bind(Binding::new(KeyCode::Esc, Action::ClearSearch));
    set
}
