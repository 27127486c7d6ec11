//! Application state and logic

use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};

use ticklist_core::query::{self, SortKey, Statistics};
use ticklist_core::{NewTodo, Store, Todo, TodoId, TodoPatch};

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Typing the text of a new todo (after pressing a)
    Add,
    /// Live search (after pressing /)
    Search,
}

/// Top-level page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Todos,
    Stats,
}

/// Which pane has focus on the todos page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Filters,
    Items,
    Detail,
}

impl ActivePane {
    /// Move to the next pane (wrapping)
    pub fn next(self) -> Self {
        match self {
            ActivePane::Filters => ActivePane::Items,
            ActivePane::Items => ActivePane::Detail,
            ActivePane::Detail => ActivePane::Filters,
        }
    }

    /// Move to the previous pane (wrapping)
    pub fn prev(self) -> Self {
        match self {
            ActivePane::Filters => ActivePane::Detail,
            ActivePane::Items => ActivePane::Filters,
            ActivePane::Detail => ActivePane::Items,
        }
    }
}

/// Filter options in the left pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    Pending,
    Completed,
    Overdue,
    Category(String),
}

impl Filter {
    fn matches(&self, todo: &Todo, today: NaiveDate) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !todo.completed,
            Filter::Completed => todo.completed,
            Filter::Overdue => todo.is_overdue(today),
            Filter::Category(name) => &todo.category == name,
        }
    }
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Visible page
    pub page: Page,
    /// Current input mode
    pub input_mode: InputMode,
    /// Text being typed in add/search mode
    pub input: String,
    /// Cursor position in `input`, in chars
    pub cursor: usize,
    /// Which pane has focus
    pub active_pane: ActivePane,
    /// Fixed filters followed by one per category
    pub filters: Vec<Filter>,
    /// Currently selected filter index
    pub filter_index: usize,
    /// Every todo, in file order
    pub all_todos: Vec<Todo>,
    /// Todos shown in the list (filtered, searched, sorted)
    pub todos: Vec<Todo>,
    /// Currently selected todo index
    pub todo_index: usize,
    /// Current ordering of the list
    pub sort: SortKey,
    /// Active search text
    pub search_text: String,
    /// Statistics over the whole collection
    pub stats: Statistics,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Scroll offset for detail pane
    pub detail_scroll: u16,
    /// Todo waiting for a second `d` to confirm deletion
    pub pending_delete: Option<TodoId>,
    /// Date used for overdue checks
    pub today: NaiveDate,
}

impl App {
    /// Create a new app with data from store
    ///
    /// A degraded load (corrupt file, failed import) becomes the first
    /// status message.
    pub fn new(store: &Store) -> anyhow::Result<Self> {
        let loaded = store.load()?;

        let mut app = Self {
            should_quit: false,
            page: Page::Todos,
            input_mode: InputMode::Normal,
            input: String::new(),
            cursor: 0,
            active_pane: ActivePane::Items,
            filters: Vec::new(),
            filter_index: 0,
            all_todos: Vec::new(),
            todos: Vec::new(),
            todo_index: 0,
            sort: SortKey::default(),
            search_text: String::new(),
            stats: query::statistics(&[]),
            status_message: None,
            status_message_time: None,
            show_help: false,
            detail_scroll: 0,
            pending_delete: None,
            today: Local::now().date_naive(),
        };

        let warning = loaded.warning();
        app.set_todos(loaded.todos);
        if let Some(warning) = warning {
            app.set_status(warning);
        }

        Ok(app)
    }

    /// Reload from the store and re-apply the current view
    pub fn refresh(&mut self, store: &Store) -> anyhow::Result<()> {
        let todos = store.all()?;
        self.set_todos(todos);
        Ok(())
    }

    fn set_todos(&mut self, todos: Vec<Todo>) {
        self.stats = query::statistics(&todos);
        self.all_todos = todos;
        self.rebuild_filters();
        self.apply_filter();
    }

    fn rebuild_filters(&mut self) {
        let selected = self.current_filter().cloned();

        let mut filters = vec![
            Filter::All,
            Filter::Pending,
            Filter::Completed,
            Filter::Overdue,
        ];
        filters.extend(
            query::categories(&self.all_todos)
                .into_iter()
                .map(Filter::Category),
        );
        self.filters = filters;

        // Keep the same filter selected; fall back to All if its category is gone
        self.filter_index = selected
            .and_then(|f| self.filters.iter().position(|x| *x == f))
            .unwrap_or(0);
    }

    /// Get the currently selected filter
    pub fn current_filter(&self) -> Option<&Filter> {
        self.filters.get(self.filter_index)
    }

    /// Rebuild the visible list from the selected filter, search text and sort
    pub fn apply_filter(&mut self) {
        let filter = self.current_filter().cloned().unwrap_or(Filter::All);
        let today = self.today;

        let mut todos: Vec<Todo> = self
            .all_todos
            .iter()
            .filter(|todo| filter.matches(todo, today))
            .cloned()
            .collect();
        if !self.search_text.is_empty() {
            todos = query::search(&todos, &self.search_text);
        }
        query::sort_todos(&mut todos, self.sort);
        self.todos = todos;

        // Clamp selection to new list bounds (preserve position when possible)
        if self.todos.is_empty() {
            self.todo_index = 0;
        } else {
            self.todo_index = self.todo_index.min(self.todos.len() - 1);
        }
    }

    /// Get the currently selected todo
    pub fn current_todo(&self) -> Option<&Todo> {
        self.todos.get(self.todo_index)
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Switch page
    pub fn show_page(&mut self, page: Page) {
        self.page = page;
    }

    /// Move selection up in the current pane
    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Filters => {
                if self.filter_index > 0 {
                    self.filter_index -= 1;
                    self.apply_filter();
                }
            }
            ActivePane::Items => {
                if self.todo_index > 0 {
                    self.todo_index -= 1;
                    self.detail_scroll = 0;
                }
            }
            ActivePane::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_sub(1);
            }
        }
    }

    /// Move selection down in the current pane
    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Filters => {
                if self.filter_index < self.filters.len().saturating_sub(1) {
                    self.filter_index += 1;
                    self.apply_filter();
                }
            }
            ActivePane::Items => {
                if self.todo_index < self.todos.len().saturating_sub(1) {
                    self.todo_index += 1;
                    self.detail_scroll = 0;
                }
            }
            ActivePane::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_add(1);
            }
        }
    }

    /// Move focus to the next pane
    pub fn next_pane(&mut self) {
        self.active_pane = self.active_pane.next();
    }

    /// Move focus to the previous pane
    pub fn prev_pane(&mut self) {
        self.active_pane = self.active_pane.prev();
    }

    /// Cycle the list ordering
    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
        self.apply_filter();
        self.set_status(format!("Sorted by {}", self.sort));
    }

    /// Enter add mode
    pub fn enter_add_mode(&mut self) {
        self.input_mode = InputMode::Add;
        self.input.clear();
        self.cursor = 0;
    }

    /// Enter search mode
    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Search;
        self.input = self.search_text.clone();
        self.cursor = self.input.chars().count();
    }

    /// Exit add/search mode
    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
        self.cursor = 0;
    }

    /// Drop the search and show the selected filter again
    pub fn clear_search(&mut self) {
        self.search_text.clear();
        self.apply_filter();
    }

    /// Insert character at cursor position
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.input.insert(at, c);
        self.cursor += 1;
        self.sync_search();
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.input.remove(at);
            self.sync_search();
        }
    }

    /// Move cursor left
    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right
    pub fn cursor_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    /// Search updates as you type
    fn sync_search(&mut self) {
        if self.input_mode == InputMode::Search {
            self.search_text = self.input.trim().to_string();
            self.apply_filter();
        }
    }

    /// Add a todo from the add-mode input
    pub fn submit_add(&mut self, store: &Store) -> anyhow::Result<()> {
        let text = self.input.trim().to_string();
        self.exit_input_mode();

        if text.is_empty() {
            self.set_status("Todo text cannot be empty.");
            return Ok(());
        }

        let todo = store.add(NewTodo::new(text))?;
        self.refresh(store)?;
        self.select(todo.id);
        self.set_status(format!("Added '{}'", todo.text));
        Ok(())
    }

    /// Flip the completed flag of the selected todo
    pub fn toggle_current(&mut self, store: &Store) -> anyhow::Result<()> {
        let Some(todo) = self.current_todo().cloned() else {
            return Ok(());
        };

        store.set_completed(todo.id, !todo.completed)?;
        self.refresh(store)?;
        self.set_status(if todo.completed {
            format!("Reopened '{}'", todo.text)
        } else {
            format!("Completed '{}'", todo.text)
        });
        Ok(())
    }

    /// Step the selected todo's priority High -> Medium -> Low -> High
    pub fn cycle_priority(&mut self, store: &Store) -> anyhow::Result<()> {
        let Some(todo) = self.current_todo().cloned() else {
            return Ok(());
        };

        let priority = todo.priority.cycle();
        store.update(todo.id, TodoPatch::default().priority(priority))?;
        self.refresh(store)?;
        self.select(todo.id);
        self.set_status(format!("Priority of '{}' is now {}", todo.text, priority));
        Ok(())
    }

    /// First `d` asks for confirmation, a second `d` on the same todo deletes it
    pub fn delete_current(&mut self, store: &Store) -> anyhow::Result<()> {
        let Some(todo) = self.current_todo().cloned() else {
            return Ok(());
        };

        if self.pending_delete != Some(todo.id) {
            self.pending_delete = Some(todo.id);
            self.set_status(format!("Press d again to delete '{}'", todo.text));
            return Ok(());
        }

        self.pending_delete = None;
        let saved_index = self.todo_index;
        store.delete(todo.id)?;
        self.refresh(store)?;
        if !self.todos.is_empty() {
            self.todo_index = saved_index.min(self.todos.len() - 1);
        }
        self.set_status(format!("Deleted '{}'", todo.text));
        Ok(())
    }

    /// Apply an edit made outside the TUI
    pub fn apply_patch(
        &mut self,
        store: &Store,
        id: TodoId,
        patch: TodoPatch,
    ) -> anyhow::Result<()> {
        if store.update(id, patch)? {
            self.refresh(store)?;
            self.select(id);
            self.set_status("Todo updated");
        } else {
            self.refresh(store)?;
            self.set_status("Todo no longer exists");
        }
        Ok(())
    }

    /// Move the selection onto `id` if it is visible
    fn select(&mut self, id: TodoId) {
        if let Some(index) = self.todos.iter().position(|t| t.id == id) {
            self.todo_index = index;
            self.detail_scroll = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use ticklist_core::{Config, Priority};

    fn setup() -> (TempDir, Store) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open_with_config(Config::with_data_dir(temp_dir.path()));
        (temp_dir, store)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.insert_char(c);
        }
    }

    #[test]
    fn test_active_pane_cycle() {
        assert_eq!(ActivePane::Filters.next(), ActivePane::Items);
        assert_eq!(ActivePane::Detail.next(), ActivePane::Filters);
        assert_eq!(ActivePane::Filters.prev(), ActivePane::Detail);
        assert_eq!(ActivePane::Items.prev(), ActivePane::Filters);
    }

    #[test]
    fn test_filters_include_categories() {
        let (_dir, store) = setup();
        store.add(NewTodo::new("Report").category("Work")).unwrap();
        store.add(NewTodo::new("Milk")).unwrap();

        let app = App::new(&store).unwrap();

        assert_eq!(app.filters.len(), 6);
        assert_eq!(app.filters[4], Filter::Category("General".to_string()));
        assert_eq!(app.filters[5], Filter::Category("Work".to_string()));
        assert_eq!(app.todos.len(), 2);
    }

    #[test]
    fn test_add_and_toggle() {
        let (_dir, store) = setup();
        let mut app = App::new(&store).unwrap();

        app.enter_add_mode();
        type_text(&mut app, "  Water plants ");
        app.submit_add(&store).unwrap();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.todos.len(), 1);
        assert_eq!(app.current_todo().unwrap().text, "Water plants");

        app.toggle_current(&store).unwrap();
        assert!(store.get_by_id(1).unwrap().unwrap().completed);
        assert_eq!(app.stats.completed, 1);
    }

    #[test]
    fn test_add_rejects_blank_text() {
        let (_dir, store) = setup();
        let mut app = App::new(&store).unwrap();

        app.enter_add_mode();
        type_text(&mut app, "   ");
        app.submit_add(&store).unwrap();

        assert!(store.all().unwrap().is_empty());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Todo text cannot be empty.")
        );
    }

    #[test]
    fn test_pending_filter_hides_completed() {
        let (_dir, store) = setup();
        store.add(NewTodo::new("Open")).unwrap();
        store.add(NewTodo::new("Closed")).unwrap();
        store.set_completed(2, true).unwrap();

        let mut app = App::new(&store).unwrap();
        app.active_pane = ActivePane::Filters;
        app.move_down();

        assert_eq!(app.current_filter(), Some(&Filter::Pending));
        assert_eq!(app.todos.len(), 1);
        assert_eq!(app.todos[0].text, "Open");
    }

    #[test]
    fn test_search_as_you_type() {
        let (_dir, store) = setup();
        store.add(NewTodo::new("Buy milk")).unwrap();
        store.add(NewTodo::new("Call mom")).unwrap();

        let mut app = App::new(&store).unwrap();
        app.enter_search_mode();
        type_text(&mut app, "MIL");
        assert_eq!(app.todos.len(), 1);

        app.delete_char();
        app.delete_char();
        app.delete_char();
        assert_eq!(app.todos.len(), 2);

        type_text(&mut app, "zzz");
        assert!(app.todos.is_empty());

        app.exit_input_mode();
        app.clear_search();
        assert_eq!(app.todos.len(), 2);
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let (_dir, store) = setup();
        store.add(NewTodo::new("Temp")).unwrap();
        let mut app = App::new(&store).unwrap();

        app.delete_current(&store).unwrap();
        assert_eq!(store.all().unwrap().len(), 1);

        app.delete_current(&store).unwrap();
        assert!(store.all().unwrap().is_empty());
        assert!(app.todos.is_empty());
    }

    #[test]
    fn test_cycle_priority_and_sort() {
        let (_dir, store) = setup();
        store.add(NewTodo::new("Low one").priority(Priority::Low)).unwrap();
        store.add(NewTodo::new("Mid one")).unwrap();
        let mut app = App::new(&store).unwrap();

        app.cycle_sort();
        assert_eq!(app.sort, SortKey::Priority);
        assert_eq!(app.todos[0].text, "Mid one");

        // Medium -> Low
        app.cycle_priority(&store).unwrap();
        assert_eq!(store.get_by_id(2).unwrap().unwrap().priority, Priority::Low);
        assert_eq!(app.current_todo().unwrap().id, 2);
    }

    #[test]
    fn test_corrupt_file_sets_status() {
        let (dir, store) = setup();
        std::fs::write(dir.path().join("todos.json"), "{ broken").unwrap();

        let app = App::new(&store).unwrap();

        assert!(app.todos.is_empty());
        assert!(app
            .status_message
            .as_deref()
            .unwrap()
            .contains("unreadable"));
    }

    #[test]
    fn test_insert_char_handles_multibyte() {
        let (_dir, store) = setup();
        let mut app = App::new(&store).unwrap();

        app.enter_add_mode();
        type_text(&mut app, "café");
        app.cursor_left();
        app.insert_char('x');
        assert_eq!(app.input, "cafxé");
        app.cursor_right();
        app.delete_char();
        assert_eq!(app.input, "cafx");
    }
}
