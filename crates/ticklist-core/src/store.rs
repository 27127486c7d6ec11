//! Unified storage interface
//!
//! The `Store` is the entry point used by the front ends. It holds only the
//! configuration: every operation loads the full collection from disk,
//! works on that in-memory copy and, for mutations, writes the whole
//! collection back.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open()?;
//!
//! // Add data
//! let todo = store.add(NewTodo::new("Buy milk").priority(Priority::High))?;
//!
//! // Update or remove
//! store.set_completed(todo.id, true)?;
//! store.delete(todo.id)?;
//!
//! // Query
//! let stats = store.statistics()?;
//! ```
//!
//! ## Concurrency
//!
//! Mutations are read-modify-write over the entire file with no locking.
//! Running two writers (say the CLI and the TUI) against the same data
//! directory at once can silently drop one of their changes.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{NewTodo, Priority, Todo, TodoId, TodoPatch};
use crate::query::{self, Statistics};
use crate::storage::{JsonPersistence, Loaded};

/// Unified storage interface for ticklist
pub struct Store {
    /// Collection persistence handler
    persistence: JsonPersistence,
    /// Configuration
    config: Config,
}

impl Store {
    /// Open the store using the configuration file and environment
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(config))
    }

    /// Open the store with a specific configuration
    ///
    /// Nothing is read until the first operation.
    pub fn open_with_config(config: Config) -> Self {
        Self {
            persistence: JsonPersistence::new(config.clone()),
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the collection together with how it was obtained
    ///
    /// Front ends use this to warn when the collection is empty because the
    /// file was corrupt or the legacy import failed.
    pub fn load(&self) -> Result<Loaded> {
        self.persistence
            .load()
            .context("Failed to load todos")
    }

    /// All records in insertion order
    pub fn all(&self) -> Result<Vec<Todo>> {
        Ok(self.load()?.todos)
    }

    fn save(&self, todos: &[Todo]) -> Result<()> {
        self.persistence
            .save(todos)
            .context("Failed to save todos")
    }

    // ==================== Mutations ====================

    /// Add a new todo and return it with its assigned id
    ///
    /// The id is one more than the highest existing id, or 1 for an empty
    /// collection. Text is trimmed.
    pub fn add(&self, new: NewTodo) -> Result<Todo> {
        let mut todos = self.all()?;
        let id = next_id(&todos)?;
        let todo = Todo::from_new(id, new);

        todos.push(todo.clone());
        self.save(&todos)?;

        info!("Added todo {}", id);
        Ok(todo)
    }

    /// Merge `patch` into the first record with `id`
    ///
    /// Returns `false` when no record matches; nothing is written then.
    pub fn update(&self, id: TodoId, patch: TodoPatch) -> Result<bool> {
        let mut todos = self.all()?;

        let Some(todo) = todos.iter_mut().find(|todo| todo.id == id) else {
            debug!("Update of unknown todo {}", id);
            return Ok(false);
        };
        todo.apply(patch);

        self.save(&todos)?;
        info!("Updated todo {}", id);
        Ok(true)
    }

    /// Mark a todo done or not done
    pub fn set_completed(&self, id: TodoId, completed: bool) -> Result<bool> {
        self.update(id, TodoPatch::default().completed(completed))
    }

    /// Remove the first record with `id`
    ///
    /// Returns `false` when no record matches; nothing is written then.
    pub fn delete(&self, id: TodoId) -> Result<bool> {
        let mut todos = self.all()?;

        let Some(index) = todos.iter().position(|todo| todo.id == id) else {
            debug!("Delete of unknown todo {}", id);
            return Ok(false);
        };
        todos.remove(index);

        self.save(&todos)?;
        info!("Deleted todo {}", id);
        Ok(true)
    }

    // ==================== Queries ====================

    /// Get a todo by id
    pub fn get_by_id(&self, id: TodoId) -> Result<Option<Todo>> {
        Ok(self.all()?.into_iter().find(|todo| todo.id == id))
    }

    /// Todos in a category (exact, case-sensitive)
    pub fn by_category(&self, name: &str) -> Result<Vec<Todo>> {
        Ok(query::by_category(&self.all()?, name))
    }

    /// Todos with a priority
    pub fn by_priority(&self, level: Priority) -> Result<Vec<Todo>> {
        Ok(query::by_priority(&self.all()?, level))
    }

    /// Case-insensitive substring search on the text
    pub fn search(&self, query: &str) -> Result<Vec<Todo>> {
        Ok(query::search(&self.all()?, query))
    }

    /// Pending todos due before `today`
    pub fn overdue(&self, today: NaiveDate) -> Result<Vec<Todo>> {
        Ok(query::overdue(&self.all()?, today))
    }

    /// Distinct categories in use
    pub fn categories(&self) -> Result<Vec<String>> {
        Ok(query::categories(&self.all()?))
    }

    /// Counts and histograms over the whole collection
    pub fn statistics(&self) -> Result<Statistics> {
        Ok(query::statistics(&self.all()?))
    }
}

/// Id for the next record: max + 1, or 1 when empty
fn next_id(todos: &[Todo]) -> Result<TodoId> {
    match todos.iter().map(|todo| todo.id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .context("Todo id space exhausted; no id above the current maximum is free"),
    }
}
