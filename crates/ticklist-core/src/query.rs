//! Read-side queries over a loaded collection
//!
//! Everything here is a pure function of the records passed in; the `Store`
//! wrappers load a fresh collection and delegate.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Priority, Todo};

/// Records whose category is exactly `name` (case-sensitive)
pub fn by_category(todos: &[Todo], name: &str) -> Vec<Todo> {
    todos
        .iter()
        .filter(|todo| todo.category == name)
        .cloned()
        .collect()
}

/// Records with the given priority
pub fn by_priority(todos: &[Todo], level: Priority) -> Vec<Todo> {
    todos
        .iter()
        .filter(|todo| todo.priority == level)
        .cloned()
        .collect()
}

/// Case-insensitive substring match against the text
///
/// Callers are expected to reject empty queries; an empty query matches
/// everything.
pub fn search(todos: &[Todo], query: &str) -> Vec<Todo> {
    let needle = query.to_lowercase();
    todos
        .iter()
        .filter(|todo| todo.text.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Pending records due before `today`
pub fn overdue(todos: &[Todo], today: NaiveDate) -> Vec<Todo> {
    todos
        .iter()
        .filter(|todo| todo.is_overdue(today))
        .cloned()
        .collect()
}

/// Distinct categories, sorted
pub fn categories(todos: &[Todo]) -> Vec<String> {
    let mut names: Vec<String> = todos.iter().map(|todo| todo.category.clone()).collect();
    names.sort();
    names.dedup();
    names
}

/// Aggregate counts over a collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Percentage of completed records, 0 when there are none
    pub completion_rate: f64,
    pub by_category: BTreeMap<String, usize>,
    /// Always holds all three priority levels
    pub by_priority: BTreeMap<Priority, usize>,
}

/// Compute [`Statistics`] for a collection
pub fn statistics(todos: &[Todo]) -> Statistics {
    let total = todos.len();
    let completed = todos.iter().filter(|todo| todo.completed).count();
    let completion_rate = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    };

    let mut by_category = BTreeMap::new();
    let mut by_priority: BTreeMap<Priority, usize> =
        Priority::ALL.iter().map(|&level| (level, 0)).collect();

    for todo in todos {
        *by_category.entry(todo.category.clone()).or_insert(0) += 1;
        *by_priority.entry(todo.priority).or_insert(0) += 1;
    }

    Statistics {
        total,
        completed,
        pending: total - completed,
        completion_rate,
        by_category,
        by_priority,
    }
}

/// Display orderings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Oldest first
    #[default]
    Created,
    /// High, Medium, Low
    Priority,
    /// Category name
    Category,
    /// Earliest due date first, undated last
    DueDate,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Created,
        SortKey::Priority,
        SortKey::Category,
        SortKey::DueDate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Created => "created",
            SortKey::Priority => "priority",
            SortKey::Category => "category",
            SortKey::DueDate => "due",
        }
    }

    /// The next ordering, wrapping around
    pub fn next(self) -> Self {
        match self {
            SortKey::Created => SortKey::Priority,
            SortKey::Priority => SortKey::Category,
            SortKey::Category => SortKey::DueDate,
            SortKey::DueDate => SortKey::Created,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" | "created_at" | "date" => Ok(SortKey::Created),
            "priority" => Ok(SortKey::Priority),
            "category" => Ok(SortKey::Category),
            "due" | "due_date" => Ok(SortKey::DueDate),
            other => Err(format!(
                "Unknown sort key '{}'. Use created, priority, category or due.",
                other
            )),
        }
    }
}

/// Sort records for display
///
/// The sort is stable; ties keep insertion order.
pub fn sort_todos(todos: &mut [Todo], key: SortKey) {
    match key {
        SortKey::Created => todos.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::Priority => todos.sort_by_key(|todo| todo.priority.rank()),
        SortKey::Category => todos.sort_by(|a, b| a.category.cmp(&b.category)),
        SortKey::DueDate => todos.sort_by(|a, b| compare_due(a.due_date, b.due_date)),
    }
}

fn compare_due(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
