//! Data models for ticklist
//!
//! Defines the todo record, its priority scale, and the input types used
//! to create and partially update records. Defaults for optional fields are
//! resolved here, once, when a record is built or deserialized.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Category assigned when none is given
pub const DEFAULT_CATEGORY: &str = "General";

/// Record identifier, assigned by the store
pub type TodoId = u64;

/// Importance of a todo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// The canonical levels, most important first
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort rank: High = 0, Medium = 1, Low = 2
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    /// Display name as stored on disk
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// The next level in High → Medium → Low → High order
    pub fn cycle(self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low => Priority::High,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a priority name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown priority '{0}'. Use high, medium or low.")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Parse a creation timestamp
///
/// RFC 3339 is what `save` writes. Files from older releases hold local
/// timestamps with no offset (`2024-01-02T03:04:05.123456`); those are read
/// as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid created_at timestamp '{}'", raw)))
}

/// A single task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    /// Unique identifier within the collection
    pub id: TodoId,
    /// Task description
    pub text: String,
    /// Whether the task is done
    #[serde(default)]
    pub completed: bool,
    /// When this todo was created; never changes afterwards
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
    /// Free-form grouping
    #[serde(default = "default_category")]
    pub category: String,
    /// Importance
    #[serde(default)]
    pub priority: Priority,
    /// Optional deadline
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl Todo {
    /// Create a todo with default metadata
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self::with_created_at(id, text, Utc::now())
    }

    /// Create a todo with an explicit creation time
    pub fn with_created_at(id: TodoId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at,
            category: default_category(),
            priority: Priority::default(),
            due_date: None,
        }
    }

    /// Build a record from caller-supplied fields
    pub fn from_new(id: TodoId, new: NewTodo) -> Self {
        Self {
            id,
            text: new.text.trim().to_string(),
            completed: false,
            created_at: Utc::now(),
            category: new.category,
            priority: new.priority,
            due_date: new.due_date,
        }
    }

    /// Whether the todo is pending and its due date lies before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    /// Merge the fields present in `patch`
    ///
    /// `id` and `created_at` are not part of a patch and so never change.
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(text) = patch.text {
            self.text = text.trim().to_string();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        match patch.due_date {
            DueDateChange::Keep => {}
            DueDateChange::Set(date) => self.due_date = Some(date),
            DueDateChange::Clear => self.due_date = None,
        }
    }
}

/// Parameters for adding a todo
#[derive(Debug, Clone, PartialEq)]
pub struct NewTodo {
    pub text: String,
    pub category: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl NewTodo {
    /// New todo text with default category, priority and no due date
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: default_category(),
            priority: Priority::default(),
            due_date: None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }
}

/// How an update treats the due date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DueDateChange {
    #[default]
    Keep,
    Set(NaiveDate),
    Clear,
}

/// Fields to change on an existing todo; unset fields keep their value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: DueDateChange,
}

impl TodoPatch {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = DueDateChange::Set(due_date);
        self
    }

    pub fn clear_due_date(mut self) -> Self {
        self.due_date = DueDateChange::Clear;
        self
    }

    /// True when applying this patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.completed.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.due_date == DueDateChange::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_todo_new_defaults() {
        let todo = Todo::new(1, "Buy milk");
        assert_eq!(todo.id, 1);
        assert_eq!(todo.text, "Buy milk");
        assert!(!todo.completed);
        assert_eq!(todo.category, "General");
        assert_eq!(todo.priority, Priority::Medium);
        assert!(todo.due_date.is_none());
    }

    #[test]
    fn test_from_new_trims_text() {
        let new = NewTodo::new("  Walk dog \n")
            .category("Home")
            .priority(Priority::High)
            .due_date(Some(date(2024, 5, 1)));
        let todo = Todo::from_new(7, new);

        assert_eq!(todo.id, 7);
        assert_eq!(todo.text, "Walk dog");
        assert_eq!(todo.category, "Home");
        assert_eq!(todo.priority, Priority::High);
        assert_eq!(todo.due_date, Some(date(2024, 5, 1)));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let json = r#"{"id": 3, "text": "Old entry", "created_at": "2024-01-02T03:04:05Z"}"#;
        let todo: Todo = serde_json::from_str(json).unwrap();

        assert_eq!(todo.id, 3);
        assert!(!todo.completed);
        assert_eq!(todo.category, DEFAULT_CATEGORY);
        assert_eq!(todo.priority, Priority::Medium);
        assert!(todo.due_date.is_none());
    }

    #[test]
    fn test_created_at_without_offset_reads_as_utc() {
        let json = r#"{"id": 1, "text": "Old", "created_at": "2024-01-02T03:04:05.123456"}"#;
        let todo: Todo = serde_json::from_str(json).unwrap();

        let expected = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, 123_456)
            .unwrap()
            .and_utc();
        assert_eq!(todo.created_at, expected);
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let utc = parse_timestamp("2024-01-02T03:04:05Z").unwrap();
        assert_eq!(parse_timestamp("2024-01-02T05:04:05+02:00"), Some(utc));
        assert_eq!(parse_timestamp("2024-01-02T03:04:05"), Some(utc));
        assert_eq!(parse_timestamp("2024-01-02 03:04:05"), Some(utc));
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-01-02").is_none());
    }

    #[test]
    fn test_invalid_created_at_is_rejected() {
        let json = r#"{"id": 1, "text": "Old", "created_at": "soon"}"#;
        let err = serde_json::from_str::<Todo>(json).unwrap_err();
        assert!(err.to_string().contains("created_at"));
    }

    #[test]
    fn test_serialized_field_names() {
        let mut todo = Todo::new(1, "Pay rent");
        todo.due_date = Some(date(2024, 2, 29));
        let value = serde_json::to_value(&todo).unwrap();

        for field in [
            "id",
            "text",
            "completed",
            "created_at",
            "category",
            "priority",
            "due_date",
        ] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(value["priority"], "Medium");
        assert_eq!(value["due_date"], "2024-02-29");
    }

    #[test]
    fn test_apply_patch_changes_only_given_fields() {
        let mut todo = Todo::new(5, "Write report");
        todo.due_date = Some(date(2024, 3, 1));
        let before = todo.clone();

        todo.apply(TodoPatch::default().priority(Priority::Low));

        assert_eq!(todo.priority, Priority::Low);
        assert_eq!(todo.id, before.id);
        assert_eq!(todo.text, before.text);
        assert_eq!(todo.completed, before.completed);
        assert_eq!(todo.created_at, before.created_at);
        assert_eq!(todo.category, before.category);
        assert_eq!(todo.due_date, before.due_date);
    }

    #[test]
    fn test_apply_patch_due_date_changes() {
        let mut todo = Todo::new(1, "File taxes");

        todo.apply(TodoPatch::default().due_date(date(2024, 4, 15)));
        assert_eq!(todo.due_date, Some(date(2024, 4, 15)));

        todo.apply(TodoPatch::default());
        assert_eq!(todo.due_date, Some(date(2024, 4, 15)));

        todo.apply(TodoPatch::default().clear_due_date());
        assert!(todo.due_date.is_none());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(TodoPatch::default().is_empty());
        assert!(!TodoPatch::default().completed(true).is_empty());
        assert!(!TodoPatch::default().clear_due_date().is_empty());
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("High".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!(" LOW ".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!("h".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_rank_and_cycle() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
        assert_eq!(Priority::High.cycle(), Priority::Medium);
        assert_eq!(Priority::Low.cycle(), Priority::High);
        assert_eq!(Priority::ALL.len(), 3);
    }

    #[test]
    fn test_is_overdue() {
        let today = date(2024, 6, 10);
        let mut todo = Todo::new(1, "Renew passport");
        assert!(!todo.is_overdue(today));

        todo.due_date = Some(date(2024, 6, 9));
        assert!(todo.is_overdue(today));

        todo.due_date = Some(today);
        assert!(!todo.is_overdue(today));

        todo.due_date = Some(date(2024, 6, 1));
        todo.completed = true;
        assert!(!todo.is_overdue(today));
    }
}
