//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use ticklist_core::{Priority, Statistics, Todo};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single todo with all fields
    pub fn print_todo(&self, todo: &Todo) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", todo.id);
                println!("Text:      {}", todo.text);
                println!("Status:    {}", if todo.completed { "done" } else { "pending" });
                println!("Category:  {}", todo.category);
                println!("Priority:  {}", todo.priority);
                match todo.due_date {
                    Some(due) => println!("Due:       {}", due.format("%Y-%m-%d")),
                    None => println!("Due:       -"),
                }
                println!("Created:   {}", todo.created_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(todo),
            OutputFormat::Quiet => {
                println!("{}", todo.id);
            }
        }
    }

    /// Print a list of todos
    pub fn print_todos(&self, todos: &[Todo]) {
        match self.format {
            OutputFormat::Human => {
                if todos.is_empty() {
                    println!("No todos found.");
                    return;
                }
                for todo in todos {
                    println!("{}", format_row(todo));
                }
                println!("\n{} todo(s)", todos.len());
            }
            OutputFormat::Json => print_json(&todos),
            OutputFormat::Quiet => {
                for todo in todos {
                    println!("{}", todo.id);
                }
            }
        }
    }

    /// Print collection statistics
    pub fn print_stats(&self, stats: &Statistics) {
        match self.format {
            OutputFormat::Human => {
                println!("Todo Statistics");
                println!("===============");
                println!();
                println!("  Total:      {}", stats.total);
                println!("  Completed:  {}", stats.completed);
                println!("  Pending:    {}", stats.pending);
                println!("  Completion: {:.1}%", stats.completion_rate);
                println!();
                println!("By priority:");
                for (level, count) in &stats.by_priority {
                    println!("  {:<8} {}", level.as_str(), count);
                }
                println!();
                println!("By category:");
                if stats.by_category.is_empty() {
                    println!("  (none)");
                }
                for (name, count) in &stats.by_category {
                    println!("  {:<16} {}", truncate(name, 16), count);
                }
            }
            OutputFormat::Json => print_json(stats),
            OutputFormat::Quiet => {
                println!("{} {} {}", stats.total, stats.completed, stats.pending);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (shown in every mode but quiet)
    pub fn warning(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON: {}", e),
    }
}

/// One-line summary used by `list`, `search` and the menu
pub fn format_row(todo: &Todo) -> String {
    let check = if todo.completed { "x" } else { " " };
    let due = todo
        .due_date
        .map(|d| format!("  due {}", d.format("%Y-%m-%d")))
        .unwrap_or_default();
    format!(
        "{:>4} [{}] {:<40} {:<6} {}{}",
        todo.id,
        check,
        truncate(&todo.text, 40),
        priority_label(todo.priority),
        todo.category,
        due
    )
}

/// Short priority label for tables
pub fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "high",
        Priority::Medium => "med",
        Priority::Low => "low",
    }
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
