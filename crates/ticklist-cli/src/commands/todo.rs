//! Todo command handlers

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};

use ticklist_core::{query, NewTodo, Priority, SortKey, Store, TodoId, TodoPatch};

use crate::editor::{confirm, edit_text, parse_todo_edit, todo_template};
use crate::output::Output;

use super::{parse_category, parse_text};

/// Options for `tick add`
pub struct AddArgs {
    pub text: String,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub due: Option<NaiveDate>,
}

/// Filters for `tick list`
#[derive(Default)]
pub struct ListArgs {
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub pending: bool,
    pub done: bool,
    pub overdue: bool,
    pub sort: Option<SortKey>,
}

/// Field changes for `tick edit`
#[derive(Default)]
pub struct EditArgs {
    pub text: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub due: Option<NaiveDate>,
    pub clear_due: bool,
}

impl EditArgs {
    fn into_patch(self) -> Result<TodoPatch> {
        let mut patch = TodoPatch::default();
        if let Some(text) = self.text {
            patch = patch.text(parse_text(&text)?);
        }
        if let Some(category) = self.category {
            patch = patch.category(parse_category(&category)?);
        }
        if let Some(priority) = self.priority {
            patch = patch.priority(priority);
        }
        if let Some(due) = self.due {
            patch = patch.due_date(due);
        }
        if self.clear_due {
            patch = patch.clear_due_date();
        }
        Ok(patch)
    }
}

/// Create a new todo
pub fn add(store: &Store, args: AddArgs, output: &Output) -> Result<()> {
    let mut new = NewTodo::new(parse_text(&args.text)?).due_date(args.due);
    if let Some(category) = args.category {
        new = new.category(parse_category(&category)?);
    }
    if let Some(priority) = args.priority {
        new = new.priority(priority);
    }

    let todo = store.add(new).context("Failed to add todo")?;

    output.success(&format!("Added todo {}", todo.id));
    output.print_todo(&todo);

    Ok(())
}

/// List todos, optionally filtered and sorted
pub fn list(store: &Store, args: ListArgs, output: &Output) -> Result<()> {
    if args.pending && args.done {
        bail!("--pending and --done cannot be combined.");
    }

    let mut todos = store.all()?;

    if let Some(ref category) = args.category {
        todos = query::by_category(&todos, category);
    }
    if let Some(priority) = args.priority {
        todos = query::by_priority(&todos, priority);
    }
    if args.overdue {
        todos = query::overdue(&todos, Local::now().date_naive());
    }
    if args.pending {
        todos.retain(|todo| !todo.completed);
    }
    if args.done {
        todos.retain(|todo| todo.completed);
    }
    if let Some(key) = args.sort {
        query::sort_todos(&mut todos, key);
    }

    output.print_todos(&todos);
    Ok(())
}

/// Show a single todo
pub fn show(store: &Store, id: TodoId, output: &Output) -> Result<()> {
    let todo = store
        .get_by_id(id)?
        .ok_or_else(|| anyhow::anyhow!("Todo not found: {}", id))?;

    output.print_todo(&todo);
    Ok(())
}

/// Edit a todo from flags, or in $EDITOR when no flags are given
pub fn edit(store: &Store, id: TodoId, args: EditArgs, output: &Output) -> Result<()> {
    let todo = store
        .get_by_id(id)?
        .ok_or_else(|| anyhow::anyhow!("Todo not found: {}", id))?;

    let patch = args.into_patch()?;
    let patch = if patch.is_empty() {
        let content = edit_text(&todo_template(&todo))?;
        match parse_todo_edit(&content, &todo)? {
            Some(patch) => patch,
            None => {
                output.message("No changes.");
                return Ok(());
            }
        }
    } else {
        patch
    };

    if !store.update(id, patch).context("Failed to update todo")? {
        bail!("Todo not found: {}", id);
    }

    output.success("Todo updated");
    if let Some(updated) = store.get_by_id(id)? {
        output.print_todo(&updated);
    }

    Ok(())
}

/// Mark a todo done or not done
pub fn set_done(store: &Store, id: TodoId, done: bool, output: &Output) -> Result<()> {
    if !store
        .set_completed(id, done)
        .context("Failed to update todo")?
    {
        bail!("Todo not found: {}", id);
    }

    if done {
        output.success(&format!("Completed todo {}", id));
    } else {
        output.success(&format!("Reopened todo {}", id));
    }
    Ok(())
}

/// Delete a todo
pub fn delete(store: &Store, id: TodoId, yes: bool, output: &Output) -> Result<()> {
    let todo = store
        .get_by_id(id)?
        .ok_or_else(|| anyhow::anyhow!("Todo not found: {}", id))?;

    if !yes && output.should_prompt() {
        println!("Delete todo: {} - {}", todo.id, todo.text);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if !store.delete(id).context("Failed to delete todo")? {
        bail!("Todo not found: {}", id);
    }

    output.success(&format!("Deleted todo {}", id));
    Ok(())
}

/// Search todo text
pub fn search(store: &Store, query: String, output: &Output) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        bail!("Search query cannot be empty.");
    }

    let todos = store.search(query)?;
    output.print_todos(&todos);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;
    use ticklist_core::Config;

    fn setup() -> (TempDir, Store, Output) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open_with_config(Config::with_data_dir(temp_dir.path()));
        (temp_dir, store, Output::new(OutputFormat::Quiet))
    }

    #[test]
    fn test_add_validates_text() {
        let (_dir, store, output) = setup();
        let args = AddArgs {
            text: "   ".to_string(),
            category: None,
            priority: None,
            due: None,
        };

        assert!(add(&store, args, &output).is_err());
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_add_with_options() {
        let (_dir, store, output) = setup();
        let due = NaiveDate::from_ymd_opt(2024, 10, 31).unwrap();
        let args = AddArgs {
            text: "Carve pumpkin".to_string(),
            category: Some("Home".to_string()),
            priority: Some(Priority::Low),
            due: Some(due),
        };

        add(&store, args, &output).unwrap();

        let todo = store.get_by_id(1).unwrap().unwrap();
        assert_eq!(todo.category, "Home");
        assert_eq!(todo.priority, Priority::Low);
        assert_eq!(todo.due_date, Some(due));
    }

    #[test]
    fn test_edit_with_flags() {
        let (_dir, store, output) = setup();
        store.add(NewTodo::new("Draft")).unwrap();

        let args = EditArgs {
            text: Some("Final".to_string()),
            clear_due: true,
            ..EditArgs::default()
        };
        edit(&store, 1, args, &output).unwrap();

        let todo = store.get_by_id(1).unwrap().unwrap();
        assert_eq!(todo.text, "Final");
        assert!(todo.due_date.is_none());
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let (_dir, store, output) = setup();

        assert!(show(&store, 5, &output).is_err());
        assert!(set_done(&store, 5, true, &output).is_err());
        assert!(delete(&store, 5, true, &output).is_err());
    }

    #[test]
    fn test_set_done_and_delete() {
        let (_dir, store, output) = setup();
        store.add(NewTodo::new("Laundry")).unwrap();

        set_done(&store, 1, true, &output).unwrap();
        assert!(store.get_by_id(1).unwrap().unwrap().completed);

        set_done(&store, 1, false, &output).unwrap();
        assert!(!store.get_by_id(1).unwrap().unwrap().completed);

        delete(&store, 1, true, &output).unwrap();
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_search_rejects_empty_query() {
        let (_dir, store, output) = setup();
        assert!(search(&store, "  ".to_string(), &output).is_err());
        assert!(search(&store, "milk".to_string(), &output).is_ok());
    }

    #[test]
    fn test_list_rejects_conflicting_flags() {
        let (_dir, store, output) = setup();
        let args = ListArgs {
            pending: true,
            done: true,
            ..ListArgs::default()
        };
        assert!(list(&store, args, &output).is_err());
    }
}
