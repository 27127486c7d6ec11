//! Interactive line menu
//!
//! A prompt loop for quick sessions: type an action, answer the follow-up
//! prompts. Invalid input prints a message and the loop carries on.

use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::Local;

use ticklist_core::{NewTodo, Store, TodoPatch};

use crate::output::format_row;

use super::{parse_id, parse_text};

const ACTIONS: &str = "Type add, show, edit, complete, delete, stats or exit: ";

/// Run the menu until `exit` or end of input
pub fn run<R: BufRead, W: Write>(store: &Store, input: &mut R, out: &mut W) -> Result<()> {
    writeln!(out, "The current date is {}", Local::now().format("%d-%m-%Y %H:%M"))?;

    if let Some(warning) = store.load()?.warning() {
        writeln!(out, "Warning: {}", warning)?;
    }

    loop {
        let Some(action) = prompt(input, out, ACTIONS)? else {
            break;
        };
        let action = action.to_lowercase();

        let result = if action.starts_with("add") {
            add(store, input, out)
        } else if action.starts_with("show") {
            show(store, out)
        } else if action.starts_with("edit") {
            edit(store, input, out)
        } else if action.starts_with("complete") {
            complete(store, input, out)
        } else if action.starts_with("delete") {
            delete(store, input, out)
        } else if action.starts_with("stats") {
            stats(store, out)
        } else if action.starts_with("exit") {
            break;
        } else {
            writeln!(out, "Unknown action.")?;
            Ok(())
        };

        if let Err(e) = result {
            writeln!(out, "{}", e)?;
        }
    }

    writeln!(out, "Bye!")?;
    Ok(())
}

/// Print `message` and read one trimmed line; `None` at end of input
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<Option<String>> {
    write!(out, "{}", message)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_required<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<String> {
    prompt(input, out, message)?.ok_or_else(|| anyhow::anyhow!("No input."))
}

fn add<R: BufRead, W: Write>(store: &Store, input: &mut R, out: &mut W) -> Result<()> {
    let text = parse_text(&prompt_required(input, out, "Enter a todo item: ")?)?;
    let todo = store.add(NewTodo::new(text))?;
    writeln!(out, "Added todo {}.", todo.id)?;
    Ok(())
}

fn show<W: Write>(store: &Store, out: &mut W) -> Result<()> {
    let todos = store.all()?;
    if todos.is_empty() {
        writeln!(out, "No todos yet.")?;
    }
    for todo in &todos {
        writeln!(out, "{}", format_row(todo))?;
    }
    Ok(())
}

fn edit<R: BufRead, W: Write>(store: &Store, input: &mut R, out: &mut W) -> Result<()> {
    let id = parse_id(&prompt_required(input, out, "Enter the number of the todo to edit: ")?)?;
    if store.get_by_id(id)?.is_none() {
        writeln!(out, "There is no todo with that number.")?;
        return Ok(());
    }

    let text = parse_text(&prompt_required(input, out, "Enter the new todo item: ")?)?;
    store.update(id, TodoPatch::default().text(text))?;
    writeln!(out, "Updated todo {}.", id)?;
    Ok(())
}

fn complete<R: BufRead, W: Write>(store: &Store, input: &mut R, out: &mut W) -> Result<()> {
    let id = parse_id(&prompt_required(input, out, "Enter the number of the todo to complete: ")?)?;
    if store.set_completed(id, true)? {
        writeln!(out, "Completed todo {}.", id)?;
    } else {
        writeln!(out, "There is no todo with that number.")?;
    }
    Ok(())
}

fn delete<R: BufRead, W: Write>(store: &Store, input: &mut R, out: &mut W) -> Result<()> {
    let id = parse_id(&prompt_required(input, out, "Enter the number of the todo to delete: ")?)?;
    if store.delete(id)? {
        writeln!(out, "Deleted todo {}.", id)?;
    } else {
        writeln!(out, "There is no todo with that number.")?;
    }
    Ok(())
}

fn stats<W: Write>(store: &Store, out: &mut W) -> Result<()> {
    let stats = store.statistics()?;
    writeln!(
        out,
        "{} total, {} done, {} pending ({:.1}% complete)",
        stats.total, stats.completed, stats.pending, stats.completion_rate
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;
    use ticklist_core::Config;

    fn run_script(store: &Store, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run(store, &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn test_store(temp_dir: &TempDir) -> Store {
        Store::open_with_config(Config::with_data_dir(temp_dir.path()))
    }

    #[test]
    fn test_add_complete_and_show() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let out = run_script(
            &store,
            "add\nBuy milk\nADD\nWalk dog\ncomplete\n1\nshow\nexit\n",
        );

        assert!(out.contains("Added todo 1."));
        assert!(out.contains("Added todo 2."));
        assert!(out.contains("Completed todo 1."));
        assert!(out.contains("[x] Buy milk"));
        assert!(out.contains("[ ] Walk dog"));
        assert!(out.trim_end().ends_with("Bye!"));

        let todos = store.all().unwrap();
        assert_eq!(todos.len(), 2);
        assert!(todos[0].completed);
    }

    #[test]
    fn test_invalid_input_does_not_stop_the_loop() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let out = run_script(
            &store,
            "add\n   \ncomplete\nabc\ncomplete\n9\nfly\nstats\nexit\n",
        );

        assert!(out.contains("Todo text cannot be empty."));
        assert!(out.contains("Invalid todo number 'abc'"));
        assert!(out.contains("There is no todo with that number."));
        assert!(out.contains("Unknown action."));
        assert!(out.contains("0 total, 0 done, 0 pending (0.0% complete)"));
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_edit_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        store.add(NewTodo::new("Draft")).unwrap();
        store.add(NewTodo::new("Scratch")).unwrap();

        run_script(&store, "edit\n1\nFinal\ndelete\n2\nexit\n");

        let todos = store.all().unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].text, "Final");
    }

    #[test]
    fn test_end_of_input_exits() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let out = run_script(&store, "add\n");

        assert!(out.contains("No input."));
        assert!(out.trim_end().ends_with("Bye!"));
    }
}
