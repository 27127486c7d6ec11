//! Interactive editing support
//!
//! Opens $EDITOR on a small `key: value` template for editing a todo, and
//! provides the y/N confirmation prompt.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::Command;

use ticklist_core::{Todo, TodoPatch};

use crate::commands::{parse_due_date, parse_priority, parse_text};

/// Open content in the user's preferred editor
///
/// Uses $EDITOR, $VISUAL, or falls back to common editors.
pub fn edit_text(initial_content: &str) -> Result<String> {
    let editor = find_editor()?;

    let temp_dir = env::temp_dir();
    let temp_path = temp_dir.join(format!("ticklist_edit_{}.txt", std::process::id()));

    fs::write(&temp_path, initial_content)
        .with_context(|| format!("Failed to create temp file: {:?}", temp_path))?;

    let status = Command::new(&editor)
        .arg(&temp_path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;

    if !status.success() {
        let _ = fs::remove_file(&temp_path);
        bail!(
            "Editor '{}' exited with non-zero status. Check that your editor is configured correctly.",
            editor
        );
    }

    let content = fs::read_to_string(&temp_path)
        .with_context(|| format!("Failed to read edited file: {:?}", temp_path))?;

    let _ = fs::remove_file(&temp_path);

    Ok(content)
}

/// Find the user's preferred editor
fn find_editor() -> Result<String> {
    if let Ok(editor) = env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }

    if let Ok(visual) = env::var("VISUAL") {
        if !visual.is_empty() {
            return Ok(visual);
        }
    }

    let common_editors = ["nano", "vim", "vi", "emacs", "notepad"];

    for editor in common_editors {
        if command_exists(editor) {
            return Ok(editor.to_string());
        }
    }

    bail!(
        "No editor found. Set $EDITOR environment variable.\n\
         Example: export EDITOR=nano"
    )
}

/// Check if a command exists in PATH
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Editable view of a todo
pub fn todo_template(todo: &Todo) -> String {
    format!(
        "# Edit todo {}\n\
         # Lines starting with # are ignored. Leave due empty for no deadline.\n\n\
         text: {}\n\
         category: {}\n\
         priority: {}\n\
         due: {}\n\
         done: {}\n",
        todo.id,
        todo.text,
        todo.category,
        todo.priority,
        todo.due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        if todo.completed { "yes" } else { "no" },
    )
}

/// Turn an edited template into a patch against `original`
///
/// Only fields whose value differs end up in the patch. Returns `None` when
/// nothing changed.
pub fn parse_todo_edit(content: &str, original: &Todo) -> Result<Option<TodoPatch>> {
    let mut patch = TodoPatch::default();

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "text" => {
                let text = parse_text(value)?;
                if text != original.text {
                    patch = patch.text(text);
                }
            }
            "category" => {
                if !value.is_empty() && value != original.category {
                    patch = patch.category(value);
                }
            }
            "priority" => {
                let priority = parse_priority(value)?;
                if priority != original.priority {
                    patch = patch.priority(priority);
                }
            }
            "due" => {
                if value.is_empty() {
                    if original.due_date.is_some() {
                        patch = patch.clear_due_date();
                    }
                } else {
                    let due = parse_due_date(value)?;
                    if Some(due) != original.due_date {
                        patch = patch.due_date(due);
                    }
                }
            }
            "done" => {
                let done = matches!(value.to_ascii_lowercase().as_str(), "yes" | "y" | "true" | "x");
                if done != original.completed {
                    patch = patch.completed(done);
                }
            }
            _ => {}
        }
    }

    Ok(if patch.is_empty() { None } else { Some(patch) })
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
