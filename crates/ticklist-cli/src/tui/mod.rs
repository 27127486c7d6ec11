//! Ticklist TUI
//!
//! Terminal user interface for ticklist.
//!
//! ## Layout
//!
//! Two pages, switched with `1` and `2`:
//! - Todos: filters (All, Pending, Completed, Overdue, one per category),
//!   the todo list and a detail pane
//! - Statistics: counts, completion gauge, category and priority charts
//!
//! ## Navigation
//!
//! - j/k or ↑/↓: Move selection up/down
//! - h/l or ←/→: Switch focus between panes
//! - Tab: Cycle through panes
//! - q: Quit
//!
//! ## Commands
//!
//! - a: Add todo
//! - space: Toggle done
//! - e: Edit in $EDITOR
//! - p: Cycle priority
//! - d: Delete (press twice)
//! - s: Cycle sort order
//! - /: Search

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ticklist_core::{Config, Store};

use app::{ActivePane, App, InputMode, Page};

use crate::editor;
use crate::LOG_ENV;

/// Run the TUI application
pub fn run(config: Config) -> Result<()> {
    // File-based logging; stderr would draw over the screen
    init_tui_logging(&config);

    let store = Store::open_with_config(config);
    let mut app = App::new(&store)?;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_app(&mut terminal, &mut app, &store);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, store: &Store) -> Result<()> {
    loop {
        app.check_status_timeout();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        // Only handle key press events (not release)
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // If help is showing, any key dismisses it
        if app.show_help {
            app.show_help = false;
            continue;
        }

        match app.input_mode {
            InputMode::Normal => {
                if handle_normal_mode(app, store, key.code, key.modifiers) {
                    edit_current(terminal, app, store)?;
                }
            }
            InputMode::Add => handle_add_mode(app, store, key.code),
            InputMode::Search => handle_search_mode(app, key.code),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle key events in normal mode
///
/// Returns true when the selected todo should be opened in the editor.
fn handle_normal_mode(app: &mut App, store: &Store, code: KeyCode, modifiers: KeyModifiers) -> bool {
    // Any key other than d abandons a pending delete
    if code != KeyCode::Char('d') {
        app.pending_delete = None;
    }

    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('j')
            | KeyCode::Char('k')
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Char('h')
            | KeyCode::Char('l')
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab
            | KeyCode::BackTab
    ) {
        app.status_message = None;
    }

    let result = match code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            Ok(())
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            Ok(())
        }

        KeyCode::Char('1') => {
            app.show_page(Page::Todos);
            Ok(())
        }
        KeyCode::Char('2') => {
            app.show_page(Page::Stats);
            Ok(())
        }
        KeyCode::Char('?') => {
            app.toggle_help();
            Ok(())
        }

        // Everything below acts on the todos page only
        _ if app.page != Page::Todos => Ok(()),

        KeyCode::Char('k') | KeyCode::Up => {
            app.move_up();
            Ok(())
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_down();
            Ok(())
        }
        KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => {
            app.prev_pane();
            Ok(())
        }
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => {
            app.next_pane();
            Ok(())
        }
        KeyCode::Enter if app.active_pane == ActivePane::Filters => {
            app.active_pane = ActivePane::Items;
            Ok(())
        }

        KeyCode::Char('a') => {
            app.enter_add_mode();
            Ok(())
        }
        KeyCode::Char(' ') => app.toggle_current(store),
        KeyCode::Char('p') => app.cycle_priority(store),
        KeyCode::Char('d') => app.delete_current(store),
        KeyCode::Char('s') => {
            app.cycle_sort();
            Ok(())
        }
        KeyCode::Char('/') => {
            app.enter_search_mode();
            Ok(())
        }
        KeyCode::Char('e') => return app.current_todo().is_some(),

        _ => Ok(()),
    };

    if let Err(e) = result {
        app.set_status(format!("Error: {:#}", e));
    }

    false
}

/// Handle key events while typing a new todo
fn handle_add_mode(app: &mut App, store: &Store, code: KeyCode) {
    match code {
        KeyCode::Esc => app.exit_input_mode(),
        KeyCode::Enter => {
            if let Err(e) = app.submit_add(store) {
                app.set_status(format!("Failed to add todo: {:#}", e));
            }
        }
        KeyCode::Char(c) => app.insert_char(c),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        _ => {}
    }
}

/// Handle key events in search mode
fn handle_search_mode(app: &mut App, code: KeyCode) {
    match code {
        // Cancel search
        KeyCode::Esc => {
            app.exit_input_mode();
            app.clear_search();
        }
        // Keep the filtered view
        KeyCode::Enter => app.exit_input_mode(),
        KeyCode::Char(c) => app.insert_char(c),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        _ => {}
    }
}

/// Suspend the TUI, edit the selected todo in $EDITOR, then resume
fn edit_current<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, store: &Store) -> Result<()> {
    let Some(todo) = app.current_todo().cloned() else {
        return Ok(());
    };

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(cursor::Show)?;

    let edited = editor::edit_text(&editor::todo_template(&todo));

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    terminal.clear()?;

    let content = match edited {
        Ok(content) => content,
        Err(e) => {
            app.set_status(format!("Editor failed: {:#}", e));
            return Ok(());
        }
    };

    let outcome = match editor::parse_todo_edit(&content, &todo) {
        Ok(Some(patch)) => app.apply_patch(store, todo.id, patch),
        Ok(None) => {
            app.set_status("Edit cancelled (no changes)");
            Ok(())
        }
        Err(e) => {
            app.set_status(format!("Edit rejected: {:#}", e));
            Ok(())
        }
    };
    if let Err(e) = outcome {
        app.set_status(format!("Failed to update todo: {:#}", e));
    }

    Ok(())
}

/// Initialize logging for TUI mode
///
/// Only initializes if TICKLIST_LOG is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let log_path = config
        .log_file
        .clone()
        .unwrap_or_else(|| config.default_log_path());

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "ticklist_core={},ticklist_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
