//! Ticklist CLI
//!
//! Command-line interface for ticklist - a file-backed personal todo tracker.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ticklist_core::{Config, LoadStatus, Priority, SortKey, StorageError, Store, TodoId};

mod commands;
mod editor;
mod output;
mod tui;

use commands::todo::{AddArgs, EditArgs, ListArgs};
use output::{Output, OutputFormat};

/// Environment variable that enables logging, e.g. `TICKLIST_LOG=debug`
pub const LOG_ENV: &str = "TICKLIST_LOG";

#[derive(Parser)]
#[command(name = "tick")]
#[command(about = "ticklist - personal todo tracking in a single JSON file")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Add a todo
    Add {
        /// Todo text
        text: String,
        /// Category (default: General)
        #[arg(short, long)]
        category: Option<String>,
        /// Priority: high, medium or low
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Due date (YYYY-MM-DD)
        #[arg(short, long, value_parser = commands::due_date_arg)]
        due: Option<NaiveDate>,
    },
    /// List todos
    #[command(alias = "ls")]
    List {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// Only this priority
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Only pending todos
        #[arg(long, conflicts_with = "done")]
        pending: bool,
        /// Only completed todos
        #[arg(long)]
        done: bool,
        /// Only pending todos past their due date
        #[arg(long)]
        overdue: bool,
        /// Sort by created, priority, category or due
        #[arg(short, long)]
        sort: Option<SortKey>,
    },
    /// Show todo details
    Show {
        /// Todo id
        id: TodoId,
    },
    /// Edit a todo (opens $EDITOR when no flags are given)
    Edit {
        /// Todo id
        id: TodoId,
        /// New text
        #[arg(long)]
        text: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<Priority>,
        /// New due date (YYYY-MM-DD)
        #[arg(short, long, value_parser = commands::due_date_arg, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Mark a todo completed
    Done {
        /// Todo id
        id: TodoId,
    },
    /// Mark a todo pending again
    Undone {
        /// Todo id
        id: TodoId,
    },
    /// Delete a todo
    #[command(alias = "rm")]
    Delete {
        /// Todo id
        id: TodoId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Search todo text
    Search {
        /// Search query
        query: String,
    },
    /// Show statistics
    Stats,
    /// Interactive line menu
    Menu,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work without a store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    let command = match cli.command {
        Some(Commands::Tui) | None => return tui::run(config),
        Some(command) => command,
    };

    init_cli_logging();
    let store = Store::open_with_config(config);

    if let Commands::Menu = command {
        let stdin = std::io::stdin();
        return commands::menu::run(&store, &mut stdin.lock(), &mut std::io::stdout());
    }

    report_load_status(&store, &output)?;

    match command {
        Commands::Add {
            text,
            category,
            priority,
            due,
        } => commands::todo::add(
            &store,
            AddArgs {
                text,
                category,
                priority,
                due,
            },
            &output,
        ),
        Commands::List {
            category,
            priority,
            pending,
            done,
            overdue,
            sort,
        } => commands::todo::list(
            &store,
            ListArgs {
                category,
                priority,
                pending,
                done,
                overdue,
                sort,
            },
            &output,
        ),
        Commands::Show { id } => commands::todo::show(&store, id, &output),
        Commands::Edit {
            id,
            text,
            category,
            priority,
            due,
            clear_due,
        } => commands::todo::edit(
            &store,
            id,
            EditArgs {
                text,
                category,
                priority,
                due,
                clear_due,
            },
            &output,
        ),
        Commands::Done { id } => commands::todo::set_done(&store, id, true, &output),
        Commands::Undone { id } => commands::todo::set_done(&store, id, false, &output),
        Commands::Delete { id, yes } => commands::todo::delete(&store, id, yes, &output),
        Commands::Search { query } => commands::todo::search(&store, query, &output),
        Commands::Stats => commands::stats::show(&store, &output),
        Commands::Tui | Commands::Menu | Commands::Config { .. } => Ok(()),
    }
}

/// Load once up front so migration and corruption are reported before the command runs
fn report_load_status(store: &Store, output: &Output) -> Result<()> {
    let loaded = match store.load() {
        Ok(loaded) => loaded,
        Err(e) => {
            let hint = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<StorageError>())
                .and_then(StorageError::recovery_suggestion);
            if let Some(hint) = hint {
                output.warning(hint);
            }
            return Err(e);
        }
    };

    // stderr so JSON output on stdout stays parseable
    if let LoadStatus::Migrated { imported, .. } = &loaded.status {
        if output.format == OutputFormat::Human {
            eprintln!(
                "Imported {} todos from {}",
                imported,
                store.config().legacy_path().display()
            );
        }
    }
    if let Some(warning) = loaded.warning() {
        output.warning(&warning);
    }

    Ok(())
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize stderr logging for one-shot commands
///
/// Only initializes if TICKLIST_LOG is set.
fn init_cli_logging() {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "ticklist_core={},ticklist_cli={}",
        log_level, log_level
    ));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
