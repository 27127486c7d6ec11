//! ticklist core library
//!
//! This crate provides the core functionality for ticklist, a personal todo
//! tracker backed by a single JSON file.
//!
//! # Architecture
//!
//! - **JSON file**: Source of truth, read and rewritten whole on every operation
//! - **Legacy text file**: Imported once, the first time the JSON file is missing
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open()?;
//!
//! // Add a todo
//! let todo = store.add(NewTodo::new("Buy milk").category("Shopping"))?;
//!
//! // Query todos
//! let matches = store.search("milk")?;
//! let stats = store.statistics()?;
//! ```
//!
//! # Modules
//!
//! - `store`: Mutation and query interface (main entry point)
//! - `models`: The todo record, priority scale and update patches
//! - `query`: Filters, search, statistics and display ordering
//! - `storage`: File persistence and legacy migration
//! - `config`: Application configuration

pub mod config;
pub mod models;
pub mod query;
pub mod storage;
pub mod store;

pub use config::Config;
pub use models::{DueDateChange, NewTodo, Priority, Todo, TodoId, TodoPatch};
pub use query::{SortKey, Statistics};
pub use storage::{JsonPersistence, LoadStatus, Loaded, StorageError, StorageResult};
pub use store::Store;
