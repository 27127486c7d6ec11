//! Storage layer
//!
//! Handles persistence of the todo collection and the one-time import of the
//! legacy line-per-task file.
//!
//! ## Architecture
//!
//! - **JSON file**: Source of truth, the whole collection read and written as one unit
//! - **Legacy text file**: Imported lazily on the first load that finds it
//!
//! Every read goes to disk; nothing is cached between calls.

pub mod error;
pub mod migration;
pub mod persistence;

pub use error::{FileOp, StorageError, StorageResult};
pub use migration::MigrationReport;
pub use persistence::{JsonPersistence, LoadStatus, Loaded};
