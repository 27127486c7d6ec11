//! Todo collection persistence
//!
//! Handles saving and loading the whole collection to/from a JSON file.
//! Uses atomic writes (write to temp file, then rename) to prevent torn files.
//!
//! Storage location: `~/.local/share/ticklist/` (configurable via `Config`)
//!
//! Files:
//! - `todos.json` - The collection, a pretty-printed JSON array of records
//! - `todos.txt` - Legacy line-per-task file, migrated on first load
//!
//! There is no locking. Two processes doing load/modify/save against the same
//! file can lose each other's updates; a single active writer is assumed.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::error::{FileOp, StorageError, StorageResult};
use super::migration;
use crate::config::{Config, TODOS_FILE};
use crate::models::Todo;

/// Suffix of the copy kept when the collection file cannot be parsed
const CORRUPT_SUFFIX: &str = "corrupt.backup";

/// How the collection returned by [`JsonPersistence::load`] was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Parsed from an existing collection file
    Existing,
    /// No file existed; an empty collection was written
    Created,
    /// Imported from the legacy line-per-task file
    Migrated {
        imported: usize,
        /// Where the legacy file was moved; `None` if it could not be moved
        legacy_backup: Option<PathBuf>,
    },
    /// Legacy import failed; the collection is treated as empty
    MigrationFailed { details: String },
    /// The collection file could not be parsed; the collection is treated as empty
    Corrupt {
        details: String,
        /// Copy of the unreadable file, if one could be written
        backup_path: Option<PathBuf>,
    },
}

/// A loaded collection together with how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub todos: Vec<Todo>,
    pub status: LoadStatus,
}

impl Loaded {
    /// True when the collection is empty because something went wrong,
    /// not because there is no data
    pub fn is_degraded(&self) -> bool {
        matches!(
            self.status,
            LoadStatus::Corrupt { .. } | LoadStatus::MigrationFailed { .. }
        )
    }

    /// Operator-facing warning for degraded loads
    pub fn warning(&self) -> Option<String> {
        match &self.status {
            LoadStatus::Corrupt {
                details,
                backup_path,
            } => Some(match backup_path {
                Some(backup) => format!(
                    "Todo file is unreadable ({}). A copy was saved to '{}'. Saving now will replace the original.",
                    details,
                    backup.display()
                ),
                None => format!(
                    "Todo file is unreadable ({}). Saving now will replace it and its contents will be lost.",
                    details
                ),
            }),
            LoadStatus::MigrationFailed { details } => Some(format!(
                "Could not import legacy todo file: {}. Adding todos now creates {} and the legacy file will no longer be imported automatically.",
                details, TODOS_FILE
            )),
            _ => None,
        }
    }
}

/// Persistence layer for the todo collection
pub struct JsonPersistence {
    config: Config,
}

impl JsonPersistence {
    /// Create a new persistence handler with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the collection file
    pub fn path(&self) -> PathBuf {
        self.config.todos_path()
    }

    /// Check if a collection file exists on disk
    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Load the full collection
    ///
    /// - Creates the data directory if needed.
    /// - Runs the legacy migration when a legacy file exists and no
    ///   collection file does.
    /// - Creates an empty collection file when none exists.
    /// - Substitutes an empty collection when the file cannot be parsed,
    ///   reporting it through [`LoadStatus::Corrupt`].
    ///
    /// Only directory/file I/O failures are returned as errors.
    pub fn load(&self) -> StorageResult<Loaded> {
        self.ensure_data_dir()?;

        match migration::migrate_if_needed(self) {
            Ok(Some(report)) => {
                return Ok(Loaded {
                    status: LoadStatus::Migrated {
                        imported: report.todos.len(),
                        legacy_backup: report.legacy_backup,
                    },
                    todos: report.todos,
                });
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Legacy migration failed: {}", e);
                return Ok(Loaded {
                    todos: Vec::new(),
                    status: LoadStatus::MigrationFailed {
                        details: e.to_string(),
                    },
                });
            }
        }

        let path = self.path();
        if !path.exists() {
            debug!("No todo file at {:?}, creating an empty one", path);
            self.save(&[])?;
            return Ok(Loaded {
                todos: Vec::new(),
                status: LoadStatus::Created,
            });
        }

        let bytes = fs::read(&path).map_err(|e| StorageError::io(FileOp::Read, path.clone(), e))?;

        match parse_collection(&bytes) {
            Ok(todos) => {
                debug!("Loaded {} todo(s) from {:?}", todos.len(), path);
                Ok(Loaded {
                    todos,
                    status: LoadStatus::Existing,
                })
            }
            Err(e) => {
                let backup_path = backup_corrupt(&path, &bytes);
                warn!(
                    "Todo file {:?} is corrupt ({}); continuing with an empty collection",
                    path, e
                );
                Ok(Loaded {
                    todos: Vec::new(),
                    status: LoadStatus::Corrupt {
                        details: e.to_string(),
                        backup_path,
                    },
                })
            }
        }
    }

    /// Replace the collection file with `todos`
    pub fn save(&self, todos: &[Todo]) -> StorageResult<()> {
        let json = serialize_collection(todos)?;
        let path = self.path();

        atomic_write(&path, json.as_bytes())?;
        debug!("Saved {} todo(s) to {:?}", todos.len(), path);

        Ok(())
    }

    fn ensure_data_dir(&self) -> StorageResult<()> {
        let dir = &self.config.data_dir;
        fs::create_dir_all(dir).map_err(|source| StorageError::DataDir {
            path: dir.clone(),
            source,
        })
    }
}

/// Serialize a collection exactly as it is written to disk
pub fn serialize_collection(todos: &[Todo]) -> StorageResult<String> {
    let mut json = serde_json::to_string_pretty(todos)?;
    json.push('\n');
    Ok(json)
}

/// Parse the on-disk representation
///
/// A file containing only whitespace is an empty collection.
pub fn parse_collection(bytes: &[u8]) -> Result<Vec<Todo>, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes)
}

/// First free path of the form `<path>.<suffix>`, `<path>.<suffix>.1`, ...
pub(crate) fn unique_backup_path(path: &Path, suffix: &str) -> PathBuf {
    let base = PathBuf::from(format!("{}.{}", path.display(), suffix));
    if !base.exists() {
        return base;
    }

    (1..)
        .map(|n| PathBuf::from(format!("{}.{}", base.display(), n)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(base)
}

/// Keep a copy of an unparseable collection file
///
/// Repeated loads of the same corrupt file reuse the existing copy.
fn backup_corrupt(path: &Path, bytes: &[u8]) -> Option<PathBuf> {
    let base = PathBuf::from(format!("{}.{}", path.display(), CORRUPT_SUFFIX));
    if fs::read(&base).is_ok_and(|existing| existing == bytes) {
        return Some(base);
    }

    let backup = unique_backup_path(path, CORRUPT_SUFFIX);
    match fs::write(&backup, bytes) {
        Ok(()) => {
            info!("Saved copy of corrupt todo file to {:?}", backup);
            Some(backup)
        }
        Err(e) => {
            warn!("Could not back up corrupt todo file to {:?}: {}", backup, e);
            None
        }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::DataDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let write_err = |e| StorageError::io(FileOp::Write, temp_path.clone(), e);

    let mut file = File::create(&temp_path).map_err(write_err)?;
    file.write_all(data).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::Replace {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
