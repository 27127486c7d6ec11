//! Storage errors
//!
//! Every failure carries the path involved. Raw I/O errors are sorted by
//! [`StorageError::io`] into the cases a user can act on (permissions, free
//! space) and a generic read/write failure.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The file operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Read,
    Write,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileOp::Read => "read",
            FileOp::Write => "write",
        })
    }
}

/// Errors returned by the persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// The data directory could not be created
    #[error("Cannot create data directory '{path}': {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied on '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No space left while writing '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other read or write failure
    #[error("Cannot {op} '{path}': {source}")]
    Io {
        op: FileOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The temp file written by a save could not replace the collection file
    #[error("Cannot replace '{to}' with '{from}': {source}")]
    Replace {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot encode todos as JSON: {0}")]
    Encode(#[from] serde_json::Error),

    /// The legacy file was imported but could not be moved aside
    #[error("Imported '{from}' but could not rename it to '{to}': {source}")]
    LegacyRename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classify an I/O failure on `path`
    pub fn io(op: FileOp, path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            StorageError::PermissionDenied { path, source }
        } else if op == FileOp::Write && is_out_of_space(&source) {
            StorageError::DiskFull { path, source }
        } else {
            StorageError::Io { op, path, source }
        }
    }

    /// Whether the user can fix the cause and simply retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::DiskFull { .. } | StorageError::PermissionDenied { .. }
        )
    }

    /// A hint for the user, when there is a useful one
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } => {
                Some("Check that you own the data directory and its files, or point TICKLIST_DATA_DIR elsewhere.")
            }
            StorageError::DataDir { .. } => {
                Some("Check that the parent directory exists and is writable, or set data_dir with `tick config set`.")
            }
            StorageError::LegacyRename { .. } => {
                Some("Your todos were imported. Move or delete the old todos.txt by hand.")
            }
            _ => None,
        }
    }
}

/// ENOSPC and quota errors have no stable `ErrorKind` on every platform
fn is_out_of_space(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    ["no space left", "disk full", "quota exceeded", "not enough space"]
        .iter()
        .any(|needle| msg.contains(needle))
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(op: FileOp, kind: io::ErrorKind, msg: &str) -> StorageError {
        StorageError::io(op, PathBuf::from("/data/todos.json"), io::Error::new(kind, msg))
    }

    #[test]
    fn test_permission_denied_on_read_and_write() {
        for op in [FileOp::Read, FileOp::Write] {
            let err = classify(op, io::ErrorKind::PermissionDenied, "denied");
            assert!(matches!(err, StorageError::PermissionDenied { .. }));
            assert!(err.is_recoverable());
            assert!(err.recovery_suggestion().is_some());
        }
    }

    #[test]
    fn test_out_of_space_only_on_write() {
        let err = classify(FileOp::Write, io::ErrorKind::Other, "No space left on device");
        assert!(matches!(err, StorageError::DiskFull { .. }));
        assert!(err.is_recoverable());

        let err = classify(FileOp::Read, io::ErrorKind::Other, "No space left on device");
        assert!(matches!(err, StorageError::Io { op: FileOp::Read, .. }));
    }

    #[test]
    fn test_other_failures_keep_the_operation() {
        let err = classify(FileOp::Read, io::ErrorKind::InvalidData, "bad bytes");
        assert!(!err.is_recoverable());
        assert!(err.recovery_suggestion().is_none());
        assert_eq!(
            err.to_string(),
            "Cannot read '/data/todos.json': bad bytes"
        );
    }

    #[test]
    fn test_legacy_rename_message() {
        let err = StorageError::LegacyRename {
            from: PathBuf::from("/data/todos.txt"),
            to: PathBuf::from("/data/todos.txt.backup"),
            source: io::Error::new(io::ErrorKind::Other, "busy"),
        };

        assert!(err.to_string().contains("todos.txt.backup"));
        assert!(err.recovery_suggestion().is_some());
    }
}
