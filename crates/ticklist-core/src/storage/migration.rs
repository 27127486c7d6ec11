//! Legacy file migration
//!
//! Older releases kept one task per line in `todos.txt`. On the first load
//! that finds a legacy file but no `todos.json`, the lines are imported as
//! records and the legacy file is renamed to `todos.txt.backup`.
//!
//! Order of operations:
//! 1. Parse the legacy file.
//! 2. Atomically write `todos.json`.
//! 3. Confirm `todos.json` exists, then rename the legacy file.
//!
//! A failure in step 2 leaves nothing behind, so the next load retries from
//! scratch. A failure in step 3 leaves the legacy file in place, but the
//! trigger condition no longer holds, so records are never imported twice.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::error::{FileOp, StorageError, StorageResult};
use super::persistence::{unique_backup_path, JsonPersistence};
use crate::models::Todo;

/// Suffix appended to the legacy file once imported
pub const BACKUP_SUFFIX: &str = "backup";

/// Outcome of a completed migration
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    /// Records written to the structured file
    pub todos: Vec<Todo>,
    /// New location of the legacy file, `None` if it could not be renamed
    pub legacy_backup: Option<PathBuf>,
}

/// Whether the next load should import the legacy file
pub fn needs_migration(persistence: &JsonPersistence) -> bool {
    persistence.config().legacy_path().exists() && !persistence.exists()
}

/// Turn legacy file contents into records
///
/// Blank lines are skipped; ids count non-blank lines from 1.
pub fn parse_legacy(contents: &str, migrated_at: DateTime<Utc>) -> Vec<Todo> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .zip(1..)
        .map(|(line, id)| Todo::with_created_at(id, line, migrated_at))
        .collect()
}

/// Import the legacy file if the trigger condition holds
///
/// Returns `Ok(None)` when there is nothing to migrate.
pub fn migrate_if_needed(persistence: &JsonPersistence) -> StorageResult<Option<MigrationReport>> {
    if !needs_migration(persistence) {
        return Ok(None);
    }

    let legacy_path = persistence.config().legacy_path();
    info!("Migrating legacy todo file {:?}", legacy_path);

    let bytes = fs::read(&legacy_path)
        .map_err(|e| StorageError::io(FileOp::Read, legacy_path.clone(), e))?;
    let todos = parse_legacy(&String::from_utf8_lossy(&bytes), Utc::now());

    persistence.save(&todos)?;

    let legacy_backup = if persistence.exists() {
        let backup = unique_backup_path(&legacy_path, BACKUP_SUFFIX);
        match fs::rename(&legacy_path, &backup) {
            Ok(()) => Some(backup),
            Err(source) => {
                let err = StorageError::LegacyRename {
                    from: legacy_path.clone(),
                    to: backup,
                    source,
                };
                warn!("{}", err);
                None
            }
        }
    } else {
        warn!(
            "Collection file missing after migration write; leaving {:?} in place",
            legacy_path
        );
        None
    };

    info!("Imported {} todo(s) from legacy file", todos.len());

    Ok(Some(MigrationReport {
        todos,
        legacy_backup,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::Priority;
    use crate::storage::LoadStatus;
    use tempfile::TempDir;

    fn setup(legacy: &str) -> (TempDir, JsonPersistence) {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::with_data_dir(temp_dir.path());
        fs::write(config.legacy_path(), legacy).unwrap();
        (temp_dir, JsonPersistence::new(config))
    }

    #[test]
    fn test_parse_legacy_skips_blank_lines() {
        let now = Utc::now();
        let todos = parse_legacy("Buy milk\n\n  \nWalk dog  \r\n\nPay rent\n", now);

        let texts: Vec<_> = todos.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Buy milk", "Walk dog", "Pay rent"]);

        let ids: Vec<_> = todos.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        for todo in &todos {
            assert!(!todo.completed);
            assert_eq!(todo.category, "General");
            assert_eq!(todo.priority, Priority::Medium);
            assert!(todo.due_date.is_none());
            assert_eq!(todo.created_at, now);
        }
    }

    #[test]
    fn test_parse_legacy_empty() {
        assert!(parse_legacy("", Utc::now()).is_empty());
        assert!(parse_legacy("\n \n\t\n", Utc::now()).is_empty());
    }

    #[test]
    fn test_load_migrates_legacy_file() {
        let (_temp_dir, persistence) = setup("first\n\nsecond\n\n\nthird\n");
        let legacy_path = persistence.config().legacy_path();

        let loaded = persistence.load().unwrap();

        assert_eq!(loaded.todos.len(), 3);
        assert_eq!(loaded.todos[2].text, "third");
        assert_eq!(loaded.todos[2].id, 3);

        let LoadStatus::Migrated {
            imported,
            legacy_backup,
        } = loaded.status
        else {
            panic!("expected migration, got {:?}", loaded.status);
        };
        assert_eq!(imported, 3);
        assert!(!legacy_path.exists());
        let backup = legacy_backup.unwrap();
        assert!(backup.ends_with("todos.txt.backup"));
        assert_eq!(
            fs::read_to_string(backup).unwrap(),
            "first\n\nsecond\n\n\nthird\n"
        );

        // Structured file now holds the records
        assert!(persistence.exists());
    }

    #[test]
    fn test_migration_runs_once() {
        let (_temp_dir, persistence) = setup("only task\n");

        persistence.load().unwrap();
        let second = persistence.load().unwrap();

        assert_eq!(second.status, LoadStatus::Existing);
        assert_eq!(second.todos.len(), 1);
    }

    #[test]
    fn test_no_migration_when_structured_file_exists() {
        let (_temp_dir, persistence) = setup("stale line\n");
        persistence.save(&[Todo::new(1, "current")]).unwrap();

        assert!(!needs_migration(&persistence));

        let loaded = persistence.load().unwrap();
        assert_eq!(loaded.status, LoadStatus::Existing);
        assert_eq!(loaded.todos[0].text, "current");
        assert!(persistence.config().legacy_path().exists());
    }

    #[test]
    fn test_existing_backup_is_not_overwritten() {
        let (_temp_dir, persistence) = setup("new import\n");
        let legacy_path = persistence.config().legacy_path();
        let old_backup = PathBuf::from(format!("{}.backup", legacy_path.display()));
        fs::write(&old_backup, "earlier import\n").unwrap();

        let report = migrate_if_needed(&persistence).unwrap().unwrap();

        assert_eq!(fs::read_to_string(&old_backup).unwrap(), "earlier import\n");
        assert!(report.legacy_backup.unwrap().ends_with("todos.txt.backup.1"));
    }

    #[test]
    fn test_failed_migration_reports_and_keeps_legacy() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::with_data_dir(temp_dir.path());
        // A directory in place of the legacy file cannot be read
        fs::create_dir_all(config.legacy_path()).unwrap();
        let persistence = JsonPersistence::new(config);

        let loaded = persistence.load().unwrap();

        assert!(loaded.todos.is_empty());
        assert!(loaded.is_degraded());
        assert!(matches!(loaded.status, LoadStatus::MigrationFailed { .. }));
        // No empty collection is written, so the import is retried next time
        assert!(!persistence.exists());
        assert!(needs_migration(&persistence));

        let warning = loaded.warning().unwrap();
        assert!(warning.contains("Could not import legacy todo file"));
        assert!(warning.contains("no longer be imported automatically"));
    }

    #[test]
    fn test_nothing_to_migrate() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(Config::with_data_dir(temp_dir.path()));

        assert!(migrate_if_needed(&persistence).unwrap().is_none());
    }
}
