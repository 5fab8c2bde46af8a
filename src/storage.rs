//! Local key-value persistence.
//!
//! Each key maps to one JSON document. The task store writes whole lists under
//! fixed keys; this module only moves strings in and out of storage.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use chrono::Utc;

use crate::error::PersistenceError;

/// Key holding the active task list.
pub const TASKS_KEY: &str = "tasks";
/// Key holding the completed task list (separate-list model only).
pub const COMPLETED_TASKS_KEY: &str = "completedTasks";

/// String-keyed storage of JSON documents.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replace the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Move an unreadable value out of the way so a later `set` cannot clobber it.
    fn quarantine(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Fresh `<key>.<millis>.corrupt` path; earlier quarantined files are never reused.
    fn corrupt_path(&self, key: &str) -> PathBuf {
        let mut stamp = Utc::now().timestamp_millis();
        loop {
            let candidate = self.dir.join(format!("{}.{}.corrupt", key, stamp));
            if !candidate.exists() {
                return candidate;
            }
            stamp += 1;
        }
    }

    fn io_err(key: &str) -> impl FnOnce(io::Error) -> PersistenceError + '_ {
        move |source| PersistenceError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let mut buf = String::new();
        File::open(&path)
            .and_then(|mut f| f.read_to_string(&mut buf))
            .map_err(Self::io_err(key))?;
        Ok(Some(buf))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(Self::io_err(key))?;
        let path = self.path_for(key);
        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let write = || -> io::Result<()> {
            let mut f = File::create(&tmp)?;
            f.write_all(value.as_bytes())?;
            f.flush()?;
            fs::rename(&tmp, &path)
        };
        write().map_err(Self::io_err(key))
    }

    fn quarantine(&mut self, key: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(());
        }
        let target = self.corrupt_path(key);
        fs::rename(&path, target).map_err(Self::io_err(key))
    }
}

#[cfg(test)]
pub mod memory {
    //! In-memory store for tests.

    use std::collections::HashMap;
    use std::io;

    use super::KeyValueStore;
    use crate::error::PersistenceError;

    #[derive(Debug, Default)]
    pub struct MemoryStore {
        pub entries: HashMap<String, String>,
        pub quarantined: HashMap<String, String>,
        pub fail_writes: bool,
        pub writes: usize,
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            Ok(self.entries.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
            if self.fail_writes {
                return Err(PersistenceError::Io {
                    key: key.to_string(),
                    source: io::Error::new(io::ErrorKind::Other, "disk full"),
                });
            }
            self.writes += 1;
            self.entries.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn quarantine(&mut self, key: &str) -> Result<(), PersistenceError> {
            if let Some(value) = self.entries.remove(key) {
                self.quarantined.insert(key.to_string(), value);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get(TASKS_KEY).unwrap().is_none());
    }

    #[test]
    fn set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested"));
        store.set(TASKS_KEY, "[]").unwrap();
        assert_eq!(store.get(TASKS_KEY).unwrap().as_deref(), Some("[]"));
        assert!(!store.path_for(TASKS_KEY).with_extension("json.tmp").exists());
    }

    #[test]
    fn quarantine_moves_file_aside() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set(COMPLETED_TASKS_KEY, "{not json").unwrap();
        store.quarantine(COMPLETED_TASKS_KEY).unwrap();
        assert!(store.get(COMPLETED_TASKS_KEY).unwrap().is_none());
        let moved = corrupt_files(dir.path(), COMPLETED_TASKS_KEY);
        assert_eq!(moved, vec!["{not json".to_string()]);
    }

    fn corrupt_files(dir: &std::path::Path, key: &str) -> Vec<String> {
        let mut contents: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| {
                let name = p.file_name().unwrap().to_string_lossy().into_owned();
                name.starts_with(&format!("{}.", key)) && name.ends_with(".corrupt")
            })
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();
        contents.sort();
        contents
    }

    #[test]
    fn repeated_quarantine_keeps_every_payload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set(TASKS_KEY, "first bad").unwrap();
        store.quarantine(TASKS_KEY).unwrap();
        store.set(TASKS_KEY, "second bad").unwrap();
        store.quarantine(TASKS_KEY).unwrap();
        assert_eq!(
            corrupt_files(dir.path(), TASKS_KEY),
            vec!["first bad".to_string(), "second bad".to_string()]
        );
    }
}
