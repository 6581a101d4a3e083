use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use filetime::FileTime;
use replica_core::report::ActionRecord;
use replica_core::report::PassReport;
use replica_core::types::ActionKind;
use testdir::testdir;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::StorageError;
use crate::journal::Journal;
use crate::storage::Storage;

pub fn tmpdir() -> PathBuf {
    let path = testdir!().join(PathBuf::from(Uuid::new_v4().to_string()));
    fs::create_dir_all(&path).unwrap();
    path
}

/// Create given entries under `root`: a file when content is given, a
/// folder otherwise. Missing parents are created.
pub fn ensure_tree(root: &Path, entries: &[(&str, Option<&str>)]) {
    for (raw_path, content) in entries {
        let absolute_path = root.join(raw_path);
        match content {
            Some(content) => {
                if let Some(parent) = absolute_path.parent() {
                    fs::create_dir_all(parent).unwrap();
                }
                fs::write(&absolute_path, content).unwrap();
            }
            None => fs::create_dir_all(&absolute_path).unwrap(),
        }
    }
}

/// Relative paths under `root` (links not followed), with their content for files
pub fn disk_tree(root: &Path) -> Vec<(String, Option<String>)> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let relative_path = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .display()
                .to_string();
            let content = if entry.file_type().is_dir() {
                None
            } else {
                Some(fs::read_to_string(entry.path()).unwrap())
            };
            (relative_path, content)
        })
        .collect()
}

pub fn set_mtime(path: &Path, unix_seconds: i64) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(unix_seconds, 0)).unwrap();
}

/// Return false if the file is still readable (privileged user)
pub fn make_unreadable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
        fs::File::open(path).is_err()
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        false
    }
}

pub fn make_readable(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = if path.is_dir() { 0o755 } else { 0o644 };
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }
    #[cfg(not(unix))]
    let _ = path;
}

#[cfg(unix)]
pub fn make_fifo(path: &Path) {
    let status = std::process::Command::new("mkfifo")
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success());
}

#[derive(Debug, Clone, PartialEq)]
pub enum JournalEntry {
    Action(ActionRecord),
    Warning(PathBuf, String),
    Summary(PassReport),
}

#[derive(Clone, Default)]
pub struct MemoryJournal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl MemoryJournal {
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// (kind, path, success) of recorded actions
    pub fn actions(&self) -> Vec<(ActionKind, String, bool)> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                JournalEntry::Action(record) => Some((
                    record.kind,
                    record.path.display().to_string(),
                    record.outcome.is_success(),
                )),
                _ => None,
            })
            .collect()
    }

    pub fn summaries(&self) -> Vec<PassReport> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                JournalEntry::Summary(report) => Some(report),
                _ => None,
            })
            .collect()
    }
}

impl Journal for MemoryJournal {
    fn action(&self, record: &ActionRecord) {
        self.entries
            .lock()
            .unwrap()
            .push(JournalEntry::Action(record.clone()))
    }

    fn warning(&self, path: &Path, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push(JournalEntry::Warning(path.to_path_buf(), message.to_string()))
    }

    fn summary(&self, report: &PassReport) {
        self.entries
            .lock()
            .unwrap()
            .push(JournalEntry::Summary(report.clone()))
    }
}

/// Storage failing, as if permission was denied, on one destination path
pub struct FailingStorage<S: Storage> {
    inner: S,
    fail_on: PathBuf,
}

impl<S: Storage> FailingStorage<S> {
    pub fn new(inner: S, fail_on: PathBuf) -> Self {
        Self { inner, fail_on }
    }

    fn check(&self, operation: &'static str, path: &Path) -> Result<(), StorageError> {
        if path == self.fail_on {
            return Err(StorageError::new(
                operation,
                path.to_path_buf(),
                io::Error::new(io::ErrorKind::PermissionDenied, "simulated permission error"),
            ));
        }
        Ok(())
    }
}

impl<S: Storage> Storage for FailingStorage<S> {
    fn create_dir(&self, path: &Path) -> Result<(), StorageError> {
        self.check("Create folder", path)?;
        self.inner.create_dir(path)
    }

    fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), StorageError> {
        self.check("Write", destination)?;
        self.inner.copy_file(source, destination)
    }

    fn remove_file(&self, path: &Path) -> Result<(), StorageError> {
        self.check("Remove file", path)?;
        self.inner.remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> Result<(), StorageError> {
        self.check("Remove folder", path)?;
        self.inner.remove_dir(path)
    }
}
