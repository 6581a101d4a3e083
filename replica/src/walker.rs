use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use replica_core::types::{EntryKind, RelativePath};
use walkdir::WalkDir;

use crate::error::{TraversalError, WalkError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl Entry {
    pub fn new(kind: EntryKind, size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            kind,
            size,
            modified,
        }
    }

    fn from_metadata(kind: EntryKind, metadata: &fs::Metadata) -> Self {
        Self::new(kind, metadata.len(), metadata.modified().ok())
    }
}

/// Entries found under a root, keyed by their path relative to the root.
/// Ordering is component-wise, so a folder always comes before its content.
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: PathBuf,
    entries: BTreeMap<RelativePath, Entry>,
    unreadable: Vec<TraversalError>,
}

impl Snapshot {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            entries: BTreeMap::new(),
            unreadable: vec![],
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &BTreeMap<RelativePath, Entry> {
        &self.entries
    }

    pub fn get(&self, path: &Path) -> Option<&Entry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unreadable(&self) -> &[TraversalError] {
        &self.unreadable
    }

    /// True if the path, or one of its ancestors, could not be read: its
    /// absence from the snapshot says nothing about its existence.
    pub fn is_unreadable(&self, path: &Path) -> bool {
        self.unreadable
            .iter()
            .any(|error| path.starts_with(&error.path))
    }

    pub fn absolute(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn insert(&mut self, path: RelativePath, entry: Entry) {
        self.entries.insert(path, entry);
    }

    pub(crate) fn skip(&mut self, path: RelativePath, message: String) {
        log::debug!("Skip {} in {}: {}", path.display(), self.root.display(), message);
        self.unreadable.push(TraversalError { path, message })
    }
}

pub const UNSUPPORTED_FILE_TYPE: &str = "unsupported file type";

pub struct Walker {
    root: PathBuf,
    follow_links: bool,
    keep_special: bool,
}

impl Walker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            follow_links: false,
            keep_special: false,
        }
    }

    pub fn follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Keep fifos, sockets and device nodes as `EntryKind::Special` entries
    /// instead of reporting them as unreadable. Their content is never read.
    pub fn keep_special(mut self, keep_special: bool) -> Self {
        self.keep_special = keep_special;
        self
    }

    pub fn walk(&self) -> Result<Snapshot, WalkError> {
        self.ensure_root()?;
        let mut snapshot = Snapshot::new(self.root.clone());

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.follow_links)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    let path = error
                        .path()
                        .and_then(|path| path.strip_prefix(&self.root).ok())
                        .map(Path::to_path_buf)
                        .unwrap_or_default();
                    snapshot.skip(path, error.to_string());
                    continue;
                }
            };

            let relative_path = match entry.path().strip_prefix(&self.root) {
                Ok(relative_path) => relative_path.to_path_buf(),
                Err(_) => continue,
            };
            let kind = EntryKind::from(entry.file_type());
            if kind == EntryKind::Special && !self.keep_special {
                snapshot.skip(relative_path, UNSUPPORTED_FILE_TYPE.to_string());
                continue;
            }
            match entry.metadata() {
                Ok(metadata) => snapshot.insert(relative_path, Entry::from_metadata(kind, &metadata)),
                Err(error) => snapshot.skip(relative_path, error.to_string()),
            }
        }

        Ok(snapshot)
    }

    fn ensure_root(&self) -> Result<(), WalkError> {
        match fs::metadata(&self.root) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(WalkError::RootNotADirectory(self.root.clone())),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Err(WalkError::RootNotFound(self.root.clone()))
            }
            Err(error) => Err(WalkError::Root(self.root.clone(), error)),
        }
    }
}
