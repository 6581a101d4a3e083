use std::{
    fmt::Display,
    fs::FileType,
    path::{Path, PathBuf},
    str::FromStr,
};

use thiserror::Error;

pub type RelativePath = PathBuf;

#[derive(Eq, PartialEq, Clone, Debug, Copy, Hash)]
pub enum EntryKind {
    File,
    Directory,
    // Only produced when links are not followed (replica side)
    Symlink,
    /// Fifo, socket or device node. Never read, only removed.
    Special,
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::File => f.write_str("file"),
            EntryKind::Directory => f.write_str("directory"),
            EntryKind::Symlink => f.write_str("symlink"),
            EntryKind::Special => f.write_str("special file"),
        }
    }
}

impl From<FileType> for EntryKind {
    fn from(value: FileType) -> Self {
        if value.is_symlink() {
            Self::Symlink
        } else if value.is_dir() {
            Self::Directory
        } else if value.is_file() {
            Self::File
        } else {
            Self::Special
        }
    }
}

impl EntryKind {
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

#[derive(Eq, PartialEq, Clone, Debug, Copy, Default, strum_macros::EnumVariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum ComparisonStrategy {
    /// Size, then modification time, then bytes
    #[default]
    Exact,
    /// Size, then bytes. Modification time is ignored.
    Content,
}

impl Display for ComparisonStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonStrategy::Exact => f.write_str("exact"),
            ComparisonStrategy::Content => f.write_str("content"),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub struct ParseComparisonStrategyError(String);

impl Display for ParseComparisonStrategyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!(
            "Unknown comparison strategy '{}' (expected 'exact' or 'content')",
            self.0
        ))
    }
}

impl FromStr for ComparisonStrategy {
    type Err = ParseComparisonStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "exact" => Ok(Self::Exact),
            "content" => Ok(Self::Content),
            _ => Err(ParseComparisonStrategyError(s.to_string())),
        }
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Hash, strum_macros::Display)]
pub enum ActionKind {
    CreateDir,
    CopyFile,
    UpdateFile,
    DeleteFile,
    DeleteDir,
}

impl ActionKind {
    pub fn is_delete(&self) -> bool {
        matches!(self, ActionKind::DeleteFile | ActionKind::DeleteDir)
    }
}

/// A single mutation of the replica tree, addressed by its path relative to
/// the tree roots.
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum Action {
    CreateDir(RelativePath),
    CopyFile(RelativePath),
    UpdateFile(RelativePath),
    DeleteFile(RelativePath),
    DeleteDir(RelativePath),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::CreateDir(_) => ActionKind::CreateDir,
            Action::CopyFile(_) => ActionKind::CopyFile,
            Action::UpdateFile(_) => ActionKind::UpdateFile,
            Action::DeleteFile(_) => ActionKind::DeleteFile,
            Action::DeleteDir(_) => ActionKind::DeleteDir,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Action::CreateDir(path)
            | Action::CopyFile(path)
            | Action::UpdateFile(path)
            | Action::DeleteFile(path)
            | Action::DeleteDir(path) => path,
        }
    }

    /// Removal action matching the kind of an existing replica entry
    pub fn delete(path: RelativePath, kind: EntryKind) -> Self {
        match kind {
            EntryKind::Directory => Action::DeleteDir(path),
            EntryKind::File | EntryKind::Symlink | EntryKind::Special => {
                Action::DeleteFile(path)
            }
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.path().display())
    }
}
