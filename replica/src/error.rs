use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Root folder {} not found", .0.display())]
    RootNotFound(PathBuf),
    #[error("Root {} is not a folder", .0.display())]
    RootNotADirectory(PathBuf),
    #[error("Unable to read root {}: {}", .0.display(), .1)]
    Root(PathBuf, io::Error),
}

/// An entry which could not be read during a walk. The entry (and its
/// descendants) are absent from the snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unable to read {}: {message}", .path.display())]
pub struct TraversalError {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Error)]
#[error("{operation} {}: {source}", .path.display())]
pub struct StorageError {
    pub operation: &'static str,
    pub path: PathBuf,
    pub source: io::Error,
}

impl StorageError {
    pub fn new(operation: &'static str, path: PathBuf, source: io::Error) -> Self {
        Self {
            operation,
            path,
            source,
        }
    }
}

#[derive(Debug, Error)]
#[error("Unable to compare {}: {source}", .path.display())]
pub struct ComparisonError {
    pub path: PathBuf,
    pub source: io::Error,
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Source tree unavailable: {0}")]
    Source(WalkError),
    #[error("Replica tree unavailable: {0}")]
    Replica(WalkError),
    #[error("Unable to create replica root {}: {}", .0.display(), .1)]
    ReplicaRoot(PathBuf, io::Error),
}
