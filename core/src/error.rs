use std::{io, path::PathBuf};

use thiserror::Error;

use crate::types::ParseComparisonStrategyError;

/// Invalid or missing configuration. Raised before the first pass, always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    MissingValue(&'static str),
    #[error("Source folder {} does not exist", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Source {} is not a folder", .0.display())]
    SourceNotADirectory(PathBuf),
    #[error("Replica {} exists but is not a folder", .0.display())]
    ReplicaNotADirectory(PathBuf),
    #[error("Source {} and replica {} must not contain each other", .0.display(), .1.display())]
    Overlapping(PathBuf, PathBuf),
    #[error("Invalid interval '{0}' (expected a positive number of seconds)")]
    InvalidInterval(String),
    #[error("Invalid comparison strategy: {0}")]
    InvalidComparison(#[from] ParseComparisonStrategyError),
    #[error("Unable to read config file {}: {}", .0.display(), .1)]
    ConfigFile(PathBuf, String),
    #[error("Unable to resolve path {}: {}", .0.display(), .1)]
    Io(PathBuf, io::Error),
}
