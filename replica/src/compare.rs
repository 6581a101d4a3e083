use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use replica_core::types::ComparisonStrategy;

use crate::{error::ComparisonError, walker::Entry};

const CHUNK_SIZE: usize = 64 * 1024;

/// Decide if a replica file must be rewritten from its source counterpart.
/// Size and modification time are shortcuts to avoid reading; when they do
/// not tell the files apart the bytes are compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct Comparator {
    strategy: ComparisonStrategy,
}

impl Comparator {
    pub fn new(strategy: ComparisonStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ComparisonStrategy {
        self.strategy
    }

    pub fn differs(
        &self,
        source_path: &Path,
        source: &Entry,
        replica_path: &Path,
        replica: &Entry,
    ) -> Result<bool, ComparisonError> {
        if source.size != replica.size {
            return Ok(true);
        }

        if self.strategy == ComparisonStrategy::Exact && source.modified != replica.modified {
            return Ok(true);
        }

        contents_differ(source_path, replica_path)
    }
}

fn open(path: &Path) -> Result<BufReader<File>, ComparisonError> {
    let file = File::open(path).map_err(|source| ComparisonError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::with_capacity(CHUNK_SIZE, file))
}

pub fn contents_differ(left_path: &Path, right_path: &Path) -> Result<bool, ComparisonError> {
    let mut left = open(left_path)?;
    let mut right = open(right_path)?;

    loop {
        let left_buffer = left.fill_buf().map_err(|source| ComparisonError {
            path: left_path.to_path_buf(),
            source,
        })?;
        let right_buffer = right.fill_buf().map_err(|source| ComparisonError {
            path: right_path.to_path_buf(),
            source,
        })?;

        if left_buffer.is_empty() || right_buffer.is_empty() {
            return Ok(left_buffer.len() != right_buffer.len());
        }

        let length = left_buffer.len().min(right_buffer.len());
        if left_buffer[..length] != right_buffer[..length] {
            return Ok(true);
        }

        left.consume(length);
        right.consume(length);
    }
}
