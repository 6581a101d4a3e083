use std::{
    fs::{self, File},
    io,
    path::Path,
};

use filetime::FileTime;
use tempfile::NamedTempFile;

use crate::error::StorageError;

/// Mutations the reconciler applies on the replica tree. Paths are absolute.
pub trait Storage {
    /// Create one folder. Its parent must already exist.
    fn create_dir(&self, path: &Path) -> Result<(), StorageError>;
    /// Write `source` content at `destination`, replacing any existing file.
    fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), StorageError>;
    fn remove_file(&self, path: &Path) -> Result<(), StorageError>;
    fn remove_dir(&self, path: &Path) -> Result<(), StorageError>;
}

pub struct DiskStorage;

impl Storage for DiskStorage {
    fn create_dir(&self, path: &Path) -> Result<(), StorageError> {
        match fs::create_dir(path) {
            Ok(_) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
            Err(error) => Err(StorageError::new("Create folder", path.to_path_buf(), error)),
        }
    }

    // Content is written in a temporary file next to the destination then
    // renamed over it, so the destination is never left half written.
    fn copy_file(&self, source: &Path, destination: &Path) -> Result<(), StorageError> {
        let read_error = |error| StorageError::new("Read", source.to_path_buf(), error);
        let write_error = |error| StorageError::new("Write", destination.to_path_buf(), error);

        let parent = destination.parent().ok_or_else(|| {
            write_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "destination has no parent folder",
            ))
        })?;
        let mut source_file = File::open(source).map_err(read_error)?;
        let metadata = source_file.metadata().map_err(read_error)?;

        let mut temporary = NamedTempFile::new_in(parent).map_err(write_error)?;
        io::copy(&mut source_file, temporary.as_file_mut()).map_err(write_error)?;
        filetime::set_file_handle_times(
            temporary.as_file(),
            Some(FileTime::from_last_access_time(&metadata)),
            Some(FileTime::from_last_modification_time(&metadata)),
        )
        .map_err(write_error)?;
        temporary
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_error)?;
        temporary
            .persist(destination)
            .map_err(|error| write_error(error.error))?;

        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<(), StorageError> {
        fs::remove_file(path).map_err(|error| StorageError::new("Remove file", path.to_path_buf(), error))
    }

    // Content is expected to be already removed; anything left (appeared
    // since the walk, not readable by the walk) goes with the folder.
    fn remove_dir(&self, path: &Path) -> Result<(), StorageError> {
        fs::remove_dir_all(path)
            .map_err(|error| StorageError::new("Remove folder", path.to_path_buf(), error))
    }
}
