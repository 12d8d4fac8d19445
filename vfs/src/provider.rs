use std::io::{Read, Seek};

use crate::VfsError;

/// A readable, seekable handle returned by [`VfsProvider::open`].
///
/// Mesh containers keep their directory at the end of the file, so every
/// handle must support random access.
pub trait VfsFile: Read + Seek + Send {}

impl<T: Read + Seek + Send> VfsFile for T {}

/// Trait for file resolution backends.
///
/// All operations are blocking and run to completion on the calling thread.
///
/// # Path Contract
///
/// Paths passed to provider methods are already normalized by the [`Vfs`](crate::Vfs)
/// router: forward slashes, no leading/trailing slashes, no `..` or `.` segments.
/// The path is relative to the provider's root (the source prefix has been stripped).
pub trait VfsProvider: Send + Sync + 'static {
    /// Open a file for reading.
    ///
    /// Returns [`VfsError::NotFound`] if no file exists at `path`.
    fn open(&self, path: &str) -> Result<Box<dyn VfsFile>, VfsError>;

    /// Check whether a file exists at the given path.
    fn exists(&self, path: &str) -> Result<bool, VfsError>;

    /// List the immediate children of a directory.
    ///
    /// Returns file and directory names (not full paths), sorted.
    /// Returns an empty vec for non-existent directories.
    fn list_dir(&self, path: &str) -> Result<Vec<String>, VfsError>;

    /// Human-readable location of `path`, for log messages.
    fn describe(&self, path: &str) -> String {
        path.to_owned()
    }
}
