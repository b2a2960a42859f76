//! Directory abstraction over named index files

use crate::error::Result;
use crate::io::{IndexInput, IndexOutput};

/// A flat collection of named files (no sub-folder hierarchy).
///
/// Implementations must comply with the following:
/// - A file is created with [`create_output`](Directory::create_output),
///   written to, then closed.
/// - A file open for writing is not available for reading until its
///   output stream is closed.
/// - Once created, a file may only be opened for input or deleted;
///   creating an output for an existing name fails.
pub trait Directory: Send + Sync {
    /// Names of all files stored in this directory, committed or still
    /// being written.
    fn list_all(&self) -> Result<Vec<String>>;

    /// Remove an existing file. Fails with `FileNotFound` if `name` does
    /// not exist. Readers that already opened the file keep their view;
    /// the storage is released once the last of them closes.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// Byte length of a file. Fails with `FileNotFound` if `name` does
    /// not exist.
    fn file_length(&self, name: &str) -> Result<u64>;

    /// Create a new, empty file and return a stream for writing it. The
    /// name is reserved immediately; the content becomes visible to
    /// readers when the stream is closed. Fails with `FileAlreadyExists`
    /// if the name is occupied.
    fn create_output(&self, name: &str) -> Result<Box<dyn IndexOutput>>;

    /// Rename `src` to `dst`, which must not exist.
    fn rename(&self, src: &str, dst: &str) -> Result<()>;

    /// Open an existing file for reading. Fails with `FileNotFound` if
    /// `name` does not exist. A name may exist but still be mid-write;
    /// reading it is a logic error, not a recoverable fault.
    fn open_input(&self, name: &str) -> Result<Box<dyn IndexInput>>;

    /// Try to acquire the named directory lock without blocking. Returns
    /// `None` immediately if somebody else holds the name. Dropping the
    /// returned handle releases the lock.
    fn obtain_lock(&self, name: &str) -> Result<Option<Box<dyn LockFile>>>;

    /// Whether the named file exists. Never fails.
    fn file_exists(&self, name: &str) -> bool;

    /// Remove every file whose name starts with `prefix`, without
    /// failing. Intended for cleanup after an unrecoverable error while
    /// writing a segment's files. No-op by default.
    fn delete_segment(&self, _prefix: &str) {}
}

/// A held directory lock. The lifetime of a handle is managed only by
/// [`Directory::obtain_lock`] and drop: dropping it releases the lock.
pub trait LockFile: Send {
    /// Name of the lock entry in the directory.
    fn name(&self) -> &str;
}
