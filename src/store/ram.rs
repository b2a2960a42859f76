//! In-memory directory backed by block-chunked files
//!
//! One mutex guards the name table and nothing else: it is held for table
//! lookups and updates only, never during block I/O or while storage is
//! being freed. Committed file content is immutable, so any number of
//! readers may share a file across threads without further locking.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::io::{IndexInput, IndexOutput};

use super::directory::{Directory, LockFile};
use super::ram_input::RamInput;
use super::ram_output::RamOutput;

/// Size in bytes of one storage block.
pub(crate) const BLOCK_SIZE: usize = 4096;

/// One file's bytes as a chain of fixed-size blocks plus a logical length.
///
/// A file is mutable only while its writer owns it exclusively. Committing
/// moves it behind an `Arc`; from then on the blocks and length never
/// change, and the storage lives until the table entry and every reader
/// are gone.
#[derive(Default)]
pub(crate) struct RamFile {
    blocks: Vec<Box<[u8]>>,
    pub(crate) length: u64,
}

impl RamFile {
    /// Append one zeroed block to the chain.
    pub(crate) fn alloc(&mut self) {
        self.blocks.push(vec![0u8; BLOCK_SIZE].into_boxed_slice());
    }

    pub(crate) fn size(&self) -> u64 {
        self.length
    }

    pub(crate) fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub(crate) fn block(&self, index: usize) -> &[u8] {
        &self.blocks[index]
    }

    pub(crate) fn block_mut(&mut self, index: usize) -> &mut [u8] {
        &mut self.blocks[index]
    }
}

/// State of one name in the directory table.
pub(crate) enum Entry {
    /// Name reserved by an in-progress writer or a held lock; not backed
    /// by readable content yet.
    Pending,
    /// Name bound to committed, immutable file content.
    Committed(Arc<RamFile>),
}

/// Table shared between the directory handle and the stream/lock objects
/// that outlive a single call.
#[derive(Default)]
pub(crate) struct DirInner {
    files: Mutex<HashMap<String, Entry>>,
}

impl DirInner {
    /// Install a finished file under its reserved name. After this its
    /// content is visible to readers and can no longer change. Committing
    /// a name that was never reserved means the table invariants are
    /// broken.
    pub(crate) fn commit(&self, name: &str, file: RamFile) {
        let length = file.size();
        let file = Arc::new(file);
        let mut files = self.files.lock();
        match files.get_mut(name) {
            Some(entry @ Entry::Pending) => *entry = Entry::Committed(file),
            _ => panic!("commit of file {name:?} which was never reserved"),
        }
        drop(files);
        debug!("committed file {name:?} ({length} bytes)");
    }

    /// Remove a lock's pending entry. Never fails: a missing entry is
    /// logged and ignored.
    pub(crate) fn release_lock(&self, name: &str) {
        let mut files = self.files.lock();
        match files.remove(name) {
            Some(Entry::Pending) => {}
            Some(Entry::Committed(_)) => {
                panic!("lock entry {name:?} resolved to a committed file")
            }
            None => {
                drop(files);
                warn!("lock entry {name:?} missing at release; directory table may be corrupted");
            }
        }
    }
}

/// In-memory [`Directory`] storing each file as a chain of 4 KiB blocks.
///
/// Entirely transient: nothing is persisted. Cloning yields another
/// handle to the same directory.
#[derive(Clone, Default)]
pub struct RamDirectory {
    inner: Arc<DirInner>,
}

impl RamDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Directory for RamDirectory {
    fn list_all(&self) -> Result<Vec<String>> {
        let files = self.inner.files.lock();
        Ok(files.keys().cloned().collect())
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let removed = {
            let mut files = self.inner.files.lock();
            files.remove(name)
        };
        // `removed` holds the last table reference; if no reader shares
        // the file, it is freed here, after the lock is released
        match removed {
            Some(Entry::Committed(_)) => Ok(()),
            Some(Entry::Pending) => {
                panic!("attempt to delete file {name:?} before it was committed")
            }
            None => Err(StoreError::FileNotFound(name.to_string())),
        }
    }

    fn file_length(&self, name: &str) -> Result<u64> {
        let files = self.inner.files.lock();
        match files.get(name) {
            Some(Entry::Committed(file)) => Ok(file.size()),
            // reserved but not yet committed: no content yet
            Some(Entry::Pending) => Ok(0),
            None => Err(StoreError::FileNotFound(name.to_string())),
        }
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn IndexOutput>> {
        let mut files = self.inner.files.lock();
        if files.contains_key(name) {
            return Err(StoreError::FileAlreadyExists(name.to_string()));
        }
        files.insert(name.to_string(), Entry::Pending);
        drop(files);
        Ok(Box::new(RamOutput::new(
            Arc::clone(&self.inner),
            name.to_string(),
        )))
    }

    fn rename(&self, src: &str, dst: &str) -> Result<()> {
        let mut files = self.inner.files.lock();
        match files.remove(src) {
            None => Err(StoreError::FileNotFound(src.to_string())),
            Some(entry) => {
                if files.contains_key(dst) {
                    files.insert(src.to_string(), entry);
                    return Err(StoreError::FileAlreadyExists(dst.to_string()));
                }
                files.insert(dst.to_string(), entry);
                Ok(())
            }
        }
    }

    fn open_input(&self, name: &str) -> Result<Box<dyn IndexInput>> {
        let file = {
            let files = self.inner.files.lock();
            match files.get(name) {
                Some(Entry::Committed(file)) => Arc::clone(file),
                Some(Entry::Pending) => {
                    panic!("attempt to read file {name:?} before it was committed")
                }
                None => return Err(StoreError::FileNotFound(name.to_string())),
            }
        };
        Ok(Box::new(RamInput::new(file)))
    }

    fn obtain_lock(&self, name: &str) -> Result<Option<Box<dyn LockFile>>> {
        let mut files = self.inner.files.lock();
        if files.contains_key(name) {
            // somebody already holds the name
            return Ok(None);
        }
        files.insert(name.to_string(), Entry::Pending);
        drop(files);
        Ok(Some(Box::new(RamLock {
            dir: Arc::clone(&self.inner),
            name: name.to_string(),
        })))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.inner.files.lock().contains_key(name)
    }

    fn delete_segment(&self, prefix: &str) {
        let mut removed = Vec::new();
        {
            let mut files = self.inner.files.lock();
            let names: Vec<String> = files
                .keys()
                .filter(|name| name.starts_with(prefix))
                .cloned()
                .collect();
            for name in names {
                if let Some(entry) = files.remove(&name) {
                    removed.push((name, entry));
                }
            }
        }
        for (name, entry) in &removed {
            if matches!(entry, Entry::Pending) {
                warn!("segment delete removed {name:?} while it was still being written");
            }
        }
        debug!("deleted {} files with prefix {prefix:?}", removed.len());
        // entries (and unshared file storage) dropped here, outside the lock
    }
}

/// Lock handle for a [`RamDirectory`]; dropping it removes the pending
/// table entry it owns.
pub(crate) struct RamLock {
    dir: Arc<DirInner>,
    name: String,
}

impl LockFile for RamLock {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RamLock {
    fn drop(&mut self) {
        self.dir.release_lock(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_commit_open() {
        let dir = RamDirectory::new();
        {
            let mut out = dir.create_output("f").unwrap();
            out.write_string("hello").unwrap();
        }
        assert!(dir.file_exists("f"));
        let mut input = dir.open_input("f").unwrap();
        let mut buf = String::new();
        input.read_string(&mut buf).unwrap();
        assert_eq!(buf, "hello");
        assert!(input.eof().unwrap());
    }

    #[test]
    fn test_pending_entry_is_listed_with_zero_length() {
        let dir = RamDirectory::new();
        let out = dir.create_output("pending").unwrap();
        assert!(dir.file_exists("pending"));
        assert_eq!(dir.file_length("pending").unwrap(), 0);
        assert_eq!(dir.list_all().unwrap(), vec!["pending".to_string()]);
        drop(out);
    }

    #[test]
    #[should_panic(expected = "before it was committed")]
    fn test_open_pending_entry_panics() {
        let dir = RamDirectory::new();
        let _out = dir.create_output("mid-write").unwrap();
        let _ = dir.open_input("mid-write");
    }

    #[test]
    #[should_panic(expected = "never reserved")]
    fn test_commit_unreserved_name_panics() {
        let inner = DirInner::default();
        inner.commit("ghost", RamFile::default());
    }

    #[test]
    fn test_rename_keeps_content_and_errors() {
        let dir = RamDirectory::new();
        {
            let mut out = dir.create_output("a").unwrap();
            out.write_fixed32(42).unwrap();
        }
        {
            let mut out = dir.create_output("b").unwrap();
            out.write_fixed32(7).unwrap();
        }
        assert!(dir.rename("missing", "c").unwrap_err().is_not_found());
        assert!(matches!(
            dir.rename("a", "b"),
            Err(StoreError::FileAlreadyExists(_))
        ));
        // failed renames must leave the table untouched
        assert!(dir.file_exists("a"));
        dir.rename("a", "c").unwrap();
        assert!(!dir.file_exists("a"));
        let mut input = dir.open_input("c").unwrap();
        assert_eq!(input.read_fixed32().unwrap(), 42);
    }

    #[test]
    fn test_empty_committed_file_reads_as_eof() {
        let dir = RamDirectory::new();
        drop(dir.create_output("empty").unwrap());
        assert_eq!(dir.file_length("empty").unwrap(), 0);
        let mut input = dir.open_input("empty").unwrap();
        assert!(input.eof().unwrap());
        let mut buf = [0u8; 4];
        assert_eq!(input.read(&mut buf).unwrap(), 0);
    }
}
