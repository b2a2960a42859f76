//! Writer adapter binding the output stream contract to a block file

use std::mem;
use std::sync::Arc;

use crate::error::Result;
use crate::io::IndexOutput;

use super::ram::{DirInner, RamFile, BLOCK_SIZE};

/// Output stream writing directly into the blocks of a not-yet-committed
/// [`RamFile`]. The current block is the buffer; no separate copy exists,
/// which is why external buffers are refused. Dropping the stream commits
/// the file to the directory under its reserved name.
///
/// A caller-visible `flush()` on an exactly full block allocates the next
/// block eagerly; if nothing is written afterwards the committed file
/// carries a trailing empty block. That wastes a little space but breaks
/// nothing, since the logical length never counts it. `seek()` can end up
/// in the same state.
pub(crate) struct RamOutput {
    dir: Arc<DirInner>,
    name: String,
    file: RamFile,
    current_block: usize,
    // window bounds within the current block; bytes before `start` were
    // accounted by an earlier flush
    start: usize,
    cursor: usize,
    pos: u64,
}

impl RamOutput {
    pub(crate) fn new(dir: Arc<DirInner>, name: String) -> Self {
        Self {
            dir,
            name,
            file: RamFile::default(),
            current_block: 0,
            start: 0,
            cursor: 0,
            pos: 0,
        }
    }

    // length is the high-water mark of every position reached
    fn update_length(&mut self) {
        if self.file.length < self.pos {
            self.file.length = self.pos;
        }
    }
}

impl IndexOutput for RamOutput {
    fn has_buffer(&self) -> bool {
        self.file.block_count() > 0
    }

    fn buffer_size(&self) -> usize {
        if self.has_buffer() {
            BLOCK_SIZE
        } else {
            0
        }
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn preferred_buffer_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.update_length();
        assert!(
            pos <= self.file.length,
            "seek past one-past-the-end of the file"
        );
        self.current_block = (pos / BLOCK_SIZE as u64) as usize;
        // seeking to the end of an entirely filled chain lands one block
        // past it; extend, exactly as a full-buffer flush would
        if self.current_block == self.file.block_count() {
            self.file.alloc();
        }
        self.cursor = (pos % BLOCK_SIZE as u64) as usize;
        self.start = self.cursor;
        self.pos = pos;
        Ok(())
    }

    fn writable(&mut self) -> &mut [u8] {
        if self.file.block_count() == 0 {
            return &mut [];
        }
        let cursor = self.cursor;
        &mut self.file.block_mut(self.current_block)[cursor..]
    }

    fn produce(&mut self, n: usize) {
        self.cursor += n;
        self.pos += n as u64;
        debug_assert!(self.cursor <= BLOCK_SIZE);
    }

    fn make_room(&mut self) -> Result<()> {
        if self.file.block_count() == 0 {
            // first write: block 0 becomes the buffer
            self.file.alloc();
            return Ok(());
        }
        // only ever reached with the current block full
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        if self.cursor == self.start {
            return Ok(()); // nothing new since the last flush
        }
        self.update_length();
        if self.cursor == BLOCK_SIZE {
            // block is full: advance, allocating if at the end of the chain
            if self.current_block + 1 == self.file.block_count() {
                self.file.alloc();
            }
            self.current_block += 1;
            self.start = 0;
            self.cursor = 0;
        } else {
            // bytes already live in the block; just shrink the window
            self.start = self.cursor;
        }
        Ok(())
    }
}

impl Drop for RamOutput {
    fn drop(&mut self) {
        self.update_length();
        let file = mem::take(&mut self.file);
        let name = mem::take(&mut self.name);
        self.dir.commit(&name, file);
    }
}
