//! Reader adapter binding the input stream contract to a block file

use std::sync::Arc;

use crate::error::Result;
use crate::io::IndexInput;

use super::ram::{RamFile, BLOCK_SIZE};

/// Input stream over a committed [`RamFile`]. Buffers one block at a time
/// by pointing its window straight at the file's blocks, so external
/// buffers are refused. Holding the stream keeps the file's storage alive
/// even after the name is deleted from the directory.
pub(crate) struct RamInput {
    file: Arc<RamFile>,
    current_block: usize,
    // The chain may hold more blocks than the data needs, so both of
    // these are derived from the logical length, never from block_count
    last_block: usize,
    last_block_bytes: usize,
    cursor: usize,
    sentinel: usize,
    attached: bool,
    pos: u64,
}

impl RamInput {
    pub(crate) fn new(file: Arc<RamFile>) -> Self {
        let length = file.size();
        let (last_block, last_block_bytes) = if length == 0 {
            (0, 0)
        } else {
            (
                ((length - 1) / BLOCK_SIZE as u64) as usize,
                ((length - 1) % BLOCK_SIZE as u64 + 1) as usize,
            )
        };
        Self {
            file,
            current_block: 0,
            last_block,
            last_block_bytes,
            cursor: 0,
            sentinel: 0,
            attached: false,
            pos: 0,
        }
    }

    fn valid_bytes_in(&self, block: usize) -> usize {
        if block == self.last_block {
            self.last_block_bytes
        } else {
            BLOCK_SIZE
        }
    }
}

impl IndexInput for RamInput {
    fn has_buffer(&self) -> bool {
        self.attached
    }

    fn buffer_size(&self) -> usize {
        if self.attached {
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
        let length = self.file.size();
        assert!(pos <= length, "seek past the end of the file");
        if length == 0 {
            self.pos = 0;
            return Ok(());
        }
        let mut block = (pos / BLOCK_SIZE as u64) as usize;
        let mut offset = (pos % BLOCK_SIZE as u64) as usize;
        if block > self.last_block {
            // seek to one-past-the-end of a block-aligned file
            block = self.last_block;
            offset = self.last_block_bytes;
        }
        self.attached = true;
        self.current_block = block;
        self.cursor = offset;
        self.sentinel = self.valid_bytes_in(block);
        self.pos = pos;
        Ok(())
    }

    fn pending(&self) -> &[u8] {
        if !self.attached {
            return &[];
        }
        &self.file.block(self.current_block)[self.cursor..self.sentinel]
    }

    fn consume(&mut self, n: usize) {
        debug_assert!(self.cursor + n <= self.sentinel);
        self.cursor += n;
        self.pos += n as u64;
    }

    fn fill(&mut self) -> Result<bool> {
        debug_assert!(self.pending().is_empty(), "buffer is not empty");
        if self.file.size() == 0 {
            return Ok(false);
        }
        if !self.attached {
            // first use: block 0 becomes the buffer
            self.attached = true;
            self.current_block = 0;
        } else {
            if self.current_block == self.last_block {
                return Ok(false); // end of data
            }
            self.current_block += 1;
        }
        self.cursor = 0;
        self.sentinel = self.valid_bytes_in(self.current_block);
        Ok(true)
    }
}
