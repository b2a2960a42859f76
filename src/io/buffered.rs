//! Generic buffered streams over pluggable byte sinks and sources
//!
//! These are the stream implementations that honor externally-supplied
//! buffers and buffer-size hints; a persistent directory backend plugs in
//! here by implementing [`WriteSink`] and [`ReadSource`]. The in-memory
//! block streams bypass this layer entirely and buffer one block at a
//! time.

use tracing::warn;

use crate::error::Result;

use super::base::{StreamBuffer, DEFAULT_BUFFER_CAPACITY};
use super::input::IndexInput;
use super::output::IndexOutput;

/// Destination for flushed output buffers.
pub trait WriteSink: Send {
    /// Write every byte of `data` at the sink's current position.
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Reposition the sink.
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// Durability barrier. No-op by default.
    fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    /// An efficient buffer size for this sink.
    fn preferred_buffer_size(&self) -> usize {
        DEFAULT_BUFFER_CAPACITY
    }
}

/// Source of bytes for input buffer refills.
pub trait ReadSource: Send {
    /// Read up to `dst.len()` bytes at the source's current position,
    /// returning the count read. 0 means end of data.
    fn read(&mut self, dst: &mut [u8]) -> Result<usize>;

    /// Reposition the source.
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// An efficient buffer size for this source.
    fn preferred_buffer_size(&self) -> usize {
        DEFAULT_BUFFER_CAPACITY
    }
}

/// Buffered [`IndexOutput`] over a [`WriteSink`].
pub struct BufferedOutput<S: WriteSink> {
    sink: S,
    buffer: StreamBuffer,
    hint: Option<usize>,
}

impl<S: WriteSink> BufferedOutput<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            buffer: StreamBuffer::new(),
            hint: None,
        }
    }

    /// Create a stream whose internal buffer capacity follows `config`.
    pub fn with_config(sink: S, config: &crate::config::StoreConfig) -> Self {
        Self {
            sink,
            buffer: StreamBuffer::new(),
            hint: Some(config.buffer_capacity),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn flush_filled(&mut self) -> Result<()> {
        let data = self.buffer.filled();
        if !data.is_empty() {
            self.sink.write_all(data)?;
            self.buffer.reset_write_window();
        }
        Ok(())
    }
}

impl<S: WriteSink> IndexOutput for BufferedOutput<S> {
    fn has_buffer(&self) -> bool {
        self.buffer.has_buffer()
    }

    fn buffer_size(&self) -> usize {
        self.buffer.buffer_size()
    }

    fn position(&self) -> u64 {
        self.buffer.position()
    }

    fn supports_external_buffer(&self) -> bool {
        true
    }

    fn set_external_buffer(&mut self, buf: Box<[u8]>) {
        self.buffer.attach(buf);
    }

    fn hint_buffer_size(&mut self, hint: usize) {
        if !self.buffer.has_buffer() {
            self.hint = Some(hint);
        }
    }

    fn preferred_buffer_size(&self) -> usize {
        self.sink.preferred_buffer_size()
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.flush_filled()?;
        self.sink.seek(pos)?;
        self.buffer.set_position(pos);
        Ok(())
    }

    fn writable(&mut self) -> &mut [u8] {
        self.buffer.writable()
    }

    fn produce(&mut self, n: usize) {
        self.buffer.produce(n);
    }

    fn make_room(&mut self) -> Result<()> {
        if !self.buffer.has_buffer() {
            let capacity = self
                .hint
                .unwrap_or_else(|| self.sink.preferred_buffer_size());
            self.buffer.attach(vec![0u8; capacity].into_boxed_slice());
            return Ok(());
        }
        self.flush_filled()
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_filled()
    }

    fn sync(&mut self) -> Result<()> {
        self.flush_filled()?;
        self.sink.sync()
    }
}

impl<S: WriteSink> Drop for BufferedOutput<S> {
    fn drop(&mut self) {
        if let Err(err) = self.flush_filled() {
            warn!("failed to flush buffered output on close: {err}");
        }
    }
}

/// Buffered [`IndexInput`] over a [`ReadSource`].
pub struct BufferedInput<S: ReadSource> {
    source: S,
    buffer: StreamBuffer,
    hint: Option<usize>,
}

impl<S: ReadSource> BufferedInput<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: StreamBuffer::new(),
            hint: None,
        }
    }

    /// Create a stream whose internal buffer capacity follows `config`.
    pub fn with_config(source: S, config: &crate::config::StoreConfig) -> Self {
        Self {
            source,
            buffer: StreamBuffer::new(),
            hint: Some(config.buffer_capacity),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: ReadSource> IndexInput for BufferedInput<S> {
    fn has_buffer(&self) -> bool {
        self.buffer.has_buffer()
    }

    fn buffer_size(&self) -> usize {
        self.buffer.buffer_size()
    }

    fn position(&self) -> u64 {
        self.buffer.position()
    }

    fn supports_external_buffer(&self) -> bool {
        true
    }

    fn set_external_buffer(&mut self, buf: Box<[u8]>) {
        self.buffer.attach(buf);
    }

    fn hint_buffer_size(&mut self, hint: usize) {
        if !self.buffer.has_buffer() {
            self.hint = Some(hint);
        }
    }

    fn preferred_buffer_size(&self) -> usize {
        self.source.preferred_buffer_size()
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.source.seek(pos)?;
        if self.buffer.has_buffer() {
            // unread buffered data no longer matches the stream position
            self.buffer.reset_read_window(0);
        }
        self.buffer.set_position(pos);
        Ok(())
    }

    fn pending(&self) -> &[u8] {
        self.buffer.readable()
    }

    fn consume(&mut self, n: usize) {
        self.buffer.consume(n);
    }

    fn fill(&mut self) -> Result<bool> {
        if !self.buffer.has_buffer() {
            let capacity = self
                .hint
                .unwrap_or_else(|| self.source.preferred_buffer_size());
            self.buffer.attach(vec![0u8; capacity].into_boxed_slice());
        }
        debug_assert!(self.buffer.readable().is_empty(), "buffer is not empty");
        let n = self.source.read(self.buffer.refill_target())?;
        self.buffer.reset_read_window(n);
        Ok(n > 0)
    }
}
