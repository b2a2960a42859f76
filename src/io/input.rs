//! Sequential decode operations over a buffered source

use crate::error::{Result, StoreError};

use super::base::{DEFAULT_BUFFER_CAPACITY, MAX_VARINT32_LEN, MAX_VARINT64_LEN};

/// Buffered input stream over an index file.
///
/// Implementations provide the buffer surface and the refill protocol
/// ([`pending`](IndexInput::pending), [`consume`](IndexInput::consume),
/// [`fill`](IndexInput::fill)); every decode operation is a provided
/// method built on those, so all implementations share one codec.
///
/// A stream is a single-threaded object; distinct streams over the same
/// file may be used concurrently.
pub trait IndexInput: Send {
    /// Whether a buffer (external or internal) has been attached yet.
    fn has_buffer(&self) -> bool;

    /// Size of the attached buffer, or 0 before attachment.
    fn buffer_size(&self) -> usize;

    /// Logical position in the stream.
    fn position(&self) -> u64;

    /// Whether an external buffer may be installed. Streams that manage
    /// their own storage-backed buffers refuse external ones.
    fn supports_external_buffer(&self) -> bool {
        false
    }

    /// Install a caller-supplied buffer. The stream must not already have
    /// one, and must support external buffers; violating either is a
    /// programming error, not a recoverable fault.
    fn set_external_buffer(&mut self, _buf: Box<[u8]>) {
        panic!("external buffers are not supported by this stream");
    }

    /// Communicate a desired capacity for the internal buffer.
    /// Implementations may ignore it.
    fn hint_buffer_size(&mut self, _hint: usize) {}

    /// An efficient buffer size for the underlying source.
    fn preferred_buffer_size(&self) -> usize {
        DEFAULT_BUFFER_CAPACITY
    }

    /// Reposition the stream.
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// The buffered bytes that have been filled but not yet consumed.
    fn pending(&self) -> &[u8];

    /// Advance past `n` pending bytes.
    fn consume(&mut self, n: usize);

    /// Refill the buffer from the source, attaching the buffer first if
    /// none exists yet. Returns false when the source has no more data.
    /// Must only be called with an empty pending window.
    fn fill(&mut self) -> Result<bool>;

    /// True iff no buffered data remains and a refill yields none.
    fn eof(&mut self) -> Result<bool> {
        if !self.pending().is_empty() {
            return Ok(false);
        }
        Ok(!self.fill()?)
    }

    /// Read the next byte, or fail with `IndexCorruption` at end of data.
    fn read_byte(&mut self) -> Result<u8> {
        if self.eof()? {
            return Err(StoreError::corruption(
                "cannot read a byte, end of stream reached",
            ));
        }
        let byte = self.pending()[0];
        self.consume(1);
        Ok(byte)
    }

    /// Read as many bytes as there are, no more than `dst.len()`. The
    /// count returned is short only at true end of data.
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let mut copied = 0;
        while copied < dst.len() && !self.eof()? {
            let window = self.pending();
            let n = window.len().min(dst.len() - copied);
            dst[copied..copied + n].copy_from_slice(&window[..n]);
            self.consume(n);
            copied += n;
        }
        Ok(copied)
    }

    /// Read a little-endian `u32`, or fail with `IndexCorruption`.
    fn read_fixed32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        if self.read(&mut buf)? < buf.len() {
            return Err(StoreError::corruption(
                "cannot read a fixed 32-bit value, end of stream reached",
            ));
        }
        Ok(u32::from_le_bytes(buf))
    }

    /// Read a little-endian `u64`, or fail with `IndexCorruption`.
    fn read_fixed64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        if self.read(&mut buf)? < buf.len() {
            return Err(StoreError::corruption(
                "cannot read a fixed 64-bit value, end of stream reached",
            ));
        }
        Ok(u64::from_le_bytes(buf))
    }

    /// Decode a LEB128 varint of at most 5 bytes, or fail with
    /// `IndexCorruption`.
    fn read_varint32(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut decoded = 0;
        while decoded < MAX_VARINT32_LEN && !self.eof()? {
            let byte = self.read_byte()?;
            value |= u32::from(byte & 0x7f) << (7 * decoded);
            decoded += 1;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(StoreError::corruption("cannot parse varint32"))
    }

    /// Decode a LEB128 varint of at most 10 bytes, or fail with
    /// `IndexCorruption`.
    fn read_varint64(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut decoded = 0;
        while decoded < MAX_VARINT64_LEN && !self.eof()? {
            let byte = self.read_byte()?;
            value |= u64::from(byte & 0x7f) << (7 * decoded);
            decoded += 1;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(StoreError::corruption("cannot parse varint64"))
    }

    /// Read a varint32 length prefix and that many raw bytes into `buf`,
    /// clearing it first. Takes the destination by reference so one
    /// allocation can serve many reads.
    fn read_string(&mut self, buf: &mut String) -> Result<()> {
        buf.clear();
        let len = self.read_varint32()? as usize;
        let mut bytes = vec![0u8; len];
        if self.read(&mut bytes)? < len {
            return Err(StoreError::corruption(
                "string is truncated, end of stream reached",
            ));
        }
        let s = std::str::from_utf8(&bytes)
            .map_err(|_| StoreError::corruption("string is not valid UTF-8"))?;
        buf.push_str(s);
        Ok(())
    }
}

impl std::fmt::Debug for dyn IndexInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexInput")
            .field("position", &self.position())
            .field("has_buffer", &self.has_buffer())
            .finish_non_exhaustive()
    }
}
