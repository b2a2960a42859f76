//! Sequential encode operations over a buffered sink

use crate::error::Result;

use super::base::{
    copy_short, encode_varint32, encode_varint64, DEFAULT_BUFFER_CAPACITY, MAX_VARINT32_LEN,
    MAX_VARINT64_LEN,
};

/// Buffered output stream over an index file.
///
/// Implementations provide the buffer surface and the growth protocol
/// ([`writable`](IndexOutput::writable), [`produce`](IndexOutput::produce),
/// [`make_room`](IndexOutput::make_room)); every encode operation is a
/// provided method built on those. Writes larger than the remaining buffer
/// space copy what fits, flush, and continue with the remainder.
pub trait IndexOutput: Send {
    /// Whether a buffer (external or internal) has been attached yet.
    fn has_buffer(&self) -> bool;

    /// Size of the attached buffer, or 0 before attachment.
    fn buffer_size(&self) -> usize;

    /// Logical position in the stream.
    fn position(&self) -> u64;

    /// Whether an external buffer may be installed.
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

    /// An efficient buffer size for the underlying sink.
    fn preferred_buffer_size(&self) -> usize {
        DEFAULT_BUFFER_CAPACITY
    }

    /// Reposition the stream. Buffered bytes are flushed first.
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// The unused buffer space after the cursor.
    fn writable(&mut self) -> &mut [u8];

    /// Advance the cursor past `n` freshly written bytes.
    fn produce(&mut self, n: usize);

    /// Make the writable window non-empty: attach the buffer on first
    /// write, otherwise flush the full buffer.
    fn make_room(&mut self) -> Result<()>;

    /// Force buffered bytes to the backing store, if any.
    fn flush(&mut self) -> Result<()>;

    /// Flush and ask the backing store for durability. Backends with no
    /// stronger guarantee just flush.
    fn sync(&mut self) -> Result<()> {
        self.flush()
    }

    /// Write one byte.
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.writable().is_empty() {
            self.make_room()?;
        }
        self.writable()[0] = byte;
        self.produce(1);
        Ok(())
    }

    /// Write all of `src`, flushing as often as the buffer fills.
    fn write(&mut self, src: &[u8]) -> Result<()> {
        let mut src = src;
        while !src.is_empty() {
            if self.writable().is_empty() {
                self.make_room()?;
            }
            let window = self.writable();
            let n = window.len().min(src.len());
            copy_short(window, &src[..n]);
            self.produce(n);
            src = &src[n..];
        }
        Ok(())
    }

    /// Write a `u32` as 4 little-endian bytes.
    fn write_fixed32(&mut self, value: u32) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    /// Write a `u64` as 8 little-endian bytes.
    fn write_fixed64(&mut self, value: u64) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    /// Write a `u32` as a LEB128 varint (at most 5 bytes).
    fn write_varint32(&mut self, value: u32) -> Result<()> {
        let mut buf = [0u8; MAX_VARINT32_LEN];
        let n = encode_varint32(value, &mut buf);
        self.write(&buf[..n])
    }

    /// Write a `u64` as a LEB128 varint (at most 10 bytes).
    fn write_varint64(&mut self, value: u64) -> Result<()> {
        let mut buf = [0u8; MAX_VARINT64_LEN];
        let n = encode_varint64(value, &mut buf);
        self.write(&buf[..n])
    }

    /// Write a varint32 byte-length prefix followed by the raw bytes.
    fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_varint32(value.len() as u32)?;
        self.write(value.as_bytes())
    }
}
