//! Buffered binary stream I/O for index files
//!
//! Every read and write goes through a buffer. A stream starts with no
//! buffer; one is attached exactly once, either externally (for streams
//! that allow it) or allocated internally on first use. The codec layer
//! (fixed-width little-endian integers, LEB128 varints, length-prefixed
//! strings) is shared by all implementations as provided trait methods,
//! so any two backends produce bit-identical files.

mod base;
mod buffered;
mod input;
mod output;

pub use base::*;
pub use buffered::*;
pub use input::*;
pub use output::*;
