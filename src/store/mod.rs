//! Virtual file directories for index storage
//!
//! A [`Directory`] is a flat collection of named files with atomic
//! create/commit, reference-counted concurrent reads, and non-blocking
//! directory locks. [`RamDirectory`] is the in-memory reference
//! implementation; any persistent backend must preserve the same
//! contract.

mod directory;
mod ram;
mod ram_input;
mod ram_output;

pub use directory::*;
pub use ram::*;
