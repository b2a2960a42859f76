use serde::{Deserialize, Serialize};

use crate::io::DEFAULT_BUFFER_CAPACITY;

/// Tuning knobs for buffered stream I/O.
///
/// Only streams that allocate their own buffer consult this; the in-memory
/// block streams always buffer one block at a time regardless.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Capacity in bytes of lazily-allocated internal stream buffers
    pub buffer_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}
