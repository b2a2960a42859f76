use thiserror::Error;

/// Main error type for cuttle storage operations.
///
/// These are the recoverable failures a caller is expected to handle.
/// Invariant violations (double buffer attach, reading an uncommitted
/// entry, committing an unreserved name) are programming errors and panic
/// instead of appearing here.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("file already exists: {0}")]
    FileAlreadyExists(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index corruption: {0}")]
    IndexCorruption(String),
}

/// Result type alias for cuttle storage operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Build an `IndexCorruption` error with a descriptive message.
    pub fn corruption(msg: impl Into<String>) -> Self {
        StoreError::IndexCorruption(msg.into())
    }

    /// Check if this error means the named file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::FileNotFound(_))
    }

    /// Check if this error indicates a malformed stored file.
    pub fn is_corruption(&self) -> bool {
        matches!(self, StoreError::IndexCorruption(_))
    }
}
