pub mod config;
pub mod error;
pub mod io;
pub mod store;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use io::{IndexInput, IndexOutput};
pub use store::{Directory, LockFile, RamDirectory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
