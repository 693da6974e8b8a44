use std::error;
use std::fmt;
use std::io;

pub mod entry;
pub mod store;
pub mod trajectory_cache;

pub use entry::CacheEntry;
pub use store::{FileStore, MemoryStore, PersistentStore};
pub use trajectory_cache::{TrajectoryCache, CACHE_PREFIX, DEFAULT_TTL_HOURS};

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Serialization(serde_json::Error),
    Other(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl error::Error for StoreError {}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "storage error: {}", e),
            StoreError::Serialization(e) => write!(f, "serialization error: {}", e),
            StoreError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e)
    }
}
