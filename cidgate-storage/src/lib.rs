//! CidGate Block Storage
//!
//! Provides storage abstractions and implementations:
//! - `BlockStore` trait for pluggable block storage
//! - `RocksDbStore` for production block storage
//! - `MemoryStore` for testing

pub mod backend;
pub mod memory;
pub mod rocks;

pub use backend::BlockStore;
pub use memory::MemoryStore;
pub use rocks::RocksDbStore;

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path to the storage directory
    pub path: std::path::PathBuf,

    /// Enable compression for stored blocks
    pub compression: bool,

    /// Cache size in bytes for the RocksDB block cache
    pub cache_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: std::path::PathBuf::from("./data/blocks"),
            compression: true,
            cache_size: 128 * 1024 * 1024, // 128 MB
        }
    }
}

impl StorageConfig {
    /// Create a new storage config with the given path
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set cache size
    pub fn with_cache_size(mut self, bytes: usize) -> Self {
        self.cache_size = bytes;
        self
    }

    /// Enable/disable compression
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }
}
