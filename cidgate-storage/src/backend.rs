//! Block store trait
//!
//! Defines the interface the DAG layer requires from persistence. Keys are
//! opaque bytes (in practice the 64 hex characters of a CID) and values are
//! node serializations; the store never parses what it holds.

use bytes::Bytes;
use cidgate_core::error::Result;

/// Byte-keyed block store
///
/// Implementations must be safe for concurrent use. Because keys are
/// content hashes, repeating a put with the same key and value is
/// idempotent; last write wins if values differ.
pub trait BlockStore: Send + Sync {
    /// Store a block under `key`
    fn put(&self, key: &[u8], value: Bytes) -> Result<()>;

    /// Retrieve a block, or `None` when the key is absent
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>>;

    /// Check whether a block exists
    fn exists(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Flush any pending writes to the backing medium
    fn flush(&self) -> Result<()>;

    /// Release backing resources. Subsequent calls on the store fail.
    fn close(&self) -> Result<()>;
}
