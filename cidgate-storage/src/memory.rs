//! In-memory block store
//!
//! Used for testing and development. Not persistent.

use crate::backend::BlockStore;
use bytes::Bytes;
use cidgate_core::error::{CidGateError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory block store
pub struct MemoryStore {
    blocks: RwLock<HashMap<Vec<u8>, Bytes>>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of blocks currently stored
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    /// Whether the store holds no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    /// Clear all stored blocks
    pub fn clear(&self) {
        self.blocks.write().clear();
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CidGateError::Storage("store is closed".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for MemoryStore {
    fn put(&self, key: &[u8], value: Bytes) -> Result<()> {
        self.ensure_open()?;
        self.blocks.write().insert(key.to_vec(), value);
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.ensure_open()?;
        Ok(self.blocks.read().get(key).cloned())
    }

    fn exists(&self, key: &[u8]) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.blocks.read().contains_key(key))
    }

    fn flush(&self) -> Result<()> {
        self.ensure_open()
    }

    fn close(&self) -> Result<()> {
        self.ensure_open()?;
        self.closed.store(true, Ordering::SeqCst);
        self.blocks.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get() {
        let store = MemoryStore::new();
        store.put(b"key", Bytes::from_static(b"value")).unwrap();
        assert_eq!(
            store.get(b"key").unwrap(),
            Some(Bytes::from_static(b"value"))
        );
        assert_eq!(store.get(b"missing").unwrap(), None);
    }

    #[test]
    fn test_put_is_idempotent() {
        let store = MemoryStore::new();
        store.put(b"k", Bytes::from_static(b"v")).unwrap();
        store.put(b"k", Bytes::from_static(b"v")).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let store = MemoryStore::new();
        store.put(b"k", Bytes::from_static(b"old")).unwrap();
        store.put(b"k", Bytes::from_static(b"new")).unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(Bytes::from_static(b"new")));
    }

    #[test]
    fn test_close_rejects_further_use() {
        let store = MemoryStore::new();
        store.put(b"k", Bytes::from_static(b"v")).unwrap();
        store.close().unwrap();

        assert!(store.put(b"k", Bytes::from_static(b"v")).is_err());
        assert!(store.get(b"k").is_err());
        assert!(store.close().is_err());
    }
}
