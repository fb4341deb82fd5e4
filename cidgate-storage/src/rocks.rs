//! RocksDB block store
//!
//! Production block storage using the RocksDB LSM tree. Values are small
//! (node serializations bounded by fanout, plus chunk payloads for leaves),
//! so the tuning leans toward many small records rather than huge blobs.

use crate::backend::BlockStore;
use crate::StorageConfig;
use bytes::Bytes;
use cidgate_core::error::{CidGateError, Result};
use parking_lot::RwLock;
use rocksdb::{BlockBasedOptions, Cache, DBCompressionType, Options, WriteOptions, DB};
use std::path::Path;
use tracing::{debug, info};

/// Column family holding node blocks
const CF_NODES: &str = "nodes";

/// RocksDB-backed block store
pub struct RocksDbStore {
    /// Database handle, dropped on close
    db: RwLock<Option<DB>>,
}

impl RocksDbStore {
    /// Open or create a RocksDB store at the configured path
    pub fn open(config: StorageConfig) -> Result<Self> {
        info!(path = ?config.path, "Opening RocksDB block store");

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(1000);
        opts.set_keep_log_file_num(10);

        if config.compression {
            opts.set_compression_type(DBCompressionType::Lz4);
        }

        let cache = Cache::new_lru_cache(config.cache_size);
        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_block_cache(&cache);
        block_opts.set_cache_index_and_filter_blocks(true);
        opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors = vec![rocksdb::ColumnFamilyDescriptor::new(
            CF_NODES,
            opts.clone(),
        )];

        std::fs::create_dir_all(&config.path).map_err(|e| {
            CidGateError::Storage(format!("Failed to create storage directory: {}", e))
        })?;

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| CidGateError::Storage(format!("Failed to open RocksDB: {}", e)))?;

        info!("RocksDB block store opened");

        Ok(Self {
            db: RwLock::new(Some(db)),
        })
    }

    /// Open with default configuration
    pub fn open_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(StorageConfig::new(path.as_ref()))
    }

    fn with_db<T>(&self, f: impl FnOnce(&DB) -> Result<T>) -> Result<T> {
        let guard = self.db.read();
        let db = guard
            .as_ref()
            .ok_or_else(|| CidGateError::Storage("store is closed".to_string()))?;
        f(db)
    }
}

impl BlockStore for RocksDbStore {
    fn put(&self, key: &[u8], value: Bytes) -> Result<()> {
        self.with_db(|db| {
            let cf = db
                .cf_handle(CF_NODES)
                .ok_or_else(|| CidGateError::Storage("missing column family".to_string()))?;

            let mut write_opts = WriteOptions::default();
            write_opts.set_sync(false);

            db.put_cf_opt(&cf, key, &value, &write_opts)
                .map_err(|e| CidGateError::Storage(format!("Write failed: {}", e)))?;

            debug!(key_len = key.len(), size = value.len(), "Stored block");
            Ok(())
        })
    }

    fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.with_db(|db| {
            let cf = db
                .cf_handle(CF_NODES)
                .ok_or_else(|| CidGateError::Storage("missing column family".to_string()))?;

            let result = db
                .get_cf(&cf, key)
                .map_err(|e| CidGateError::Storage(format!("Read failed: {}", e)))?;

            Ok(result.map(Bytes::from))
        })
    }

    fn exists(&self, key: &[u8]) -> Result<bool> {
        self.with_db(|db| {
            let cf = db
                .cf_handle(CF_NODES)
                .ok_or_else(|| CidGateError::Storage("missing column family".to_string()))?;

            // key_may_exist can report false positives, confirm with a read
            if !db.key_may_exist_cf(&cf, key) {
                return Ok(false);
            }
            let result = db
                .get_cf(&cf, key)
                .map_err(|e| CidGateError::Storage(format!("Exists check failed: {}", e)))?;
            Ok(result.is_some())
        })
    }

    fn flush(&self) -> Result<()> {
        self.with_db(|db| {
            db.flush()
                .map_err(|e| CidGateError::Storage(format!("Flush failed: {}", e)))?;
            debug!("Flushed block store to disk");
            Ok(())
        })
    }

    fn close(&self) -> Result<()> {
        let mut guard = self.db.write();
        match guard.take() {
            Some(db) => {
                if let Err(e) = db.flush() {
                    return Err(CidGateError::Storage(format!("Flush on close failed: {}", e)));
                }
                drop(db);
                info!("RocksDB block store closed");
                Ok(())
            }
            None => Err(CidGateError::Storage("store is closed".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksDbStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = RocksDbStore::open_default(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_put_get() {
        let (store, _dir) = create_test_store();

        store.put(b"key", Bytes::from_static(b"hello world")).unwrap();
        assert_eq!(
            store.get(b"key").unwrap(),
            Some(Bytes::from_static(b"hello world"))
        );
        assert_eq!(store.get(b"missing").unwrap(), None);
    }

    #[test]
    fn test_exists() {
        let (store, _dir) = create_test_store();

        store.put(b"present", Bytes::from_static(b"x")).unwrap();
        assert!(store.exists(b"present").unwrap());
        assert!(!store.exists(b"absent").unwrap());
    }

    #[test]
    fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path());

        {
            let store = RocksDbStore::open(config.clone()).unwrap();
            store.put(b"persist", Bytes::from_static(b"data")).unwrap();
            store.close().unwrap();
        }

        {
            let store = RocksDbStore::open(config).unwrap();
            assert_eq!(
                store.get(b"persist").unwrap(),
                Some(Bytes::from_static(b"data"))
            );
        }
    }

    #[test]
    fn test_close_rejects_further_use() {
        let (store, _dir) = create_test_store();
        store.close().unwrap();

        assert!(store.put(b"k", Bytes::from_static(b"v")).is_err());
        assert!(store.get(b"k").is_err());
        assert!(store.flush().is_err());
        assert!(store.close().is_err());
    }
}
