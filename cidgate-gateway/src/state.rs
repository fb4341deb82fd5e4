//! Application state
//!
//! Shared state for all gateway handlers: the DAG layer over the block
//! store, the name resolver, the chunker, and the signing identity the
//! gateway publishes names with.

use crate::config::{ConfigError, GatewayConfig};
use cidgate_core::error::Result;
use cidgate_core::Chunker;
use cidgate_dag::DagStore;
use cidgate_naming::{InMemoryAuthority, NameResolver, NamingAuthority, TxnAuth};
use cidgate_storage::{BlockStore, MemoryStore, RocksDbStore, StorageConfig};
use std::sync::Arc;
use tracing::info;

/// Application state shared across all handlers
pub struct AppState {
    store: Arc<dyn BlockStore>,
    dag: DagStore,
    resolver: NameResolver,
    chunker: Chunker,
    signer: TxnAuth,
}

impl AppState {
    /// Assemble state from explicit parts
    pub fn new(
        store: Arc<dyn BlockStore>,
        authority: Arc<dyn NamingAuthority>,
        config: &GatewayConfig,
    ) -> std::result::Result<Self, ConfigError> {
        let signer = config.signer()?;
        Ok(Self {
            dag: DagStore::new(store.clone()),
            resolver: NameResolver::with_capacity(authority, config.cache_capacity),
            chunker: Chunker::new(config.chunk_size),
            signer,
            store,
        })
    }

    /// Production state: RocksDB block store, in-process naming authority.
    ///
    /// An on-chain authority is a drop-in replacement for the
    /// [`NamingAuthority`] passed here.
    pub fn open(config: &GatewayConfig) -> anyhow::Result<Self> {
        let store = RocksDbStore::open(StorageConfig::new(&config.block_store_path))?;
        info!(path = ?config.block_store_path, "Block store opened");
        Ok(Self::new(
            Arc::new(store),
            Arc::new(InMemoryAuthority::new()),
            config,
        )?)
    }

    /// Fully in-memory state for development and tests
    pub fn in_memory(config: &GatewayConfig) -> std::result::Result<Self, ConfigError> {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(InMemoryAuthority::new()),
            config,
        )
    }

    /// DAG layer handle
    pub fn dag(&self) -> &DagStore {
        &self.dag
    }

    /// Name resolver handle
    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    /// Content chunker
    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// The gateway's signing identity
    pub fn signer(&self) -> &TxnAuth {
        &self.signer
    }

    /// Flush and release the block store
    pub fn close(&self) -> Result<()> {
        self.store.flush()?;
        self.store.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_state() {
        let state = AppState::in_memory(&GatewayConfig::default()).unwrap();
        assert_eq!(state.chunker().chunk_size(), cidgate_core::DEFAULT_CHUNK_SIZE);
        state.close().unwrap();
    }
}
