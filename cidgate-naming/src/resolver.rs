//! Name resolution with an LRU cache
//!
//! Translates names to root CIDs and publishes updates. The cache is
//! strictly advisory: writes always go to the authority first, reads may
//! be served from the cache, and evictions are silent. Concurrent
//! publishes to the same name are serialized by the authority, so the
//! cache may transiently hold a stale value.

use crate::authority::{NamingAuthority, TxnAuth};
use cidgate_core::error::{CidGateError, Result};
use cidgate_core::DEFAULT_CACHE_CAPACITY;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

/// Name → root CID resolver
pub struct NameResolver {
    authority: Arc<dyn NamingAuthority>,
    cache: Mutex<LruCache<String, String>>,
}

impl NameResolver {
    /// Create a resolver with the default cache capacity (2^16 entries)
    pub fn new(authority: Arc<dyn NamingAuthority>) -> Self {
        Self::with_capacity(authority, DEFAULT_CACHE_CAPACITY)
    }

    /// Create a resolver with an explicit cache capacity
    pub fn with_capacity(authority: Arc<dyn NamingAuthority>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            authority,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up a name in the cache only
    pub fn cache_get(&self, name: &str) -> Option<String> {
        self.cache.lock().get(name).cloned()
    }

    /// Insert or refresh a cache entry
    pub fn cache_put(&self, name: &str, cid: &str) {
        self.cache.lock().put(name.to_string(), cid.to_string());
    }

    /// Resolve a name to its current root CID.
    ///
    /// Consults the cache first, then the authority. Returns `None` when
    /// the name is unbound.
    pub async fn resolve(&self, name: &str) -> Result<Option<String>> {
        if name.is_empty() {
            return Err(CidGateError::Naming("name cannot be empty".to_string()));
        }

        if let Some(cid) = self.cache_get(name) {
            debug!(name, cid = %cid, "Name cache hit");
            return Ok(Some(cid));
        }

        debug!(name, "Name cache miss, querying authority");
        let cid = self.authority.resolve_name(name).await?;
        if cid.is_empty() {
            return Ok(None);
        }

        self.cache_put(name, &cid);
        Ok(Some(cid))
    }

    /// Bind `cid` to `name`, registering the name when it does not exist
    /// yet and updating it when the caller owns it.
    ///
    /// The authority accepts the write before the cache is touched.
    pub async fn publish(&self, auth: &TxnAuth, name: &str, cid: &str) -> Result<()> {
        if name.is_empty() || cid.is_empty() {
            return Err(CidGateError::Naming(
                "name and CID cannot be empty".to_string(),
            ));
        }

        let owner = self.authority.get_owner(name).await?;
        if owner.is_zero() {
            self.authority.register_name(auth, name, cid).await?;
        } else {
            if owner != auth.address {
                return Err(CidGateError::Unauthorized(name.to_string()));
            }
            self.authority.update_cid(auth, name, cid).await?;
        }

        self.cache_put(name, cid);
        debug!(name, cid = %cid, "Published name");
        Ok(())
    }

    /// Register a name without binding content yet (empty CID allowed).
    /// Fails when the name already exists.
    pub async fn register(&self, auth: &TxnAuth, name: &str, cid: &str) -> Result<()> {
        if name.is_empty() {
            return Err(CidGateError::Naming("name cannot be empty".to_string()));
        }
        self.authority.register_name(auth, name, cid).await?;
        if !cid.is_empty() {
            self.cache_put(name, cid);
        }
        Ok(())
    }

    /// The backing authority
    pub fn authority(&self) -> &Arc<dyn NamingAuthority> {
        &self.authority
    }
}
