//! CidGate Merkle DAG layer
//!
//! Builds, walks, reads, and rewrites content-addressed DAGs on top of any
//! [`BlockStore`]. Nodes are written once under their CID and never
//! mutated; every "update" is a copy-on-write rebuild of the spine from the
//! root to the changed entry, sharing untouched subtrees by CID.

pub mod builder;
pub mod mutator;
pub mod path;
pub mod reader;

pub use path::split_path;

use bytes::Bytes;
use cidgate_core::error::{CidGateError, Result};
use cidgate_core::{Cid, Node};
use cidgate_storage::BlockStore;
use std::sync::Arc;
use tracing::trace;

/// Node-level access to a block store
///
/// Cheap to clone; all clones share the same backing store.
#[derive(Clone)]
pub struct DagStore {
    store: Arc<dyn BlockStore>,
}

impl DagStore {
    /// Create a DAG store over the given block store
    pub fn new(store: Arc<dyn BlockStore>) -> Self {
        Self { store }
    }

    /// Serialize and store a node, returning its CID.
    ///
    /// Content addressing makes this idempotent: re-putting an identical
    /// node rewrites the same key with the same bytes.
    pub fn put_node(&self, node: &Node) -> Result<Cid> {
        let bytes = node.to_bytes()?;
        let cid = Cid::digest(&bytes);
        self.store.put(&cid.to_key(), Bytes::from(bytes))?;
        trace!(cid = %cid, size = node.size(), "Stored node");
        Ok(cid)
    }

    /// Retrieve and decode a node, failing with NotFound when absent
    pub fn get_node(&self, cid: &Cid) -> Result<Node> {
        self.try_get_node(cid)?
            .ok_or_else(|| CidGateError::NotFound(cid.to_hex()))
    }

    /// Retrieve and decode a node, or `None` when absent
    pub fn try_get_node(&self, cid: &Cid) -> Result<Option<Node>> {
        match self.store.get(&cid.to_key())? {
            Some(bytes) => Ok(Some(Node::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Retrieve a node and report its cumulative size
    pub fn node_size(&self, cid: &Cid) -> Result<u64> {
        Ok(self.get_node(cid)?.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cidgate_storage::MemoryStore;

    fn dag() -> DagStore {
        DagStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_put_get_roundtrip() {
        let dag = dag();
        let node = Node::leaf(b"hello".to_vec());

        let cid = dag.put_node(&node).unwrap();
        assert_eq!(cid, node.cid().unwrap());
        assert_eq!(dag.get_node(&cid).unwrap(), node);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let dag = dag();
        let absent = Cid::digest(b"never stored");

        assert!(matches!(
            dag.get_node(&absent),
            Err(CidGateError::NotFound(_))
        ));
        assert!(dag.try_get_node(&absent).unwrap().is_none());
    }

    #[test]
    fn test_put_is_idempotent() {
        let dag = dag();
        let node = Node::leaf(b"same".to_vec());

        let first = dag.put_node(&node).unwrap();
        let second = dag.put_node(&node).unwrap();
        assert_eq!(first, second);
    }
}
