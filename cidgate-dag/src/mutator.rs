//! Copy-on-write path mutation
//!
//! Binds a target CID at a path within an existing tree by rebuilding only
//! the spine from the root to the target's parent. Untouched siblings keep
//! their CIDs, so the space cost of a mutation is proportional to path
//! depth, not tree size. Missing intermediate directories are created as
//! empty nodes on the way down.

use crate::path::split_path;
use crate::DagStore;
use cidgate_core::error::{CidGateError, Result};
use cidgate_core::{Cid, Link, Node};
use tracing::debug;

impl DagStore {
    /// Rebuild the tree rooted at `root` so that `path` points at
    /// `target`, returning the new root CID.
    ///
    /// `path` must contain at least one component; the root itself cannot
    /// be the target. Descending through a file-shaped node fails with
    /// NotADirectory, never silently overwrites it. The operation is
    /// deterministic and idempotent for fixed inputs.
    pub fn put_at(&self, root: &Cid, path: &str, target: &Cid, target_size: u64) -> Result<Cid> {
        let components = split_path(path);
        let (leaf_name, parents) = components.split_last().ok_or_else(|| {
            CidGateError::InvalidPath("cannot put content at the root path".to_string())
        })?;

        let new_root = self.rebuild_spine(root, parents, leaf_name, target, target_size)?;
        debug!(old_root = %root, new_root = %new_root, path, target = %target, "Rebuilt DAG spine");
        Ok(new_root)
    }

    /// Recursively descend the parent chain, returning the replacement CID
    /// for the node at this level. A CID that resolves to no stored node
    /// (a placeholder created further up) is treated as the empty node.
    fn rebuild_spine(
        &self,
        current: &Cid,
        parents: &[&str],
        leaf_name: &str,
        target: &Cid,
        target_size: u64,
    ) -> Result<Cid> {
        let node = self.try_get_node(current)?.unwrap_or_else(Node::empty);
        if node.is_file_shape() {
            return Err(CidGateError::NotADirectory(current.to_hex()));
        }

        // At the direct parent of the entry being bound
        if parents.is_empty() {
            return self.put_node(&upsert_link(&node, leaf_name, *target, target_size));
        }

        let component = parents[0];
        let next = match node.find_link(component) {
            Some(link) => link.hash,
            // Missing intermediate directory: start it from an empty node
            None => self.put_node(&Node::empty())?,
        };

        let new_next = self.rebuild_spine(&next, &parents[1..], leaf_name, target, target_size)?;
        let new_next_size = self.node_size(&new_next)?;

        self.put_node(&upsert_link(&node, component, new_next, new_next_size))
    }
}

/// Copy a node's links, replacing the entry named `name` or appending it
/// when absent. Existing link order is preserved.
fn upsert_link(node: &Node, name: &str, hash: Cid, size: u64) -> Node {
    let mut links = node.links.clone();
    match links.iter_mut().find(|l| l.name == name) {
        Some(link) => {
            link.hash = hash;
            link.size = size;
        }
        None => links.push(Link::named(name, hash, size)),
    }
    Node {
        data: Vec::new(),
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cidgate_storage::MemoryStore;
    use std::sync::Arc;

    fn dag() -> DagStore {
        DagStore::new(Arc::new(MemoryStore::new()))
    }

    fn empty_root(dag: &DagStore) -> Cid {
        dag.put_node(&Node::empty()).unwrap()
    }

    #[test]
    fn test_put_at_rejects_root_path() {
        let dag = dag();
        let root = empty_root(&dag);
        let target = Cid::digest(b"t");

        for path in ["", "/", "//"] {
            assert!(matches!(
                dag.put_at(&root, path, &target, 1),
                Err(CidGateError::InvalidPath(_))
            ));
        }
    }

    #[test]
    fn test_put_at_creates_intermediate_directories() {
        let dag = dag();
        let root = empty_root(&dag);
        let target = dag.put_node(&Node::leaf(b"0123456789".to_vec())).unwrap();

        let new_root = dag.put_at(&root, "/a/b/c.txt", &target, 10).unwrap();

        assert_eq!(dag.resolve_path(&new_root, "/a/b/c.txt").unwrap(), target);

        let a = dag.get_node(&dag.resolve_path(&new_root, "/a").unwrap()).unwrap();
        assert!(a.is_dir());
        assert_eq!(a.links.len(), 1);
        assert_eq!(a.links[0].name, "b");

        let b = dag.get_node(&dag.resolve_path(&new_root, "/a/b").unwrap()).unwrap();
        assert_eq!(b.links.len(), 1);
        assert_eq!(b.links[0].name, "c.txt");
        assert_eq!(b.links[0].size, 10);
    }

    #[test]
    fn test_put_at_preserves_siblings() {
        let dag = dag();
        let root = empty_root(&dag);
        let x = dag.put_node(&Node::leaf(vec![1; 10])).unwrap();
        let y = dag.put_node(&Node::leaf(vec![2; 20])).unwrap();

        let d1 = dag.put_at(&root, "/a/b/c.txt", &x, 10).unwrap();
        let c_before = dag.resolve_path(&d1, "/a/b/c.txt").unwrap();

        let d2 = dag.put_at(&d1, "/a/b/d.txt", &y, 20).unwrap();

        // Both entries visible, the untouched one shares its CID
        assert_eq!(dag.resolve_path(&d2, "/a/b/c.txt").unwrap(), c_before);
        assert_eq!(dag.resolve_path(&d2, "/a/b/d.txt").unwrap(), y);

        // Cumulative sizes propagate up the spine
        let a = dag.resolve_path(&d2, "/a").unwrap();
        assert_eq!(dag.node_size(&a).unwrap(), 30);
    }

    #[test]
    fn test_put_at_replaces_existing_entry() {
        let dag = dag();
        let root = empty_root(&dag);
        let x = dag.put_node(&Node::leaf(vec![1; 10])).unwrap();
        let y = dag.put_node(&Node::leaf(vec![2; 20])).unwrap();
        let z = dag.put_node(&Node::leaf(vec![3; 5])).unwrap();

        let d1 = dag.put_at(&root, "/a/b/c.txt", &x, 10).unwrap();
        let d2 = dag.put_at(&d1, "/a/b/d.txt", &y, 20).unwrap();
        let d3 = dag.put_at(&d2, "/a/b/c.txt", &z, 5).unwrap();

        assert_eq!(dag.resolve_path(&d3, "/a/b/c.txt").unwrap(), z);
        assert_eq!(dag.resolve_path(&d3, "/a/b/d.txt").unwrap(), y);

        let b = dag.get_node(&dag.resolve_path(&d3, "/a/b").unwrap()).unwrap();
        assert_eq!(b.links.len(), 2);
        assert_eq!(dag.node_size(&dag.resolve_path(&d3, "/a").unwrap()).unwrap(), 25);
    }

    #[test]
    fn test_put_at_is_idempotent() {
        let dag = dag();
        let root = empty_root(&dag);
        let target = Cid::digest(b"t");

        let once = dag.put_at(&root, "/x/y", &target, 3).unwrap();
        let twice = dag.put_at(&once, "/x/y", &target, 3).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_put_at_under_file_fails() {
        let dag = dag();
        let root = empty_root(&dag);
        let file = dag.put_node(&Node::leaf(b"content".to_vec())).unwrap();
        let target = Cid::digest(b"t");

        let d1 = dag.put_at(&root, "/notes.txt", &file, 7).unwrap();

        // Descending through a leaf
        assert!(matches!(
            dag.put_at(&d1, "/notes.txt/deeper", &target, 1),
            Err(CidGateError::NotADirectory(_))
        ));

        // Mutating a root that is itself a file
        assert!(matches!(
            dag.put_at(&file, "/a", &target, 1),
            Err(CidGateError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_put_at_missing_root_starts_empty() {
        let dag = dag();
        let absent = Cid::digest(b"never stored");
        let target = Cid::digest(b"t");

        let new_root = dag.put_at(&absent, "/a", &target, 2).unwrap();
        assert_eq!(dag.resolve_path(&new_root, "/a").unwrap(), target);
    }
}
