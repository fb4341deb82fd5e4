//! DAG builders
//!
//! Assembles file DAGs from chunk leaves and directory nodes from named
//! entries. Children are always stored before the parents that reference
//! them, so a reader can never observe a parent with missing children
//! within one build.

use crate::DagStore;
use cidgate_core::error::{CidGateError, Result};
use cidgate_core::{Cid, Link, Node, DAG_FANOUT};
use std::collections::HashSet;
use tracing::debug;

impl DagStore {
    /// Build a file DAG bottom-up from chunk leaves.
    ///
    /// Returns the root CID and the cumulative file size. Empty input
    /// stores the empty node and returns it with size 0; a single leaf is
    /// its own root. Levels with more than [`DAG_FANOUT`] nodes gain
    /// parents of at most that many unnamed links until one root remains.
    /// Identical input bytes always produce the same root CID.
    pub fn build_file(&self, leaves: &[Node]) -> Result<(Cid, u64)> {
        if leaves.is_empty() {
            let cid = self.put_node(&Node::empty())?;
            return Ok((cid, 0));
        }

        let mut level: Vec<(Cid, u64)> = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            let size = leaf.data.len() as u64;
            level.push((self.put_node(leaf)?, size));
        }

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(DAG_FANOUT));
            for group in level.chunks(DAG_FANOUT) {
                let parent = Node {
                    data: Vec::new(),
                    links: group
                        .iter()
                        .map(|(cid, size)| Link::unnamed(*cid, *size))
                        .collect(),
                };
                let size = group.iter().map(|(_, size)| size).sum();
                next.push((self.put_node(&parent)?, size));
            }
            level = next;
        }

        let (root, size) = level[0];
        debug!(root = %root, size, leaves = leaves.len(), "Built file DAG");
        Ok((root, size))
    }

    /// Build a directory node from `(name, cid, size)` entries.
    ///
    /// Entries may arrive in any order; links are sorted lexicographically
    /// by name so the same logical directory always has one CID. Duplicate
    /// names fail with InvalidDirectory.
    pub fn build_directory<I>(&self, entries: I) -> Result<(Cid, u64)>
    where
        I: IntoIterator<Item = (String, Cid, u64)>,
    {
        let mut links: Vec<Link> = Vec::new();
        let mut seen = HashSet::new();

        for (name, hash, size) in entries {
            if name.is_empty() {
                return Err(CidGateError::InvalidDirectory(
                    "entry name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(name.clone()) {
                return Err(CidGateError::InvalidDirectory(name));
            }
            links.push(Link::named(name, hash, size));
        }

        links.sort_by(|a, b| a.name.cmp(&b.name));
        let size = links.iter().map(|l| l.size).sum();

        let dir = Node {
            data: Vec::new(),
            links,
        };
        let cid = self.put_node(&dir)?;
        debug!(cid = %cid, size, "Built directory node");
        Ok((cid, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cidgate_core::Chunker;
    use cidgate_storage::MemoryStore;
    use std::sync::Arc;

    fn dag() -> DagStore {
        DagStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_build_file_two_chunks() {
        let dag = dag();
        let leaves = Chunker::new(4).chunk_bytes(b"abcdefg");

        let (root, size) = dag.build_file(&leaves).unwrap();
        assert_eq!(size, 7);

        let root_node = dag.get_node(&root).unwrap();
        assert!(root_node.is_file_shape());
        assert_eq!(root_node.links.len(), 2);
        assert_eq!(root_node.links[0].size, 4);
        assert_eq!(root_node.links[1].size, 3);
        assert!(root_node.links.iter().all(|l| l.name.is_empty()));
    }

    #[test]
    fn test_build_file_empty_input() {
        let dag = dag();
        let (root, size) = dag.build_file(&[]).unwrap();

        assert_eq!(size, 0);
        assert!(dag.get_node(&root).unwrap().is_empty_node());
    }

    #[test]
    fn test_build_file_single_chunk_root_is_leaf() {
        let dag = dag();
        let leaves = Chunker::new(16).chunk_bytes(b"short");

        let (root, size) = dag.build_file(&leaves).unwrap();
        assert_eq!(size, 5);
        assert!(dag.get_node(&root).unwrap().is_leaf());
    }

    #[test]
    fn test_build_file_deep_fanout() {
        let dag = dag();
        // One byte per leaf forces a second level above DAG_FANOUT leaves
        let data: Vec<u8> = (0u8..=255).cycle().take(DAG_FANOUT + 10).collect();
        let leaves = Chunker::new(1).chunk_bytes(&data);

        let (root, size) = dag.build_file(&leaves).unwrap();
        assert_eq!(size, data.len() as u64);

        let root_node = dag.get_node(&root).unwrap();
        assert_eq!(root_node.links.len(), 2);
        assert_eq!(root_node.links[0].size, DAG_FANOUT as u64);
        assert_eq!(root_node.links[1].size, 10);
    }

    #[test]
    fn test_build_file_is_deterministic() {
        let data = b"determinism across stores";
        let leaves = Chunker::new(5).chunk_bytes(data);

        let (root_a, _) = dag().build_file(&leaves).unwrap();
        let (root_b, _) = dag().build_file(&leaves).unwrap();
        assert_eq!(root_a, root_b);
    }

    #[test]
    fn test_build_directory_sorts_entries() {
        let dag = dag();
        let x = Cid::digest(b"x");
        let y = Cid::digest(b"y");

        let (cid_a, size_a) = dag
            .build_directory(vec![
                ("zebra.txt".to_string(), x, 3),
                ("apple.txt".to_string(), y, 4),
            ])
            .unwrap();
        let (cid_b, _) = dag
            .build_directory(vec![
                ("apple.txt".to_string(), y, 4),
                ("zebra.txt".to_string(), x, 3),
            ])
            .unwrap();

        assert_eq!(cid_a, cid_b);
        assert_eq!(size_a, 7);

        let node = dag.get_node(&cid_a).unwrap();
        assert_eq!(node.links[0].name, "apple.txt");
        assert_eq!(node.links[1].name, "zebra.txt");
        assert!(node.is_dir());
    }

    #[test]
    fn test_build_directory_rejects_duplicates() {
        let dag = dag();
        let x = Cid::digest(b"x");

        let err = dag
            .build_directory(vec![
                ("a".to_string(), x, 1),
                ("a".to_string(), x, 1),
            ])
            .unwrap_err();
        assert!(matches!(err, CidGateError::InvalidDirectory(name) if name == "a"));
    }

    #[test]
    fn test_build_directory_rejects_empty_name() {
        let dag = dag();
        let x = Cid::digest(b"x");

        assert!(matches!(
            dag.build_directory(vec![(String::new(), x, 1)]),
            Err(CidGateError::InvalidDirectory(_))
        ));
    }
}
