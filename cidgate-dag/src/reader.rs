//! File reading and directory listing
//!
//! Reconstructs file bytes by concatenating chunk data across a file DAG
//! of arbitrary depth, and lists directory entries without touching their
//! subtrees.

use crate::DagStore;
use cidgate_core::error::{CidGateError, Result};
use cidgate_core::{Cid, Link, Node};

impl DagStore {
    /// Concatenate the chunk data of the file DAG rooted at `cid`.
    ///
    /// A leaf yields its payload, the empty node yields empty bytes, and a
    /// node whose links are all unnamed yields its children's bytes in
    /// link order, recursively. Any named link along the way means the
    /// node is not a file and fails with NotAFile.
    pub fn read_file(&self, cid: &Cid) -> Result<Vec<u8>> {
        let node = self.get_node(cid)?;
        let mut out = Vec::with_capacity(node.size() as usize);
        self.append_file_bytes(cid, &node, &mut out)?;
        Ok(out)
    }

    fn append_file_bytes(&self, cid: &Cid, node: &Node, out: &mut Vec<u8>) -> Result<()> {
        if node.is_leaf() {
            out.extend_from_slice(&node.data);
            return Ok(());
        }
        if node.is_empty_node() {
            return Ok(());
        }
        if node.has_named_links() || !node.data.is_empty() {
            return Err(CidGateError::NotAFile(cid.to_hex()));
        }

        for link in &node.links {
            let child = self.get_node(&link.hash)?;
            self.append_file_bytes(&link.hash, &child, out)?;
        }
        Ok(())
    }

    /// List the entries of the directory node at `cid`.
    ///
    /// The empty node lists as an empty directory; file-shaped nodes fail
    /// with NotADirectory.
    pub fn list_directory(&self, cid: &Cid) -> Result<Vec<Link>> {
        let node = self.get_node(cid)?;
        if node.is_dir() {
            return Ok(node.links);
        }
        if node.is_empty_node() {
            return Ok(Vec::new());
        }
        Err(CidGateError::NotADirectory(cid.to_hex()))
    }
}
