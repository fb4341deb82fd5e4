//! Path walking
//!
//! Resolves a slash-separated path against a root CID by following named
//! links. The walker never dereferences the final node; callers classify
//! it by shape.

use crate::DagStore;
use cidgate_core::error::{CidGateError, Result};
use cidgate_core::Cid;
use tracing::trace;

/// Split a path into its non-empty components.
///
/// Leading, trailing, and repeated slashes are ignored, so `""`, `"/"`,
/// and `"//"` all yield no components.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|c| !c.is_empty()).collect()
}

impl DagStore {
    /// Walk `path` from `root`, returning the CID of the final node.
    ///
    /// The empty path and `/` resolve to the root itself. Each component
    /// is matched byte-exactly against link names; a missing component
    /// fails with PathNotFound naming it.
    pub fn resolve_path(&self, root: &Cid, path: &str) -> Result<Cid> {
        let mut current = *root;

        for component in split_path(path) {
            let node = self.get_node(&current)?;
            let link = node
                .find_link(component)
                .ok_or_else(|| CidGateError::PathNotFound(component.to_string()))?;
            trace!(component, next = %link.hash, "Descending path");
            current = link.hash;
        }

        Ok(current)
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

    #[test]
    fn test_split_path() {
        assert_eq!(split_path(""), Vec::<&str>::new());
        assert_eq!(split_path("/"), Vec::<&str>::new());
        assert_eq!(split_path("//"), Vec::<&str>::new());
        assert_eq!(split_path("/a/b"), vec!["a", "b"]);
        assert_eq!(split_path("a/b/"), vec!["a", "b"]);
        assert_eq!(split_path("a//b"), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_path_resolves_to_root() {
        let dag = dag();
        let root = dag.put_node(&cidgate_core::Node::empty()).unwrap();

        assert_eq!(dag.resolve_path(&root, "").unwrap(), root);
        assert_eq!(dag.resolve_path(&root, "/").unwrap(), root);
    }

    #[test]
    fn test_walk_nested_directories() {
        let dag = dag();
        let file = dag.put_node(&cidgate_core::Node::leaf(b"body".to_vec())).unwrap();
        let (inner, inner_size) = dag
            .build_directory(vec![("file.txt".to_string(), file, 4)])
            .unwrap();
        let (root, _) = dag
            .build_directory(vec![("docs".to_string(), inner, inner_size)])
            .unwrap();

        assert_eq!(dag.resolve_path(&root, "/docs").unwrap(), inner);
        assert_eq!(dag.resolve_path(&root, "/docs/file.txt").unwrap(), file);
        assert_eq!(dag.resolve_path(&root, "docs/file.txt/").unwrap(), file);
    }

    #[test]
    fn test_missing_component_is_path_not_found() {
        let dag = dag();
        let file = dag.put_node(&cidgate_core::Node::leaf(b"x".to_vec())).unwrap();
        let (root, _) = dag
            .build_directory(vec![("a".to_string(), file, 1)])
            .unwrap();

        let err = dag.resolve_path(&root, "/b").unwrap_err();
        assert!(matches!(err, CidGateError::PathNotFound(c) if c == "b"));
    }

    #[test]
    fn test_name_matching_is_case_sensitive() {
        let dag = dag();
        let file = dag.put_node(&cidgate_core::Node::leaf(b"x".to_vec())).unwrap();
        let (root, _) = dag
            .build_directory(vec![("README".to_string(), file, 1)])
            .unwrap();

        assert!(dag.resolve_path(&root, "/README").is_ok());
        assert!(dag.resolve_path(&root, "/readme").is_err());
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let dag = dag();
        let absent = Cid::digest(b"gone");

        assert!(matches!(
            dag.resolve_path(&absent, "/a"),
            Err(CidGateError::NotFound(_))
        ));
    }
}
