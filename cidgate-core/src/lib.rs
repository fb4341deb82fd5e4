//! CidGate Core Library
//!
//! Core abstractions for the CidGate content-addressed storage gateway.
//! This crate provides:
//! - Content identifiers (SHA-256, lowercase hex)
//! - The Merkle DAG node model and its canonical codec
//! - Fixed-size content chunking
//! - Common error handling

pub mod chunker;
pub mod cid;
pub mod error;
pub mod node;

pub use chunker::Chunker;
pub use cid::Cid;
pub use error::{CidGateError, Result};
pub use node::{Link, Node};

/// Default chunk size for content splitting (256 KB)
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Maximum number of child links per intermediate file node.
///
/// Inherited from established content-addressed systems; changing it
/// changes every file root CID.
pub const DAG_FANOUT: usize = 174;

/// Default capacity of the name resolution cache (2^16 entries)
pub const DEFAULT_CACHE_CAPACITY: usize = 1 << 16;
