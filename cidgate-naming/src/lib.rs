//! CidGate naming layer
//!
//! The mutable indirection on top of immutable content: names (typically
//! domains) map to root CIDs through an external naming authority, fronted
//! by an advisory in-process LRU cache. The authority is the single source
//! of truth; the cache only short-circuits reads.

pub mod authority;
pub mod resolver;

pub use authority::{Address, InMemoryAuthority, NamingAuthority, TxnAuth};
pub use resolver::NameResolver;
