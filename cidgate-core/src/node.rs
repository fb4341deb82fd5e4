//! Merkle DAG node model and canonical codec
//!
//! A Node carries an optional data payload and an ordered list of links to
//! child nodes. Its CID is the SHA-256 of its canonical serialization, so
//! the codec must be byte-deterministic: field order is fixed by the struct
//! definitions, empty fields are omitted, link order is preserved verbatim,
//! and the data payload encodes as lowercase hex.
//!
//! Nodes are not tagged as file or directory; their role is inferred from
//! link shape. The shape predicates live here so the walker, reader, and
//! mutator cannot drift apart in how they classify a node.

use crate::cid::Cid;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A link to another node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    /// Name of the linked object. Empty for intra-file chunk links,
    /// non-empty for directory entries.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// CID of the linked node
    pub hash: Cid,

    /// Cumulative size in bytes of the subtree rooted at `hash`
    pub size: u64,
}

impl Link {
    /// An unnamed link, as used inside file DAGs
    pub fn unnamed(hash: Cid, size: u64) -> Self {
        Self {
            name: String::new(),
            hash,
            size,
        }
    }

    /// A named link, as used in directory nodes
    pub fn named(name: impl Into<String>, hash: Cid, size: u64) -> Self {
        Self {
            name: name.into(),
            hash,
            size,
        }
    }
}

/// A Merkle DAG node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    /// Content payload (for leaf nodes), hex-encoded on the wire
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "hex_payload"
    )]
    pub data: Vec<u8>,

    /// Ordered links to child nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

impl Node {
    /// The empty node: initial root of a fresh name and empty-file sentinel
    pub fn empty() -> Self {
        Self::default()
    }

    /// A leaf node holding a data chunk
    pub fn leaf(data: Vec<u8>) -> Self {
        Self {
            data,
            links: Vec::new(),
        }
    }

    /// Canonical serialization. Deterministic: the same node yields the
    /// same bytes on every host and every run.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Into::into)
    }

    /// Inverse of [`Node::to_bytes`]; rejects malformed input
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(Into::into)
    }

    /// The node's content ID: SHA-256 of its canonical serialization
    pub fn cid(&self) -> Result<Cid> {
        Ok(Cid::digest(&self.to_bytes()?))
    }

    /// Cumulative logical size of the subtree rooted at this node.
    ///
    /// Leaves report their payload length; inner nodes trust their link
    /// sizes, which the builders keep canonical, so no fetching is needed.
    pub fn size(&self) -> u64 {
        if !self.data.is_empty() {
            return self.data.len() as u64;
        }
        self.links.iter().map(|l| l.size).sum()
    }

    /// Chunk node: payload present, no links
    pub fn is_leaf(&self) -> bool {
        !self.data.is_empty() && self.links.is_empty()
    }

    /// Both fields empty
    pub fn is_empty_node(&self) -> bool {
        self.data.is_empty() && self.links.is_empty()
    }

    /// Whether any link carries a name
    pub fn has_named_links(&self) -> bool {
        self.links.iter().any(|l| !l.name.is_empty())
    }

    /// Directory: no payload, at least one named link.
    ///
    /// A node with only unnamed links is a file DAG even when it has a
    /// single link.
    pub fn is_dir(&self) -> bool {
        self.data.is_empty() && self.has_named_links()
    }

    /// File shape: a leaf, or an inner node whose links are all unnamed
    pub fn is_file_shape(&self) -> bool {
        if self.is_leaf() {
            return true;
        }
        self.data.is_empty() && !self.links.is_empty() && !self.has_named_links()
    }

    /// Look up a named link
    pub fn find_link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name == name)
    }
}

/// Hex codec for the node payload, keeping the canonical form printable
mod hex_payload {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        data: &[u8],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(de::Error::custom)
    }
}
