//! Fixed-size content chunking
//!
//! Splits an input byte stream into leaf nodes of at most `chunk_size`
//! bytes, the fundamental write-side unit of the DAG.

use crate::error::Result;
use crate::node::Node;
use std::io::Read;

/// Splits content into fixed-size leaf nodes
pub struct Chunker {
    chunk_size: usize,
}

impl Chunker {
    /// Create a new Chunker. `chunk_size` must be positive; zero is
    /// clamped to one byte.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Configured chunk size in bytes
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Read the input to completion, emitting one leaf per full chunk plus
    /// a final, possibly short, leaf for the remainder. Empty input yields
    /// an empty sequence. Reader errors are surfaced unchanged.
    pub fn chunk<R: Read>(&self, mut reader: R) -> Result<Vec<Node>> {
        let mut leaves = Vec::new();
        let mut buf = vec![0u8; self.chunk_size];

        loop {
            let mut filled = 0;
            while filled < buf.len() {
                let n = reader.read(&mut buf[filled..])?;
                if n == 0 {
                    break;
                }
                filled += n;
            }

            if filled == 0 {
                break;
            }
            leaves.push(Node::leaf(buf[..filled].to_vec()));
            if filled < buf.len() {
                break;
            }
        }

        Ok(leaves)
    }

    /// Chunk an in-memory byte slice
    pub fn chunk_bytes(&self, data: &[u8]) -> Vec<Node> {
        data.chunks(self.chunk_size)
            .map(|chunk| Node::leaf(chunk.to_vec()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_chunk_exact_and_remainder() {
        let chunker = Chunker::new(4);
        let leaves = chunker.chunk(Cursor::new(b"abcdefg")).unwrap();

        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].data, b"abcd");
        assert_eq!(leaves[1].data, b"efg");
    }

    #[test]
    fn test_chunk_exact_multiple() {
        let chunker = Chunker::new(4);
        let leaves = chunker.chunk(Cursor::new(b"abcdefgh")).unwrap();

        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].data, b"abcd");
        assert_eq!(leaves[1].data, b"efgh");
    }

    #[test]
    fn test_chunk_empty_input() {
        let chunker = Chunker::new(4);
        let leaves = chunker.chunk(Cursor::new(b"")).unwrap();
        assert!(leaves.is_empty());
    }

    #[test]
    fn test_chunk_handles_short_reads() {
        // A reader that returns one byte at a time still fills full chunks
        struct OneByte<'a>(&'a [u8]);
        impl Read for OneByte<'_> {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                match self.0.split_first() {
                    Some((b, rest)) => {
                        buf[0] = *b;
                        self.0 = rest;
                        Ok(1)
                    }
                    None => Ok(0),
                }
            }
        }

        let chunker = Chunker::new(4);
        let leaves = chunker.chunk(OneByte(b"abcdefg")).unwrap();
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].data, b"abcd");
        assert_eq!(leaves[1].data, b"efg");
    }

    #[test]
    fn test_chunk_bytes_matches_reader() {
        let chunker = Chunker::new(3);
        let data = b"0123456789";
        let from_slice = chunker.chunk_bytes(data);
        let from_reader = chunker.chunk(Cursor::new(data)).unwrap();
        assert_eq!(from_slice, from_reader);
    }

    #[test]
    fn test_zero_chunk_size_clamped() {
        let chunker = Chunker::new(0);
        assert_eq!(chunker.chunk_size(), 1);
        let leaves = chunker.chunk_bytes(b"ab");
        assert_eq!(leaves.len(), 2);
    }
}
