//! # packtrie
//!
//! A memory-efficient, insertion-only set for deduplicating packed
//! sorted-integer keys.
//!
//! A key is a single machine word holding N fixed-width fields (unique,
//! strictly ascending, least-significant field first). The set is a
//! path-compressed trie over those fields, stored pointer-free in segmented
//! arenas: a slot that only one key has ever passed through holds the key's
//! remaining bits inline instead of a chain of single-child nodes, and real
//! nodes are materialized only where keys diverge. The origin workload is
//! visited-state deduplication in combinatorial board search, where millions
//! of position tuples must be interned at a few bytes each.
//!
//! There is deliberately no removal, no iteration, and no lookup beyond the
//! boolean returned by `add`.
//!
//! ## Example
//!
//! ```rust
//! use packtrie::TrieSet;
//!
//! // Keys of 3 elements, 3 bits each, over positions 0..6.
//! let mut seen = TrieSet::new(3, 3, 6, |_| false);
//!
//! // The tuple (0, 1, 2), packed least-significant field first.
//! let key = (1u32 << 3) | (2 << 6);
//! assert!(seen.add(key));
//! assert!(!seen.add(key));
//!
//! println!("footprint: {} bytes", seen.bytes_allocated());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod layout;
pub mod slot;
mod trie;

pub use trie::{MemoryStats, TrieSet};

#[cfg(test)]
mod proptests;
