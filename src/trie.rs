//! The trie set: path-compressed insertion over the segment arenas.
//!
//! The trie branches on successive key fields. A node at depth `d` has one
//! slot per position still reachable after the element chosen at depth
//! `d - 1`, addressed through the compaction tables; the root is
//! pre-allocated and indexed by the raw first field. The last level ends in
//! leaf blocks of 32-bit membership masks.
//!
//! Path compression keeps single-key paths out of the arena entirely: a slot
//! holds the key's remaining bits as a compressed branch until a second key
//! diverges there, and only then is a real node (or leaf) materialized.
//!
//! Wide keys need one extra rule. The compressed-branch payload is 31 bits,
//! so the leading levels of a key wider than that are walked without
//! compression (empty slots materialize child nodes unconditionally) until
//! the remaining bits fit. The number of such levels is fixed at
//! construction, which lets one loop serve every key width: for keys of 31
//! bits or fewer the uncompressed phase is simply empty.

use crate::arena::SegmentArena;
use crate::layout::KeyLayout;
use crate::slot::{Slot, SlotState};

/// Memory footprint breakdown, in bytes. Purely observational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    /// Bytes held by node segments.
    pub node_bytes: usize,
    /// Bytes held by leaf segments.
    pub leaf_bytes: usize,
    /// Sum of both arenas.
    pub total_bytes: usize,
}

/// An insertion-only set of packed sorted-integer keys.
///
/// A key packs `element_count` fields of `bits_per_element` bits each,
/// least-significant field first. The caller guarantees that fields are
/// unique, strictly ascending in field order, and never name a disallowed
/// position; the structure does not validate this, and violating it produces
/// unspecified slot addressing.
///
/// There is no removal, no iteration and no lookup beyond the boolean
/// returned by [`add`](Self::add). Memory only grows. The structure is not
/// safe for concurrent mutation; multi-threaded callers should give each
/// worker its own instance and merge results afterwards.
///
/// # Example
///
/// ```rust
/// use packtrie::TrieSet;
///
/// // Keys of 2 elements, 3 bits each, positions 0..6, none disallowed.
/// let mut set = TrieSet::new(2, 3, 6, |_| false);
///
/// let key = 4u32 << 3; // the tuple (0, 4)
/// assert!(set.add(key));
/// assert!(!set.add(key));
/// ```
pub struct TrieSet {
    layout: KeyLayout,
    nodes: SegmentArena<Slot>,
    leaves: SegmentArena<u32>,
}

impl TrieSet {
    /// Construct an empty set tuned to one key geometry.
    ///
    /// The root node is pre-allocated with one slot per raw position. Leaf
    /// index 0 is reserved so that no real leaf collides with the empty slot
    /// encoding.
    ///
    /// # Panics
    /// Panics on out-of-range parameters; see [`KeyLayout::new`].
    pub fn new(
        element_count: usize,
        bits_per_element: u32,
        total_positions: usize,
        is_disallowed: impl Fn(usize) -> bool,
    ) -> Self {
        let layout = KeyLayout::new(
            element_count,
            bits_per_element,
            total_positions,
            is_disallowed,
        );
        let mut nodes = SegmentArena::new();
        let root = nodes.alloc_block(total_positions as u32);
        debug_assert_eq!(root, 0);
        let leaves = SegmentArena::with_reserved(layout.leaf_words);
        Self {
            layout,
            nodes,
            leaves,
        }
    }

    /// Add a key. Returns `true` if it was not already present.
    ///
    /// Duplicate detection mutates nothing; a new key materializes at most
    /// one node or leaf block.
    pub fn add(&mut self, key: impl Into<u64>) -> bool {
        self.add_packed(key.into())
    }

    fn add_packed(&mut self, mut key: u64) -> bool {
        let shift = self.layout.bits_per_element;
        let mask = self.layout.field_mask;

        // Root slot, indexed by the raw (uncompacted) first field.
        let mut gidx = (key & mask) as u32;

        // Phase 1: levels where the remaining key is too wide for a
        // compressed branch. Children are materialized unconditionally, so a
        // suffix can never appear in these slots.
        let mut level = 1;
        while level < self.layout.uncompressed_levels {
            let element = (key & mask) as usize;
            let slot = self.nodes.get(gidx);
            key >>= shift;
            let base = match slot.state() {
                SlotState::Child(base) => base,
                SlotState::Empty => {
                    let base = self.nodes.alloc_block(self.layout.slot_count[element]);
                    self.nodes.set(gidx, Slot::child(base));
                    base
                }
                SlotState::Suffix(_) => {
                    unreachable!("compressed branch above the compression threshold")
                }
            };
            gidx = self.child_slot(base, element, (key & mask) as usize);
            level += 1;
        }

        // Phase 2: compressed traversal of the remaining node levels.
        while level < self.layout.element_count - 1 {
            let element = (key & mask) as usize;
            let slot = self.nodes.get(gidx);
            key >>= shift;
            match slot.state() {
                SlotState::Empty => {
                    // First key through this point: park the whole remainder
                    // here, nothing else needs to be stored.
                    self.nodes.set(gidx, Slot::suffix(key as u32));
                    return true;
                }
                SlotState::Suffix(prev) => {
                    if u64::from(prev) == key {
                        return false;
                    }
                    // Two keys diverge here: materialize the node and push
                    // the parked key one level deeper.
                    let base = self.nodes.alloc_block(self.layout.slot_count[element]);
                    self.nodes.set(gidx, Slot::child(base));
                    let prev_element = (prev & mask as u32) as usize;
                    self.nodes.set(
                        self.child_slot(base, element, prev_element),
                        Slot::suffix(prev >> shift),
                    );
                    gidx = self.child_slot(base, element, (key & mask) as usize);
                }
                SlotState::Child(base) => {
                    gidx = self.child_slot(base, element, (key & mask) as usize);
                }
            }
            level += 1;
        }

        // Terminal level: the final field selects a bucket word and a bit.
        let slot = self.nodes.get(gidx);
        key >>= shift;
        let field = key as u32;
        let base = match slot.state() {
            SlotState::Empty => {
                self.nodes.set(gidx, Slot::suffix(field));
                return true;
            }
            SlotState::Suffix(prev) => {
                if prev == field {
                    return false;
                }
                let base = self.leaves.alloc_block(self.layout.leaf_words);
                self.nodes.set(gidx, Slot::child(base));
                *self.leaves.get_mut(base + (prev >> 5)) |= 1 << (prev & 31);
                base
            }
            SlotState::Child(base) => base,
        };
        let word = self.leaves.get_mut(base + (field >> 5));
        let bit = 1u32 << (field & 31);
        if *word & bit != 0 {
            false
        } else {
            *word |= bit;
            true
        }
    }

    /// Global index of the slot for `next` inside the node at `base`, which
    /// was sized for elements greater than `element`.
    #[inline]
    fn child_slot(&self, base: u32, element: usize, next: usize) -> u32 {
        base + self.layout.compact_index[next] - self.layout.compact_index[element] - 1
    }

    /// Current memory footprint in bytes, across both arenas.
    pub fn bytes_allocated(&self) -> usize {
        self.nodes.bytes_allocated() + self.leaves.bytes_allocated()
    }

    /// Footprint broken down by arena.
    pub fn memory_stats(&self) -> MemoryStats {
        let node_bytes = self.nodes.bytes_allocated();
        let leaf_bytes = self.leaves.bytes_allocated();
        MemoryStats {
            node_bytes,
            leaf_bytes,
            total_bytes: node_bytes + leaf_bytes,
        }
    }

    /// The key geometry this set was built for.
    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }
}
