//! Segmented bump arena for node and leaf storage.
//!
//! Both arenas of a [`TrieSet`](crate::TrieSet) are instances of the same
//! generic store: an append-only directory of fixed-size segments with a bump
//! pointer. This gives us:
//! - Pointer-free addressing (32-bit global indices instead of references)
//! - Stable indices: a segment never moves once allocated, so every index
//!   handed out stays valid for the arena's lifetime
//! - Cheap memory accounting (whole segments only)
//!
//! There is no free operation. Space abandoned at a segment boundary when a
//! block would not fit is simply wasted.

use smallvec::SmallVec;

/// log2 of the segment length in words.
pub const SEGMENT_SHIFT: u32 = 16;

/// Words per segment.
pub const SEGMENT_LEN: usize = 1 << SEGMENT_SHIFT;

const SEGMENT_MASK: u32 = (SEGMENT_LEN - 1) as u32;

/// A growable, append-only store of fixed-size word segments.
///
/// Blocks are allocated with [`alloc_block`](Self::alloc_block) and addressed
/// by `u32` global index. A block never straddles a segment boundary, so a
/// block's words are always contiguous in memory.
pub struct SegmentArena<T> {
    /// Segment directory. Inline for the common case of a few segments.
    segments: SmallVec<[Box<[T]>; 4]>,
    /// Bump pointer: global index of the next free word.
    next: u32,
    /// Global index one past the end of the current segment.
    limit: u32,
}

impl<T: Copy + Default> SegmentArena<T> {
    /// Create an empty arena. The first `alloc_block` returns index 0.
    pub fn new() -> Self {
        Self::with_reserved(0)
    }

    /// Create an empty arena whose index range `[0, words)` is reserved and
    /// never handed out.
    ///
    /// No segment is allocated up front; the reservation only offsets the
    /// bump pointer. The leaf arena uses this to keep index 0 unused, since 0
    /// doubles as the empty slot value.
    pub fn with_reserved(words: u32) -> Self {
        debug_assert!((words as usize) < SEGMENT_LEN);
        Self {
            segments: SmallVec::new(),
            next: words,
            limit: 0,
        }
    }

    /// Allocate a zeroed block of `len` words and return its global index.
    ///
    /// If the block would cross the current segment's end, a fresh segment is
    /// appended first and the block starts there. Indices are monotonically
    /// increasing and never reused.
    pub fn alloc_block(&mut self, len: u32) -> u32 {
        debug_assert!(len as usize <= SEGMENT_LEN);
        if self.next + len > self.limit {
            self.segments.push(vec![T::default(); SEGMENT_LEN].into_boxed_slice());
            // A pre-segment reservation leaves `next` inside the new segment;
            // otherwise the remainder of the old segment is abandoned.
            self.next = self.next.max(self.limit);
            self.limit += SEGMENT_LEN as u32;
        }
        let index = self.next;
        self.next += len;
        index
    }

    /// Split a global index into (segment, offset within segment).
    #[inline]
    pub fn address_of(index: u32) -> (usize, usize) {
        ((index >> SEGMENT_SHIFT) as usize, (index & SEGMENT_MASK) as usize)
    }

    /// Read the word at a global index.
    #[inline]
    pub fn get(&self, index: u32) -> T {
        let (seg, off) = Self::address_of(index);
        self.segments[seg][off]
    }

    /// Mutable access to the word at a global index.
    #[inline]
    pub fn get_mut(&mut self, index: u32) -> &mut T {
        let (seg, off) = Self::address_of(index);
        &mut self.segments[seg][off]
    }

    /// Write the word at a global index.
    #[inline]
    pub fn set(&mut self, index: u32, value: T) {
        *self.get_mut(index) = value;
    }

    /// Total bytes held by allocated segments.
    ///
    /// Counts whole segments, including slack not yet bump-allocated, which
    /// matches what the process actually pays for.
    pub fn bytes_allocated(&self) -> usize {
        self.segments.len() * SEGMENT_LEN * std::mem::size_of::<T>()
    }
}

impl<T: Copy + Default> Default for SegmentArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
