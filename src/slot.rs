//! Three-state slot encoding for trie node entries.
//!
//! Every node slot is a single `i32` word encoding one of three states
//! without a separate tag field:
//! - `0`: empty, nothing has passed through this slot
//! - positive: index of a child block (node or, at the last level, leaf)
//! - negative: a compressed branch. Exactly one key has passed through, and
//!   its remaining bits are stored bitwise-complemented instead of being
//!   expanded into real nodes
//!
//! The payload of a compressed branch must fit in 31 bits (one bit is the
//! sign tag); the insertion engine guarantees this by walking the leading
//! levels of wide keys without compression.

/// Decoded state of a [`Slot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Unused slot.
    Empty,
    /// Global arena index of a child block.
    Child(u32),
    /// Remaining bits of the single key that passed through here.
    Suffix(u32),
}

/// A packed node slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct Slot(i32);

impl Slot {
    /// The empty slot. Also the value freshly allocated blocks are filled
    /// with, so new nodes start out all-empty for free.
    pub const EMPTY: Slot = Slot(0);

    /// Encode a child block index.
    ///
    /// # Panics
    /// Panics if `index` exceeds `i32::MAX`: the arena has outgrown the slot
    /// encoding's addressable range. This is the structure's hard capacity
    /// ceiling (2^31 words per arena).
    #[inline]
    pub fn child(index: u32) -> Slot {
        assert!(
            index <= i32::MAX as u32,
            "arena index {index} exceeds the slot encoding range"
        );
        debug_assert!(index != 0, "index 0 is reserved for the empty slot");
        Slot(index as i32)
    }

    /// Encode a compressed branch holding `bits` (must fit in 31 bits).
    #[inline]
    pub fn suffix(bits: u32) -> Slot {
        debug_assert!(bits <= i32::MAX as u32);
        Slot(!(bits as i32))
    }

    /// Decode into the three-case contract.
    #[inline]
    pub fn state(self) -> SlotState {
        if self.0 == 0 {
            SlotState::Empty
        } else if self.0 > 0 {
            SlotState::Child(self.0 as u32)
        } else {
            SlotState::Suffix(!self.0 as u32)
        }
    }
}
