//! Key layout: derived constants and compaction tables.
//!
//! All bit widths, shifts and per-position tables used by the insertion
//! engine are fixed once at construction from four parameters: the number of
//! key elements, the bits per element, the total position count, and a
//! predicate marking disallowed positions.

/// Fixed per-instance key geometry.
///
/// Keys hold `element_count` fields of `bits_per_element` bits each, packed
/// least-significant field first, with field values that are unique, strictly
/// ascending, and never disallowed. The tables compact the sparse position
/// space (disallowed positions removed) into a dense node addressing scheme.
pub struct KeyLayout {
    /// Number of fields in a key.
    pub element_count: usize,
    /// Width of each field in bits.
    pub bits_per_element: u32,
    /// Total positions, including disallowed ones.
    pub total_positions: usize,
    /// Mask extracting the lowest field.
    pub field_mask: u64,
    /// Words per leaf block: one 32-bit mask per bucket of the final field.
    pub leaf_words: u32,
    /// Trie levels that must be walked without path compression before the
    /// remaining key fits the 31-bit compressed-branch payload. Used as an
    /// exclusive bound on the level counter, which starts at 1; a value of 0
    /// or 1 means compression applies from the first level.
    pub uncompressed_levels: usize,
    /// `slot_count[p]`: allowed positions strictly greater than `p`, i.e. the
    /// node size needed when `p` is the element chosen at the current depth.
    pub slot_count: Box<[u32]>,
    /// `compact_index[p]`: rank of `p` among allowed positions. Disallowed
    /// entries hold `u32::MAX`; a valid key never addresses them.
    pub compact_index: Box<[u32]>,
}

impl KeyLayout {
    /// Build the layout for a key geometry.
    ///
    /// # Panics
    /// Panics if the parameters are out of range: `element_count` must be at
    /// least 1, `bits_per_element` in `1..=20`, all fields together must fit
    /// in 64 bits, and `total_positions` must lie between `element_count`
    /// and `1 << bits_per_element` and fit in one arena segment.
    pub fn new(
        element_count: usize,
        bits_per_element: u32,
        total_positions: usize,
        is_disallowed: impl Fn(usize) -> bool,
    ) -> Self {
        assert!(element_count >= 1, "keys need at least one element");
        assert!(
            (1..=20).contains(&bits_per_element),
            "bits_per_element out of range: {bits_per_element}"
        );
        assert!(
            element_count as u64 * u64::from(bits_per_element) <= u64::from(u64::BITS),
            "key does not fit in 64 bits"
        );
        assert!(
            total_positions >= element_count
                && total_positions <= 1 << bits_per_element
                && total_positions <= crate::arena::SEGMENT_LEN,
            "total_positions out of range: {total_positions}"
        );

        let mut slot_count = vec![0u32; total_positions].into_boxed_slice();
        let mut compact_index = vec![0u32; total_positions].into_boxed_slice();

        let mut allowed_above = 0u32;
        for p in (0..total_positions).rev() {
            slot_count[p] = allowed_above;
            if !is_disallowed(p) {
                allowed_above += 1;
            }
        }
        let mut rank = 0u32;
        for p in 0..total_positions {
            if is_disallowed(p) {
                compact_index[p] = u32::MAX;
            } else {
                compact_index[p] = rank;
                rank += 1;
            }
        }

        let total_bits = element_count as u32 * bits_per_element;
        let uncompressed_levels = if total_bits > 31 {
            ((total_bits - 31).div_ceil(bits_per_element)) as usize
        } else {
            0
        };

        Self {
            element_count,
            bits_per_element,
            total_positions,
            field_mask: (1u64 << bits_per_element) - 1,
            leaf_words: 1 << bits_per_element.saturating_sub(5),
            uncompressed_levels,
            slot_count,
            compact_index,
        }
    }
}
