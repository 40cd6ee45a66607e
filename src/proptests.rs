use super::*;

use proptest::prelude::*;
use std::collections::HashSet;

use crate::arena::{SegmentArena, SEGMENT_LEN};

/// Pack sorted positions into a key, least-significant field first.
fn pack(fields: &[u32], bits: u32) -> u64 {
    let mut key = 0u64;
    for (i, &f) in fields.iter().enumerate() {
        key |= u64::from(f) << (i as u32 * bits);
    }
    key
}

/// Strategy for valid keys: `elements` distinct allowed positions, ascending.
fn key_strategy(
    bits: u32,
    positions: usize,
    elements: usize,
    disallowed: fn(usize) -> bool,
) -> impl Strategy<Value = u64> {
    let allowed: Vec<u32> = (0..positions as u32)
        .filter(|&p| !disallowed(p as usize))
        .collect();
    prop::collection::btree_set(prop::sample::select(allowed), elements)
        .prop_map(move |set| pack(&set.into_iter().collect::<Vec<_>>(), bits))
}

/// Drive a `TrieSet` and a `HashSet` with the same keys and require identical
/// answers, then re-query every key in a fixed order.
fn check_against_model(mut set: TrieSet, keys: Vec<u64>) -> Result<(), TestCaseError> {
    let mut model: HashSet<u64> = HashSet::new();
    let mut bytes = set.bytes_allocated();

    for &key in &keys {
        prop_assert_eq!(set.add(key), model.insert(key));
        let now = set.bytes_allocated();
        prop_assert!(now >= bytes);
        bytes = now;
    }
    // No false negatives: everything inserted stays a duplicate.
    let mut seen: Vec<u64> = model.iter().copied().collect();
    seen.sort_unstable();
    for key in seen {
        prop_assert!(!set.add(key));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_matches_hashset_narrow(
        keys in prop::collection::vec(key_strategy(4, 16, 3, |_| false), 1..300)
    ) {
        // 12-bit keys: compression from the first level.
        let set = TrieSet::new(3, 4, 16, |_| false);
        check_against_model(set, keys)?;
    }

    #[test]
    fn prop_matches_hashset_wide(
        keys in prop::collection::vec(key_strategy(8, 256, 5, |_| false), 1..300)
    ) {
        // 40-bit keys: exercises the uncompressed prefix levels.
        let set = TrieSet::new(5, 8, 256, |_| false);
        check_against_model(set, keys)?;
    }

    #[test]
    fn prop_matches_hashset_with_disallowed(
        keys in prop::collection::vec(key_strategy(4, 16, 3, |p| p % 5 == 0), 1..300)
    ) {
        let set = TrieSet::new(3, 4, 16, |p| p % 5 == 0);
        check_against_model(set, keys)?;
    }

    #[test]
    fn prop_arena_indices_stable_across_growth(
        sizes in prop::collection::vec(1u32..500, 1..400)
    ) {
        // Previously issued indices must keep addressing the same words no
        // matter how many segments are appended afterwards.
        let mut arena: SegmentArena<u32> = SegmentArena::new();
        let mut blocks: Vec<(u32, u32)> = Vec::new();
        for (i, &size) in sizes.iter().enumerate() {
            let block = arena.alloc_block(size);
            let stamp = i as u32 + 1;
            arena.set(block, stamp);
            arena.set(block + size - 1, stamp);
            // The block must lie within a single segment.
            let (seg_a, _) = SegmentArena::<u32>::address_of(block);
            let (seg_b, _) = SegmentArena::<u32>::address_of(block + size - 1);
            prop_assert_eq!(seg_a, seg_b);
            blocks.push((block, size));
        }
        for (i, &(block, size)) in blocks.iter().enumerate() {
            let stamp = i as u32 + 1;
            prop_assert_eq!(arena.get(block), stamp);
            prop_assert_eq!(arena.get(block + size - 1), stamp);
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    // Insertion order changes which compressed branches get materialized,
    // never the answers.
    let keys: Vec<u64> = [
        [0u32, 1, 2],
        [0, 1, 3],
        [0, 2, 3],
        [1, 2, 3],
        [0, 1, 5],
        [3, 4, 5],
    ]
    .iter()
    .map(|t| pack(t, 3))
    .collect();

    for_each_permutation(&keys, |perm| {
        let mut set = TrieSet::new(3, 3, 6, |_| false);
        for key in perm {
            assert!(set.add(key));
        }
        for &key in &keys {
            assert!(!set.add(key));
        }
    });
}

#[test]
fn randomized_vs_hashset_wide() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(12345);
    let mut set = TrieSet::new(5, 8, 256, |_| false);
    let mut model: HashSet<u64> = HashSet::new();
    let mut last_bytes = set.bytes_allocated();

    for _ in 0..50_000 {
        // Five distinct sorted positions out of 256.
        let mut fields: Vec<u32> = Vec::with_capacity(5);
        while fields.len() < 5 {
            let p = rng.gen_range(0..256u32);
            if !fields.contains(&p) {
                fields.push(p);
            }
        }
        fields.sort_unstable();
        let key = pack(&fields, 8);
        assert_eq!(set.add(key), model.insert(key));

        let bytes = set.bytes_allocated();
        assert!(bytes >= last_bytes);
        last_bytes = bytes;
    }
    // Everything ever inserted is still reported as a duplicate.
    for &key in model.iter() {
        assert!(!set.add(key));
    }
    assert_eq!(set.bytes_allocated(), last_bytes);
}

#[test]
fn randomized_vs_hashset_with_walls() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn wall(p: usize) -> bool {
        p % 7 == 0
    }

    let mut rng = StdRng::seed_from_u64(98765);
    let allowed: Vec<u32> = (0..64u32).filter(|&p| !wall(p as usize)).collect();
    let mut set = TrieSet::new(4, 6, 64, wall);
    let mut model: HashSet<u64> = HashSet::new();

    for _ in 0..20_000 {
        let mut fields: Vec<u32> = Vec::with_capacity(4);
        while fields.len() < 4 {
            let p = allowed[rng.gen_range(0..allowed.len())];
            if !fields.contains(&p) {
                fields.push(p);
            }
        }
        fields.sort_unstable();
        let key = pack(&fields, 6);
        assert_eq!(set.add(key), model.insert(key));
    }
    for &key in model.iter() {
        assert!(!set.add(key));
    }
}

#[test]
fn segment_boundary_torture() {
    // Every 4-subset of 64 positions: enough blocks to push the leaf arena
    // past a segment boundary. Answers must be unaffected by growth.
    let mut set = TrieSet::new(4, 6, 64, |_| false);
    let mut count = 0u64;
    for a in 0..61u32 {
        for b in (a + 1)..62 {
            for c in (b + 1)..63 {
                for d in (c + 1)..64 {
                    assert!(set.add(pack(&[a, b, c, d], 6)));
                    count += 1;
                }
            }
        }
    }
    assert_eq!(count, 635_376); // C(64, 4)
    // Root segment of nodes plus at least two leaf segments.
    assert!(set.bytes_allocated() >= 3 * SEGMENT_LEN * 4);
    for a in 0..61u32 {
        for b in (a + 1)..62 {
            for c in (b + 1)..63 {
                for d in (c + 1)..64 {
                    assert!(!set.add(pack(&[a, b, c, d], 6)));
                }
            }
        }
    }
}
