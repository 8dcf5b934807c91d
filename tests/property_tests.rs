//! Property tests for chunking, grouping and merging.

use lazyseq::lazyseq_core::source::from_vec;
use lazyseq::lazyseq_operators::{chunk, collect_chunks, collect_groups, group_by, interleave, to_vec};
use proptest::prelude::*;

proptest! {
    #[test]
    fn chunks_partition_input_within_target(
        sizes in prop::collection::vec(0u32..20, 0..64),
        target in 1u32..40,
    ) {
        let windows = collect_chunks(chunk(from_vec(sizes.clone()), target, |s: &u32| Ok(*s))).unwrap();

        let flattened: Vec<u32> = windows.iter().flatten().copied().collect();
        prop_assert_eq!(&flattened, &sizes);

        for (i, window) in windows.iter().enumerate() {
            prop_assert!(!window.is_empty());
            let total: u32 = window.iter().sum();
            prop_assert!(total <= target || window.len() == 1);
            // Greedy: the next window's first item would not have fit.
            if let Some(next) = windows.get(i + 1) {
                prop_assert!(total + next[0] > target);
            }
        }
    }

    #[test]
    fn chunks_of_u8_sizes_never_exceed_target(
        sizes in prop::collection::vec(any::<u8>(), 0..64),
        target in 1u8..=u8::MAX,
    ) {
        let windows = collect_chunks(chunk(from_vec(sizes.clone()), target, |s: &u8| Ok(*s))).unwrap();
        let flattened: Vec<u8> = windows.iter().flatten().copied().collect();
        prop_assert_eq!(&flattened, &sizes);
        for window in &windows {
            let total: u32 = window.iter().map(|s| u32::from(*s)).sum();
            prop_assert!(total <= u32::from(target) || window.len() == 1);
        }
    }

    #[test]
    fn chunk_by_count_fills_every_window_but_the_last(
        items in prop::collection::vec(any::<i16>(), 0..64),
        count in 1usize..8,
    ) {
        let windows = collect_chunks(lazyseq::lazyseq_operators::chunk_by_count(from_vec(items.clone()), count)).unwrap();
        prop_assert_eq!(windows.len(), items.len().div_ceil(count));
        if let Some((last, full)) = windows.split_last() {
            prop_assert!(full.iter().all(|w| w.len() == count));
            prop_assert!(!last.is_empty() && last.len() <= count);
        }
    }

    #[test]
    fn groups_are_maximal_runs(keys in prop::collection::vec(0u8..3, 0..64)) {
        let groups = collect_groups(group_by(from_vec(keys.clone()), |k: &u8| Ok(*k))).unwrap();

        let flattened: Vec<u8> = groups.iter().flat_map(|g| g.items.iter().copied()).collect();
        prop_assert_eq!(&flattened, &keys);

        for group in &groups {
            prop_assert!(!group.items.is_empty());
            prop_assert!(group.items.iter().all(|k| *k == group.key));
        }
        for pair in groups.windows(2) {
            prop_assert_ne!(pair[0].key, pair[1].key);
        }
    }

    #[test]
    fn interleave_is_a_sorted_permutation(
        mut runs in prop::collection::vec(prop::collection::vec(any::<i32>(), 0..16), 0..6),
    ) {
        for run in &mut runs {
            run.sort_unstable();
        }
        let mut expected: Vec<i32> = runs.iter().flatten().copied().collect();
        expected.sort();

        let sources = runs.into_iter().map(from_vec).collect();
        let merged = to_vec(interleave(sources, |x: &i32| Ok(*x))).unwrap();
        prop_assert_eq!(merged, expected);
    }
}
