//! # Range Allocator Properties
//!
//! Random allocate/free sequences must never hand out overlapping ranges or
//! lose track of space.

use std::ops::Range;

use proptest::prelude::*;
use strata_core::RangeAllocator;

#[derive(Debug, Clone)]
enum Op {
    Allocate(u32),
    Free(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u32..40).prop_map(Op::Allocate),
        2 => any::<usize>().prop_map(Op::Free),
    ]
}

fn overlaps(a: &Range<u32>, b: &Range<u32>) -> bool {
    a.start < b.end && b.start < a.end
}

proptest! {
    #[test]
    fn live_ranges_never_overlap(ops in prop::collection::vec(op(), 1..200)) {
        let mut alloc = RangeAllocator::new(256);
        let mut live: Vec<Range<u32>> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate(len) => {
                    if let Some(range) = alloc.allocate(len) {
                        prop_assert_eq!(range.end - range.start, len);
                        if !range.is_empty() {
                            live.push(range);
                        }
                    } else {
                        prop_assert!(alloc.largest_free() < len);
                    }
                }
                Op::Free(pick) => {
                    if !live.is_empty() {
                        let range = live.swap_remove(pick % live.len());
                        alloc.free(range);
                    }
                }
            }

            for (i, a) in live.iter().enumerate() {
                prop_assert!(a.end <= alloc.watermark());
                for b in &live[i + 1..] {
                    prop_assert!(!overlaps(a, b), "{:?} overlaps {:?}", a, b);
                }
                for f in alloc.free_ranges() {
                    prop_assert!(!overlaps(a, f), "live {:?} overlaps free {:?}", a, f);
                }
            }

            let used: u32 = live.iter().map(|r| r.end - r.start).sum();
            prop_assert_eq!(used, alloc.allocated());
            let free_below: u32 = alloc.free_ranges().iter().map(|r| r.end - r.start).sum();
            prop_assert_eq!(used + free_below, alloc.watermark());
        }
    }

    #[test]
    fn freeing_everything_resets_watermark(lens in prop::collection::vec(1u32..20, 1..30)) {
        let mut alloc = RangeAllocator::new(1024);
        let ranges: Vec<_> = lens.iter().filter_map(|&len| alloc.allocate(len)).collect();

        // Free in an interleaved order to exercise merging from both sides.
        let (even, odd): (Vec<_>, Vec<_>) = ranges.into_iter().enumerate().partition(|(i, _)| i % 2 == 0);
        for (_, r) in even.into_iter().chain(odd) {
            alloc.free(r);
        }

        prop_assert_eq!(alloc.watermark(), 0);
        prop_assert_eq!(alloc.allocated(), 0);
        prop_assert!(alloc.free_ranges().is_empty());
    }
}
