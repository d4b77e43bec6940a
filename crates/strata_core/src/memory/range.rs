//! # Range Allocator
//!
//! Contiguous offset reservation inside a fixed-capacity buffer.

use std::ops::Range;

/// Hands out non-overlapping `start..end` ranges of a buffer of fixed capacity.
///
/// New ranges come from the free list first (first-fit, lowest offset wins),
/// then from a bump pointer (the watermark). Freed ranges are recorded at
/// their exact extent and merged with adjacent free ranges; a free range that
/// touches the watermark pulls the watermark back down.
///
/// # Thread Safety
///
/// This allocator is NOT thread-safe. Wrap it in a mutex.
///
/// # Example
///
/// ```rust
/// use strata_core::RangeAllocator;
///
/// let mut alloc = RangeAllocator::new(100);
/// let a = alloc.allocate(40).unwrap();
/// let b = alloc.allocate(40).unwrap();
/// assert!(alloc.allocate(40).is_none());
///
/// alloc.free(a);
/// assert_eq!(alloc.allocate(30), Some(0..30));
/// assert_eq!(b, 40..80);
/// ```
#[derive(Debug, Clone)]
pub struct RangeAllocator {
    /// Total capacity in elements.
    capacity: u32,
    /// One past the highest offset ever handed out and still reachable.
    watermark: u32,
    /// Free extents below the watermark, sorted by start, never adjacent.
    free_list: Vec<Range<u32>>,
    /// Elements currently handed out.
    allocated: u32,
}

impl RangeAllocator {
    /// Creates an allocator for a buffer of `capacity` elements.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            watermark: 0,
            free_list: Vec::new(),
            allocated: 0,
        }
    }

    /// Total capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// One past the highest occupied offset.
    #[inline]
    #[must_use]
    pub const fn watermark(&self) -> u32 {
        self.watermark
    }

    /// Elements currently handed out.
    #[inline]
    #[must_use]
    pub const fn allocated(&self) -> u32 {
        self.allocated
    }

    /// Elements not handed out, fragmented or not.
    #[inline]
    #[must_use]
    pub const fn free_space(&self) -> u32 {
        self.capacity - self.allocated
    }

    /// Longest range a single `allocate` call can currently satisfy.
    #[must_use]
    pub fn largest_free(&self) -> u32 {
        let tail = self.capacity - self.watermark;
        self.free_list
            .iter()
            .map(|r| r.end - r.start)
            .fold(tail, u32::max)
    }

    /// Free extents below the watermark.
    #[must_use]
    pub fn free_ranges(&self) -> &[Range<u32>] {
        &self.free_list
    }

    /// Reserves `len` contiguous elements.
    ///
    /// A zero-length request always succeeds with an empty range at 0.
    ///
    /// # Returns
    ///
    /// The reserved range, or None if no contiguous extent is large enough.
    pub fn allocate(&mut self, len: u32) -> Option<Range<u32>> {
        if len == 0 {
            return Some(0..0);
        }

        if let Some(slot) = self.free_list.iter().position(|r| r.end - r.start >= len) {
            let start = self.free_list[slot].start;
            if self.free_list[slot].end - start == len {
                self.free_list.remove(slot);
            } else {
                self.free_list[slot].start += len;
            }
            self.allocated += len;
            return Some(start..start + len);
        }

        let end = self.watermark.checked_add(len)?;
        if end > self.capacity {
            return None;
        }
        let start = self.watermark;
        self.watermark = end;
        self.allocated += len;
        Some(start..end)
    }

    /// Returns a range to the allocator.
    ///
    /// The range must have come from `allocate` on this allocator and not have
    /// been freed since. Empty ranges are ignored.
    pub fn free(&mut self, range: Range<u32>) {
        if range.is_empty() {
            return;
        }
        debug_assert!(range.end <= self.watermark, "freeing a range that was never allocated");
        debug_assert!(
            self.free_list.iter().all(|r| r.end <= range.start || r.start >= range.end),
            "double free of {range:?}"
        );

        self.allocated -= range.end - range.start;

        let slot = self.free_list.partition_point(|r| r.start < range.start);
        let mut merged = range;

        // Merge with the following extent.
        if slot < self.free_list.len() && self.free_list[slot].start == merged.end {
            merged.end = self.free_list[slot].end;
            self.free_list.remove(slot);
        }
        // Merge with the preceding extent.
        if slot > 0 && self.free_list[slot - 1].end == merged.start {
            merged.start = self.free_list[slot - 1].start;
            self.free_list.remove(slot - 1);
            self.insert_or_trim(slot - 1, merged);
        } else {
            self.insert_or_trim(slot, merged);
        }
    }

    /// Releases everything.
    pub fn clear(&mut self) {
        self.watermark = 0;
        self.free_list.clear();
        self.allocated = 0;
    }

    fn insert_or_trim(&mut self, slot: usize, range: Range<u32>) {
        if range.end == self.watermark {
            self.watermark = range.start;
        } else {
            self.free_list.insert(slot, range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_allocation() {
        let mut alloc = RangeAllocator::new(10);
        assert_eq!(alloc.allocate(3), Some(0..3));
        assert_eq!(alloc.allocate(7), Some(3..10));
        assert_eq!(alloc.allocate(1), None);
        assert_eq!(alloc.allocated(), 10);
        assert_eq!(alloc.free_space(), 0);
    }

    #[test]
    fn test_zero_length_never_fails() {
        let mut alloc = RangeAllocator::new(0);
        assert_eq!(alloc.allocate(0), Some(0..0));
        assert_eq!(alloc.allocate(1), None);
    }

    #[test]
    fn test_exact_extent_reuse() {
        let mut alloc = RangeAllocator::new(100);
        let a = alloc.allocate(10).unwrap();
        let _b = alloc.allocate(10).unwrap();

        alloc.free(a.clone());
        assert_eq!(alloc.free_ranges(), &[0..10]);
        assert_eq!(alloc.allocate(10), Some(a));
        assert!(alloc.free_ranges().is_empty());
    }

    #[test]
    fn test_split_leaves_remainder() {
        let mut alloc = RangeAllocator::new(100);
        let a = alloc.allocate(10).unwrap();
        let _b = alloc.allocate(10).unwrap();
        alloc.free(a);

        assert_eq!(alloc.allocate(4), Some(0..4));
        assert_eq!(alloc.free_ranges(), &[4..10]);
    }

    #[test]
    fn test_tail_free_lowers_watermark() {
        let mut alloc = RangeAllocator::new(100);
        let a = alloc.allocate(10).unwrap();
        let b = alloc.allocate(10).unwrap();
        let c = alloc.allocate(10).unwrap();
        assert_eq!(alloc.watermark(), 30);

        alloc.free(b);
        assert_eq!(alloc.watermark(), 30);
        alloc.free(c);
        // b and c merge and both fall off the tail.
        assert_eq!(alloc.watermark(), 10);
        assert!(alloc.free_ranges().is_empty());

        alloc.free(a);
        assert_eq!(alloc.watermark(), 0);
        assert_eq!(alloc.allocated(), 0);
    }

    #[test]
    fn test_coalesce_both_sides() {
        let mut alloc = RangeAllocator::new(100);
        let a = alloc.allocate(10).unwrap();
        let b = alloc.allocate(10).unwrap();
        let c = alloc.allocate(10).unwrap();
        let _d = alloc.allocate(10).unwrap();

        alloc.free(a);
        alloc.free(c);
        assert_eq!(alloc.free_ranges(), &[0..10, 20..30]);

        alloc.free(b);
        assert_eq!(alloc.free_ranges(), &[0..30]);
        assert_eq!(alloc.largest_free(), 60);
    }

    #[test]
    fn test_fragmentation_reports_largest_free() {
        let mut alloc = RangeAllocator::new(30);
        let a = alloc.allocate(10).unwrap();
        let _b = alloc.allocate(10).unwrap();
        let _c = alloc.allocate(10).unwrap();
        alloc.free(a);

        assert_eq!(alloc.free_space(), 10);
        assert_eq!(alloc.largest_free(), 10);
        assert_eq!(alloc.allocate(11), None);
    }

    #[test]
    fn test_clear() {
        let mut alloc = RangeAllocator::new(10);
        let _ = alloc.allocate(5);
        alloc.clear();
        assert_eq!(alloc.watermark(), 0);
        assert_eq!(alloc.allocate(10), Some(0..10));
    }
}
