//! Meshlets: fixed-budget slices of a chunk's index range.

use bytemuck::{Pod, Zeroable};

/// A run of consecutive triangles in the shared index buffer.
///
/// `index_start` is absolute. Every meshlet of a chunk except possibly the
/// last holds exactly the configured maximum.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Meshlet {
    /// First index in the shared index buffer.
    pub index_start: u32,
    /// Number of indices, a multiple of 3.
    pub index_count: u32,
}

impl Meshlet {
    /// Triangles in this meshlet.
    #[inline]
    #[must_use]
    pub const fn triangle_count(&self) -> u32 {
        self.index_count / 3
    }

    /// One past the last index.
    #[inline]
    #[must_use]
    pub const fn index_end(&self) -> u32 {
        self.index_start + self.index_count
    }
}

/// Meshlets needed to cover `index_count` indices.
#[inline]
#[must_use]
pub const fn meshlet_count(index_count: u32, max_indices: u32) -> u32 {
    index_count.div_ceil(max_indices)
}

/// Splits `index_start..index_start + index_count` into meshlets of at most
/// `max_indices` indices, in order.
///
/// `max_indices` must be a positive multiple of 3.
pub fn partition(
    index_start: u32,
    index_count: u32,
    max_indices: u32,
) -> impl Iterator<Item = Meshlet> {
    debug_assert!(max_indices > 0 && max_indices % 3 == 0);
    (0..meshlet_count(index_count, max_indices)).map(move |i| {
        let offset = i * max_indices;
        Meshlet {
            index_start: index_start + offset,
            index_count: max_indices.min(index_count - offset),
        }
    })
}
