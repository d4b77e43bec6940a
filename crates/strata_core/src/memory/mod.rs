//! # Memory Management
//!
//! Offset allocation for the shared geometry buffers.
//!
//! ## Design Philosophy
//!
//! Buffers have a fixed capacity decided at startup. Chunks reserve
//! contiguous ranges; freed ranges are recorded at their exact extent and
//! reused first-fit. Nothing ever moves, so an offset handed out stays valid
//! until its owner frees it.

mod range;

pub use range::RangeAllocator;
