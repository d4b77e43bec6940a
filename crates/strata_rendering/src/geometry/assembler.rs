//! # Chunk Geometry Assembler
//!
//! Owns the shared vertex, index and meshlet buffers and one `ChunkData`
//! record per live chunk.
//!
//! ## Locking
//!
//! ```text
//!   reserve ──► ledger (Mutex)   allocators + records, short critical section
//!   commit  ──► storage (RwLock, write) copies into the reserved ranges
//!           ──► ledger (Mutex)   publish the record, retire the old one
//! ```
//!
//! The two locks are never held at the same time. Reservation is all or
//! nothing across the three buffers, so concurrent producers never receive
//! overlapping ranges and a failed reservation leaves nothing behind.
//!
//! Copies are serialized: every commit takes the storage write lock, so
//! commits from different workers run one at a time and a live
//! `GeometryBuffers` guard blocks them all. Reservations never wait on
//! copies; only the ledger lock is shared between them.
//!
//! ## Retirement
//!
//! Geometry of a replaced or removed chunk may still be read by draws in
//! flight. Its ranges are retired, not freed, until the renderer calls
//! `release_retired`.

use std::collections::HashMap;
use std::ops::Range;

use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use strata_core::RangeAllocator;
use strata_shared::constants::{
    DEFAULT_INDEX_CAPACITY, DEFAULT_MESHLET_CAPACITY, DEFAULT_VERTEX_CAPACITY,
};
use strata_shared::{ChunkCoord, MESHLET_MAX_INDICES};
use tracing::{debug, warn};

use super::chunk_data::{ChunkData, ChunkExtent, DrawIndexedIndirectArgs};
use super::error::{AssemblerError, AssemblerResult, GeometryBuffer};
use super::meshlet::{meshlet_count, partition, Meshlet};
use crate::isosurface::{ChunkMesh, Vertex};

// =============================================================================
// CAPACITY & USAGE
// =============================================================================

/// Element capacity of each shared buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryCapacity {
    /// Vertices.
    pub vertices: u32,
    /// Indices.
    pub indices: u32,
    /// Meshlets.
    pub meshlets: u32,
}

impl GeometryCapacity {
    /// Creates a capacity.
    #[must_use]
    pub const fn new(vertices: u32, indices: u32, meshlets: u32) -> Self {
        Self {
            vertices,
            indices,
            meshlets,
        }
    }
}

impl Default for GeometryCapacity {
    fn default() -> Self {
        Self::new(
            DEFAULT_VERTEX_CAPACITY,
            DEFAULT_INDEX_CAPACITY,
            DEFAULT_MESHLET_CAPACITY,
        )
    }
}

/// Occupancy of one shared buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferUsage {
    /// One past the highest occupied element. Upload `0..watermark`.
    pub watermark: u32,
    /// Elements reserved by live, pending and retired chunks.
    pub allocated: u32,
    /// Total capacity.
    pub capacity: u32,
}

impl BufferUsage {
    fn of(alloc: &RangeAllocator) -> Self {
        Self {
            watermark: alloc.watermark(),
            allocated: alloc.allocated(),
            capacity: alloc.capacity(),
        }
    }
}

/// Occupancy of all three buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryUsage {
    /// Vertex buffer.
    pub vertices: BufferUsage,
    /// Index buffer.
    pub indices: BufferUsage,
    /// Meshlet buffer.
    pub meshlets: BufferUsage,
}

// =============================================================================
// INTERNAL STATE
// =============================================================================

/// Allocation state and records, guarded by the ledger lock.
#[derive(Debug)]
struct Ledger {
    vertices: RangeAllocator,
    indices: RangeAllocator,
    meshlets: RangeAllocator,
    live: HashMap<ChunkCoord, ChunkExtent>,
    pending: HashMap<ChunkCoord, ChunkExtent>,
    retired: Vec<ChunkExtent>,
}

impl Ledger {
    fn new(capacity: GeometryCapacity) -> Self {
        Self {
            vertices: RangeAllocator::new(capacity.vertices),
            indices: RangeAllocator::new(capacity.indices),
            meshlets: RangeAllocator::new(capacity.meshlets),
            live: HashMap::new(),
            pending: HashMap::new(),
            retired: Vec::new(),
        }
    }

    /// Reserves all three ranges or none.
    fn allocate(&mut self, vertices: u32, indices: u32, meshlets: u32) -> AssemblerResult<ChunkExtent> {
        let v = Self::take(&mut self.vertices, GeometryBuffer::Vertex, vertices)?;
        let i = match Self::take(&mut self.indices, GeometryBuffer::Index, indices) {
            Ok(range) => range,
            Err(err) => {
                self.vertices.free(v);
                return Err(err);
            }
        };
        let m = match Self::take(&mut self.meshlets, GeometryBuffer::Meshlet, meshlets) {
            Ok(range) => range,
            Err(err) => {
                self.vertices.free(v);
                self.indices.free(i);
                return Err(err);
            }
        };
        Ok(ChunkExtent {
            vertices: v,
            indices: i,
            meshlets: m,
        })
    }

    fn take(alloc: &mut RangeAllocator, buffer: GeometryBuffer, len: u32) -> AssemblerResult<Range<u32>> {
        alloc
            .allocate(len)
            .ok_or_else(|| AssemblerError::CapacityExceeded {
                buffer,
                requested: len,
                available: alloc.largest_free(),
            })
    }

    fn free(&mut self, extent: ChunkExtent) {
        self.vertices.free(extent.vertices);
        self.indices.free(extent.indices);
        self.meshlets.free(extent.meshlets);
    }

    fn usage(&self) -> GeometryUsage {
        GeometryUsage {
            vertices: BufferUsage::of(&self.vertices),
            indices: BufferUsage::of(&self.indices),
            meshlets: BufferUsage::of(&self.meshlets),
        }
    }
}

/// The shared arrays, guarded by the storage lock.
///
/// Arrays grow on demand up to the reserved watermark and never past the
/// configured capacity.
#[derive(Debug, Default)]
struct Storage {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    meshlets: Vec<Meshlet>,
}

/// Copies `src` into `dst[range]`, growing `dst` to fit.
fn write_range<T: Copy + Default>(dst: &mut Vec<T>, range: &Range<u32>, src: &[T]) {
    let (start, end) = (range.start as usize, range.end as usize);
    if dst.len() < end {
        dst.resize(end, T::default());
    }
    dst[start..end].copy_from_slice(src);
}

/// What `reserve_with` requires of the chunk's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Liveness {
    Absent,
    Live,
    Any,
}

// =============================================================================
// PUBLIC RESULTS
// =============================================================================

/// Outcome of committing geometry for a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplacedChunk {
    /// The chunk's record before the commit, if it was live. Its ranges are
    /// now retired.
    pub previous: Option<ChunkData>,
    /// The chunk's new record.
    pub current: ChunkData,
}

/// Live chunks laid out for one multi-draw.
///
/// Slot `i` of each array belongs to `chunks[i]`; chunks are in coordinate
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawList {
    /// Chunk of each slot.
    pub chunks: Vec<ChunkCoord>,
    /// `ChunkData` of each slot.
    pub records: Vec<ChunkData>,
    /// Indirect draw arguments of each slot.
    pub draws: Vec<DrawIndexedIndirectArgs>,
}

impl DrawList {
    /// Records as bytes for upload.
    #[must_use]
    pub fn record_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    /// Indirect arguments as bytes for upload.
    #[must_use]
    pub fn draw_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.draws)
    }
}

// =============================================================================
// RESERVATION
// =============================================================================

/// Ranges reserved for one chunk, not yet filled.
///
/// Commit with `commit`. Dropping an uncommitted reservation returns its
/// ranges to the assembler.
#[must_use = "dropping a reservation releases its ranges"]
#[derive(Debug)]
pub struct Reservation<'a> {
    assembler: &'a ChunkGeometryAssembler,
    chunk: ChunkCoord,
    extent: ChunkExtent,
    done: bool,
}

impl<'a> Reservation<'a> {
    /// Chunk the ranges belong to.
    #[must_use]
    pub const fn chunk(&self) -> ChunkCoord {
        self.chunk
    }

    /// Reserved ranges.
    #[must_use]
    pub const fn extent(&self) -> &ChunkExtent {
        &self.extent
    }

    /// The record the chunk will have once committed.
    #[must_use]
    pub fn chunk_data(&self) -> ChunkData {
        self.extent.chunk_data()
    }

    /// Copies the chunk's geometry into the reserved ranges and publishes
    /// its record. A previous record for the chunk is retired.
    ///
    /// # Errors
    ///
    /// `ReservationMismatch` if the data lengths differ from the reserved
    /// counts, `IndexOutOfRange` if an index is not below the vertex count.
    /// The reservation is released in both cases.
    pub fn commit(mut self, vertices: &[Vertex], indices: &[u32]) -> AssemblerResult<ReplacedChunk> {
        self.check(vertices, indices)?;
        let assembler = self.assembler;
        let max = assembler.meshlet_max_indices;

        {
            let mut storage = assembler.storage.write();
            write_range(&mut storage.vertices, &self.extent.vertices, vertices);
            write_range(&mut storage.indices, &self.extent.indices, indices);

            let meshlets: Vec<Meshlet> =
                partition(self.extent.indices.start, self.extent.index_count(), max).collect();
            write_range(&mut storage.meshlets, &self.extent.meshlets, &meshlets);
        }

        self.done = true;
        let current = self.extent.chunk_data();
        let mut ledger = assembler.ledger.lock();
        ledger.pending.remove(&self.chunk);
        let previous = ledger.live.insert(self.chunk, self.extent.clone());
        let previous = previous.map(|old| {
            let data = old.chunk_data();
            debug!(chunk = ?self.chunk, ?data, "retired chunk geometry");
            ledger.retired.push(old);
            data
        });
        Ok(ReplacedChunk { previous, current })
    }

    fn check(&self, vertices: &[Vertex], indices: &[u32]) -> AssemblerResult<()> {
        let mismatch = |buffer, reserved, actual| AssemblerError::ReservationMismatch {
            chunk: self.chunk,
            buffer,
            reserved,
            actual,
        };
        let vertex_count = self.extent.vertex_count();
        if vertices.len() != vertex_count as usize {
            return Err(mismatch(GeometryBuffer::Vertex, vertex_count, vertices.len()));
        }
        if indices.len() != self.extent.index_count() as usize {
            return Err(mismatch(GeometryBuffer::Index, self.extent.index_count(), indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i >= vertex_count) {
            return Err(AssemblerError::IndexOutOfRange {
                chunk: self.chunk,
                index,
                vertex_count,
            });
        }
        Ok(())
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.assembler.cancel(self.chunk, &self.extent);
        }
    }
}

// =============================================================================
// ASSEMBLER
// =============================================================================

/// Packs per-chunk meshes into shared GPU buffers.
///
/// Safe to share across threads (`Arc<ChunkGeometryAssembler>`); every
/// operation takes `&self`.
///
/// # Example
///
/// ```rust
/// use strata_rendering::geometry::{ChunkGeometryAssembler, GeometryCapacity};
/// use strata_rendering::Vertex;
/// use strata_shared::ChunkCoord;
///
/// let assembler = ChunkGeometryAssembler::new(GeometryCapacity::new(64, 64, 8), 6);
/// let vertices = [Vertex::default(); 3];
/// let data = assembler.append(ChunkCoord::new(0, 0, 0), &vertices, &[0, 1, 2]).unwrap();
/// assert_eq!(data.meshlet_count, 1);
/// assert!(assembler.validate().is_ok());
/// ```
#[derive(Debug)]
pub struct ChunkGeometryAssembler {
    capacity: GeometryCapacity,
    meshlet_max_indices: u32,
    ledger: Mutex<Ledger>,
    storage: RwLock<Storage>,
}

impl ChunkGeometryAssembler {
    /// Creates an empty assembler.
    ///
    /// # Panics
    ///
    /// Panics if `meshlet_max_indices` is zero or not a multiple of 3.
    #[must_use]
    pub fn new(capacity: GeometryCapacity, meshlet_max_indices: u32) -> Self {
        assert!(
            meshlet_max_indices > 0 && meshlet_max_indices % 3 == 0,
            "meshlet size must be a positive multiple of 3, got {meshlet_max_indices}"
        );
        Self {
            capacity,
            meshlet_max_indices,
            ledger: Mutex::new(Ledger::new(capacity)),
            storage: RwLock::new(Storage::default()),
        }
    }

    /// Buffer capacities.
    #[must_use]
    pub const fn capacity(&self) -> GeometryCapacity {
        self.capacity
    }

    /// Most indices per meshlet.
    #[must_use]
    pub const fn meshlet_max_indices(&self) -> u32 {
        self.meshlet_max_indices
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Reserves ranges for `chunk`, whether or not it is live.
    ///
    /// Committing the reservation replaces any live record.
    ///
    /// # Errors
    ///
    /// `ReservationPending` if the chunk already has an uncommitted
    /// reservation, `PartialTriangle` if `index_count` is not a multiple of 3,
    /// `CapacityExceeded` if any buffer lacks a large enough free range.
    pub fn reserve(
        &self,
        chunk: ChunkCoord,
        vertex_count: u32,
        index_count: u32,
    ) -> AssemblerResult<Reservation<'_>> {
        self.reserve_with(chunk, vertex_count, index_count, Liveness::Any)
    }

    fn reserve_with(
        &self,
        chunk: ChunkCoord,
        vertex_count: u32,
        index_count: u32,
        liveness: Liveness,
    ) -> AssemblerResult<Reservation<'_>> {
        if index_count % 3 != 0 {
            return Err(AssemblerError::PartialTriangle { chunk, index_count });
        }
        let meshlets = meshlet_count(index_count, self.meshlet_max_indices);

        let mut ledger = self.ledger.lock();
        match liveness {
            Liveness::Absent if ledger.live.contains_key(&chunk) => {
                return Err(AssemblerError::ChunkAlreadyLive(chunk));
            }
            Liveness::Live if !ledger.live.contains_key(&chunk) => {
                return Err(AssemblerError::UnknownChunk(chunk));
            }
            _ => {}
        }
        if ledger.pending.contains_key(&chunk) {
            return Err(AssemblerError::ReservationPending(chunk));
        }

        let extent = ledger
            .allocate(vertex_count, index_count, meshlets)
            .map_err(|err| {
                warn!(chunk = ?chunk, %err, "geometry reservation failed");
                err
            })?;
        ledger.pending.insert(chunk, extent.clone());
        drop(ledger);

        debug!(
            chunk = ?chunk,
            vertices = ?extent.vertices,
            indices = ?extent.indices,
            meshlets = ?extent.meshlets,
            "reserved chunk geometry"
        );
        Ok(Reservation {
            assembler: self,
            chunk,
            extent,
            done: false,
        })
    }

    fn cancel(&self, chunk: ChunkCoord, extent: &ChunkExtent) {
        let mut ledger = self.ledger.lock();
        // A reservation that outlived `clear` owns nothing in the new ledger.
        if ledger.pending.get(&chunk) == Some(extent) {
            ledger.pending.remove(&chunk);
            ledger.free(extent.clone());
            debug!(chunk = ?chunk, "cancelled geometry reservation");
        }
    }

    /// Commits `reservation` with the given data. Same as `Reservation::commit`.
    ///
    /// # Errors
    ///
    /// See `Reservation::commit`.
    pub fn commit(
        &self,
        reservation: Reservation<'_>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> AssemblerResult<ReplacedChunk> {
        debug_assert!(std::ptr::eq(reservation.assembler, self));
        reservation.commit(vertices, indices)
    }

    /// Adds geometry for a chunk that is not live.
    ///
    /// # Errors
    ///
    /// `ChunkAlreadyLive` if the chunk is live, plus every error of `reserve`
    /// and `Reservation::commit`. On error nothing is written.
    pub fn append(
        &self,
        chunk: ChunkCoord,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> AssemblerResult<ChunkData> {
        let reservation = self.reserve_with(
            chunk,
            GeometryBuffer::Vertex.count(chunk, vertices.len())?,
            GeometryBuffer::Index.count(chunk, indices.len())?,
            Liveness::Absent,
        )?;
        Ok(reservation.commit(vertices, indices)?.current)
    }

    /// Adds a chunk mesh. Same as `append`.
    ///
    /// # Errors
    ///
    /// See `append`.
    pub fn append_mesh(&self, chunk: ChunkCoord, mesh: &ChunkMesh) -> AssemblerResult<ChunkData> {
        self.append(chunk, &mesh.vertices, &mesh.indices)
    }

    /// Swaps a live chunk's geometry for new data.
    ///
    /// The new ranges are reserved before the old ones are retired, so the
    /// old geometry stays intact until `release_retired`.
    ///
    /// # Errors
    ///
    /// `UnknownChunk` if the chunk is not live, plus every error of `reserve`
    /// and `Reservation::commit`. On error the old geometry stays live.
    pub fn replace(
        &self,
        chunk: ChunkCoord,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> AssemblerResult<ReplacedChunk> {
        let reservation = self.reserve_with(
            chunk,
            GeometryBuffer::Vertex.count(chunk, vertices.len())?,
            GeometryBuffer::Index.count(chunk, indices.len())?,
            Liveness::Live,
        )?;
        reservation.commit(vertices, indices)
    }

    /// Unpublishes a chunk and retires its ranges.
    ///
    /// # Errors
    ///
    /// `UnknownChunk` if the chunk is not live.
    pub fn remove(&self, chunk: ChunkCoord) -> AssemblerResult<ChunkData> {
        let mut ledger = self.ledger.lock();
        let extent = ledger
            .live
            .remove(&chunk)
            .ok_or(AssemblerError::UnknownChunk(chunk))?;
        let data = extent.chunk_data();
        ledger.retired.push(extent);
        debug!(chunk = ?chunk, ?data, "removed chunk geometry");
        Ok(data)
    }

    /// Frees every retired range. Call once the GPU no longer reads them.
    ///
    /// # Returns
    ///
    /// The number of retired chunk extents released.
    pub fn release_retired(&self) -> usize {
        let mut ledger = self.ledger.lock();
        let retired = std::mem::take(&mut ledger.retired);
        let count = retired.len();
        for extent in retired {
            ledger.free(extent);
        }
        if count > 0 {
            debug!(count, "released retired geometry");
        }
        count
    }

    /// Drops every chunk, retired range and buffer.
    ///
    /// Outstanding reservations are forgotten: dropping one afterwards frees
    /// nothing, and committing one publishes ranges the new allocators never
    /// handed out. Finish or drop every reservation before calling this.
    pub fn clear(&self) {
        {
            let mut ledger = self.ledger.lock();
            *ledger = Ledger::new(self.capacity);
        }
        *self.storage.write() = Storage::default();
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Record of a live chunk.
    #[must_use]
    pub fn chunk_data(&self, chunk: ChunkCoord) -> Option<ChunkData> {
        self.ledger.lock().live.get(&chunk).map(ChunkExtent::chunk_data)
    }

    /// Ranges of a live chunk.
    #[must_use]
    pub fn extent(&self, chunk: ChunkCoord) -> Option<ChunkExtent> {
        self.ledger.lock().live.get(&chunk).cloned()
    }

    /// True if the chunk has live geometry.
    #[must_use]
    pub fn contains(&self, chunk: ChunkCoord) -> bool {
        self.ledger.lock().live.contains_key(&chunk)
    }

    /// Number of live chunks.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.ledger.lock().live.len()
    }

    /// Number of retired extents awaiting `release_retired`.
    #[must_use]
    pub fn retired_count(&self) -> usize {
        self.ledger.lock().retired.len()
    }

    /// Every live chunk and its record, in coordinate order.
    #[must_use]
    pub fn live_chunks(&self) -> Vec<(ChunkCoord, ChunkData)> {
        let mut chunks: Vec<_> = self
            .ledger
            .lock()
            .live
            .iter()
            .map(|(&coord, extent)| (coord, extent.chunk_data()))
            .collect();
        chunks.sort_unstable_by_key(|&(coord, _)| coord);
        chunks
    }

    /// Live chunks as a multi-draw list.
    #[must_use]
    pub fn draw_list(&self) -> DrawList {
        let mut extents: Vec<_> = self
            .ledger
            .lock()
            .live
            .iter()
            .map(|(&coord, extent)| (coord, extent.clone()))
            .collect();
        extents.sort_unstable_by_key(|(coord, _)| *coord);

        let mut list = DrawList::default();
        for (slot, (coord, extent)) in extents.iter().enumerate() {
            list.chunks.push(*coord);
            list.records.push(extent.chunk_data());
            list.draws
                .push(DrawIndexedIndirectArgs::for_extent(extent, slot as u32));
        }
        list
    }

    /// Copy of a live chunk's vertices.
    #[must_use]
    pub fn chunk_vertices(&self, chunk: ChunkCoord) -> Option<Vec<Vertex>> {
        let extent = self.extent(chunk)?;
        Some(slice_of(&self.storage.read().vertices, &extent.vertices).to_vec())
    }

    /// Copy of a live chunk's chunk-local indices.
    #[must_use]
    pub fn chunk_indices(&self, chunk: ChunkCoord) -> Option<Vec<u32>> {
        let extent = self.extent(chunk)?;
        Some(slice_of(&self.storage.read().indices, &extent.indices).to_vec())
    }

    /// Copy of a live chunk's meshlets.
    #[must_use]
    pub fn chunk_meshlets(&self, chunk: ChunkCoord) -> Option<Vec<Meshlet>> {
        let extent = self.extent(chunk)?;
        Some(slice_of(&self.storage.read().meshlets, &extent.meshlets).to_vec())
    }

    /// Buffer watermarks and allocation totals.
    #[must_use]
    pub fn occupied(&self) -> GeometryUsage {
        self.ledger.lock().usage()
    }

    /// Read access to the shared arrays for upload.
    ///
    /// Commits block while the guard is held; reservations do not.
    #[must_use]
    pub fn buffers(&self) -> GeometryBuffers<'_> {
        let usage = self.occupied();
        GeometryBuffers {
            storage: self.storage.read(),
            usage,
        }
    }

    /// Checks every live record against the allocators and the buffers.
    ///
    /// Holds: ranges of live, pending and retired chunks never overlap and
    /// account for every allocated element; each chunk's meshlets tile its
    /// index range in order; every index is below the chunk's vertex count.
    ///
    /// # Errors
    ///
    /// `Inconsistent` naming the first offending chunk.
    pub fn validate(&self) -> AssemblerResult<()> {
        let (live, usage) = {
            let ledger = self.ledger.lock();
            let mut owners: Vec<(ChunkCoord, ChunkExtent)> = ledger
                .live
                .iter()
                .chain(ledger.pending.iter())
                .map(|(&c, e)| (c, e.clone()))
                .collect();
            owners.extend(ledger.retired.iter().map(|e| (ChunkCoord::default(), e.clone())));
            check_disjoint(&owners, |e| &e.vertices, ledger.vertices.allocated(), "vertex")?;
            check_disjoint(&owners, |e| &e.indices, ledger.indices.allocated(), "index")?;
            check_disjoint(&owners, |e| &e.meshlets, ledger.meshlets.allocated(), "meshlet")?;

            let live: Vec<_> = ledger.live.iter().map(|(&c, e)| (c, e.clone())).collect();
            (live, ledger.usage())
        };

        let storage = self.storage.read();
        let max = self.meshlet_max_indices;
        for (chunk, extent) in &live {
            let fail = |reason: String| AssemblerError::Inconsistent {
                chunk: *chunk,
                reason,
            };
            if extent.vertices.end > usage.vertices.watermark
                || extent.indices.end > usage.indices.watermark
                || extent.meshlets.end > usage.meshlets.watermark
            {
                return Err(fail("range past the buffer watermark".into()));
            }
            if extent.meshlet_count() != meshlet_count(extent.index_count(), max) {
                return Err(fail(format!(
                    "{} meshlets for {} indices",
                    extent.meshlet_count(),
                    extent.index_count()
                )));
            }

            let mut cursor = extent.indices.start;
            for meshlet in slice_of(&storage.meshlets, &extent.meshlets) {
                if meshlet.index_start != cursor
                    || meshlet.index_count == 0
                    || meshlet.index_count > max
                    || meshlet.index_count % 3 != 0
                {
                    return Err(fail(format!("meshlet {meshlet:?} breaks the tiling at {cursor}")));
                }
                cursor = meshlet.index_end();
            }
            if cursor != extent.indices.end {
                return Err(fail(format!(
                    "meshlets end at {cursor}, indices end at {}",
                    extent.indices.end
                )));
            }

            let vertex_count = extent.vertex_count();
            if let Some(index) = slice_of(&storage.indices, &extent.indices)
                .iter()
                .find(|&&i| i >= vertex_count)
            {
                return Err(fail(format!("index {index} >= vertex count {vertex_count}")));
            }
        }
        Ok(())
    }
}

impl Default for ChunkGeometryAssembler {
    fn default() -> Self {
        Self::new(GeometryCapacity::default(), MESHLET_MAX_INDICES)
    }
}

/// Read guard over the shared arrays.
///
/// Slices stop at each buffer's watermark as of the call to `buffers()`.
pub struct GeometryBuffers<'a> {
    storage: RwLockReadGuard<'a, Storage>,
    usage: GeometryUsage,
}

impl GeometryBuffers<'_> {
    /// Occupancy when the guard was taken.
    #[must_use]
    pub const fn usage(&self) -> &GeometryUsage {
        &self.usage
    }

    /// Vertex array.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        prefix(&self.storage.vertices, self.usage.vertices.watermark)
    }

    /// Index array (chunk-local indices).
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        prefix(&self.storage.indices, self.usage.indices.watermark)
    }

    /// Meshlet array.
    #[must_use]
    pub fn meshlets(&self) -> &[Meshlet] {
        prefix(&self.storage.meshlets, self.usage.meshlets.watermark)
    }

    /// Vertex array as bytes.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices())
    }

    /// Index array as bytes.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.indices())
    }

    /// Meshlet array as bytes.
    #[must_use]
    pub fn meshlet_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.meshlets())
    }
}

impl std::fmt::Debug for GeometryBuffers<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryBuffers")
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prefix<T>(data: &[T], watermark: u32) -> &[T] {
    &data[..data.len().min(watermark as usize)]
}

fn slice_of<'s, T>(data: &'s [T], range: &Range<u32>) -> &'s [T] {
    let end = (range.end as usize).min(data.len());
    let start = (range.start as usize).min(end);
    &data[start..end]
}

fn check_disjoint(
    owners: &[(ChunkCoord, ChunkExtent)],
    range: impl Fn(&ChunkExtent) -> &Range<u32>,
    allocated: u32,
    buffer: &str,
) -> AssemblerResult<()> {
    let mut ranges: Vec<(ChunkCoord, Range<u32>)> = owners
        .iter()
        .map(|(c, e)| (*c, range(e).clone()))
        .filter(|(_, r)| !r.is_empty())
        .collect();
    ranges.sort_unstable_by_key(|(_, r)| r.start);

    for pair in ranges.windows(2) {
        if pair[0].1.end > pair[1].1.start {
            return Err(AssemblerError::Inconsistent {
                chunk: pair[1].0,
                reason: format!(
                    "{buffer} range {:?} overlaps {:?} of {:?}",
                    pair[1].1, pair[0].1, pair[0].0
                ),
            });
        }
    }

    let total: u32 = ranges.iter().map(|(_, r)| r.end - r.start).sum();
    if total != allocated {
        let chunk = ranges.first().map_or_else(ChunkCoord::default, |(c, _)| *c);
        return Err(AssemblerError::Inconsistent {
            chunk,
            reason: format!("{buffer} ranges cover {total} elements, allocator holds {allocated}"),
        });
    }
    Ok(())
}
