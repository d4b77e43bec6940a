//! Error types for geometry assembly.

use std::fmt;

use strata_shared::ChunkCoord;
use thiserror::Error;

/// One of the three shared buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryBuffer {
    /// Vertex buffer.
    Vertex,
    /// Index buffer.
    Index,
    /// Meshlet buffer.
    Meshlet,
}

impl fmt::Display for GeometryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Index => "index",
            Self::Meshlet => "meshlet",
        })
    }
}

impl GeometryBuffer {
    /// Converts a slice length to an element count for this buffer.
    pub(crate) fn count(self, chunk: ChunkCoord, len: usize) -> AssemblerResult<u32> {
        u32::try_from(len).map_err(|_| AssemblerError::InputTooLarge {
            chunk,
            buffer: self,
            len,
        })
    }
}

/// Errors from the chunk geometry assembler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblerError {
    /// No contiguous range large enough. Nothing was reserved or written.
    #[error("{buffer} buffer full: requested {requested}, largest free range {available}")]
    CapacityExceeded {
        /// The buffer that ran out.
        buffer: GeometryBuffer,
        /// Elements requested.
        requested: u32,
        /// Largest contiguous free range at the time of the request.
        available: u32,
    },

    /// Input data has more elements than any buffer can address.
    #[error("{buffer} data for chunk {chunk:?} has {len} elements, more than a u32 can address")]
    InputTooLarge {
        /// The chunk being reserved.
        chunk: ChunkCoord,
        /// The buffer the data was meant for.
        buffer: GeometryBuffer,
        /// Elements supplied.
        len: usize,
    },

    /// The chunk has no live geometry.
    #[error("chunk {0:?} is not live")]
    UnknownChunk(ChunkCoord),

    /// The chunk already has live geometry; use `replace`.
    #[error("chunk {0:?} is already live")]
    ChunkAlreadyLive(ChunkCoord),

    /// Another reservation for the chunk has not been committed yet.
    #[error("chunk {0:?} has an uncommitted reservation")]
    ReservationPending(ChunkCoord),

    /// Committed data does not match the reserved sizes. The reservation was cancelled.
    #[error("{buffer} data for chunk {chunk:?} has {actual} elements, reserved {reserved}")]
    ReservationMismatch {
        /// The chunk being committed.
        chunk: ChunkCoord,
        /// The buffer whose data did not fit.
        buffer: GeometryBuffer,
        /// Elements reserved.
        reserved: u32,
        /// Elements supplied.
        actual: usize,
    },

    /// The index count is not a whole number of triangles.
    #[error("chunk {chunk:?} has {index_count} indices, not a multiple of 3")]
    PartialTriangle {
        /// The chunk being reserved.
        chunk: ChunkCoord,
        /// Indices requested.
        index_count: u32,
    },

    /// An index refers past the chunk's vertex range.
    #[error("chunk {chunk:?} index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The chunk being committed.
        chunk: ChunkCoord,
        /// The offending chunk-local index.
        index: u32,
        /// Vertices in the chunk.
        vertex_count: u32,
    },

    /// `validate` found records that disagree with the buffers.
    #[error("inconsistent geometry for chunk {chunk:?}: {reason}")]
    Inconsistent {
        /// The chunk whose record is wrong.
        chunk: ChunkCoord,
        /// What was wrong.
        reason: String,
    },
}

/// Result type for assembler operations.
pub type AssemblerResult<T> = Result<T, AssemblerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_in_range() {
        let chunk = ChunkCoord::new(0, 0, 0);
        assert_eq!(GeometryBuffer::Vertex.count(chunk, 0), Ok(0));
        assert_eq!(GeometryBuffer::Index.count(chunk, 384), Ok(384));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_count_reports_the_real_length() {
        let chunk = ChunkCoord::new(1, 2, 3);
        let len = u32::MAX as usize + 7;
        let err = GeometryBuffer::Index.count(chunk, len).unwrap_err();
        assert_eq!(
            err,
            AssemblerError::InputTooLarge {
                chunk,
                buffer: GeometryBuffer::Index,
                len,
            }
        );
        assert!(err.to_string().contains(&len.to_string()));
    }
}
