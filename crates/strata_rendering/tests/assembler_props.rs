//! # Assembler Properties
//!
//! Random append/replace/remove/release sequences must keep every live
//! chunk's record stable and its geometry readable, and must never leave
//! overlapping or leaked ranges behind.

use std::collections::BTreeMap;

use proptest::prelude::*;
use strata_rendering::geometry::{
    AssemblerError, ChunkData, ChunkGeometryAssembler, GeometryCapacity,
};
use strata_rendering::Vertex;
use strata_shared::{ChunkCoord, Vec3};

const MESHLET_MAX_INDICES: u32 = 9;

#[derive(Debug, Clone)]
enum Op {
    Append(i32, u32),
    Replace(i32, u32),
    Remove(i32),
    Release,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0i32..6, 0u32..24).prop_map(|(c, t)| Op::Append(c, t)),
        3 => (0i32..6, 0u32..24).prop_map(|(c, t)| Op::Replace(c, t)),
        2 => (0i32..6).prop_map(Op::Remove),
        1 => Just(Op::Release),
    ]
}

/// Geometry that remembers which chunk and generation wrote it.
fn geometry(chunk: i32, generation: u32, triangles: u32) -> (Vec<Vertex>, Vec<u32>) {
    let count = triangles * 3;
    let vertices = (0..count)
        .map(|i| Vertex::new(Vec3::new(chunk as f32, generation as f32, i as f32), Vec3::Y))
        .collect();
    let indices = (0..count).rev().collect();
    (vertices, indices)
}

struct Model {
    live: BTreeMap<ChunkCoord, (ChunkData, Vec<Vertex>, Vec<u32>)>,
    generation: u32,
}

impl Model {
    fn check(&self, assembler: &ChunkGeometryAssembler) -> Result<(), TestCaseError> {
        prop_assert!(assembler.validate().is_ok(), "{:?}", assembler.validate());
        prop_assert_eq!(assembler.live_count(), self.live.len());
        for (&coord, (data, vertices, indices)) in &self.live {
            prop_assert_eq!(assembler.chunk_data(coord), Some(*data));
            let stored_vertices = assembler.chunk_vertices(coord);
            let stored_indices = assembler.chunk_indices(coord);
            prop_assert_eq!(stored_vertices.as_ref(), Some(vertices));
            prop_assert_eq!(stored_indices.as_ref(), Some(indices));
        }
        Ok(())
    }
}

proptest! {
    #[test]
    fn records_only_change_when_their_chunk_does(ops in prop::collection::vec(op(), 1..120)) {
        let assembler =
            ChunkGeometryAssembler::new(GeometryCapacity::new(256, 256, 40), MESHLET_MAX_INDICES);
        let mut model = Model { live: BTreeMap::new(), generation: 0 };

        for op in ops {
            model.generation += 1;
            match op {
                Op::Append(c, triangles) => {
                    let coord = ChunkCoord::new(c, 0, 0);
                    let (vertices, indices) = geometry(c, model.generation, triangles);
                    match assembler.append(coord, &vertices, &indices) {
                        Ok(data) => {
                            prop_assert!(!model.live.contains_key(&coord));
                            model.live.insert(coord, (data, vertices, indices));
                        }
                        Err(AssemblerError::ChunkAlreadyLive(_)) => {
                            prop_assert!(model.live.contains_key(&coord));
                        }
                        Err(AssemblerError::CapacityExceeded { .. }) => {}
                        Err(other) => prop_assert!(false, "unexpected {other}"),
                    }
                }
                Op::Replace(c, triangles) => {
                    let coord = ChunkCoord::new(c, 0, 0);
                    let (vertices, indices) = geometry(c, model.generation, triangles);
                    match assembler.replace(coord, &vertices, &indices) {
                        Ok(replaced) => {
                            let old = model.live.insert(coord, (replaced.current, vertices, indices));
                            prop_assert_eq!(old.map(|(data, _, _)| data), replaced.previous);
                        }
                        Err(AssemblerError::UnknownChunk(_)) => {
                            prop_assert!(!model.live.contains_key(&coord));
                        }
                        Err(AssemblerError::CapacityExceeded { .. }) => {}
                        Err(other) => prop_assert!(false, "unexpected {other}"),
                    }
                }
                Op::Remove(c) => {
                    let coord = ChunkCoord::new(c, 0, 0);
                    match assembler.remove(coord) {
                        Ok(data) => {
                            let old = model.live.remove(&coord);
                            prop_assert_eq!(old.map(|(data, _, _)| data), Some(data));
                        }
                        Err(AssemblerError::UnknownChunk(_)) => {
                            prop_assert!(!model.live.contains_key(&coord));
                        }
                        Err(other) => prop_assert!(false, "unexpected {other}"),
                    }
                }
                Op::Release => {
                    assembler.release_retired();
                    prop_assert_eq!(assembler.retired_count(), 0);
                }
            }
            model.check(&assembler)?;
        }

        // With nothing retired, the allocators hold exactly the live geometry.
        assembler.release_retired();
        let usage = assembler.occupied();
        let live_vertices: u32 = model.live.values().map(|(_, v, _)| v.len() as u32).sum();
        prop_assert_eq!(usage.vertices.allocated, live_vertices);
    }

    #[test]
    fn meshlets_tile_every_chunk(triangles in prop::collection::vec(0u32..40, 1..12)) {
        let assembler =
            ChunkGeometryAssembler::new(GeometryCapacity::new(4096, 4096, 512), MESHLET_MAX_INDICES);
        for (i, &t) in triangles.iter().enumerate() {
            let (vertices, indices) = geometry(i as i32, 0, t);
            assembler.append(ChunkCoord::new(i as i32, 0, 0), &vertices, &indices).unwrap();
        }

        for (coord, data) in assembler.live_chunks() {
            let meshlets = assembler.chunk_meshlets(coord).unwrap();
            let index_count = assembler.chunk_indices(coord).unwrap().len() as u32;
            prop_assert_eq!(meshlets.len() as u32, data.meshlet_count);

            let mut cursor = data.index_offset;
            for meshlet in &meshlets {
                prop_assert_eq!(meshlet.index_start, cursor);
                prop_assert!(meshlet.index_count > 0);
                prop_assert!(meshlet.index_count <= MESHLET_MAX_INDICES);
                prop_assert_eq!(meshlet.index_count % 3, 0);
                cursor = meshlet.index_end();
            }
            prop_assert_eq!(cursor - data.index_offset, index_count);
        }
    }
}
