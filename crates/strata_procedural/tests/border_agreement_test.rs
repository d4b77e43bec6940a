//! # Border Agreement Tests
//!
//! A chunk's positive border must hold exactly what its neighbour stores in
//! its first layer, and regenerating a chunk must reproduce it bit for bit.

use strata_core::{Axis, VoxelField};
use strata_procedural::{generate_chunk, NoiseTerrain, Seed};
use strata_shared::ChunkCoord;

const DIMS: [u32; 3] = [16, 16, 16];

fn terrain() -> NoiseTerrain {
    NoiseTerrain::with_seed(Seed::new(2024))
}

#[test]
fn test_border_matches_neighbour_on_every_axis() {
    let terrain = terrain();
    let coord = ChunkCoord::new(-1, 0, 2);
    let field = generate_chunk(coord, DIMS, &terrain);

    for axis in Axis::ALL {
        let mut step = [0i32; 3];
        step[axis.index()] = 1;
        let neighbour = generate_chunk(coord.offset(step[0], step[1], step[2]), DIMS, &terrain);

        // Patching the border from the neighbour must be a no-op.
        let mut patched = field.clone();
        patched.copy_border_from(axis, &neighbour);
        assert_eq!(
            patched.as_bytes(),
            field.as_bytes(),
            "border along {axis:?} disagrees with neighbour"
        );
    }
}

#[test]
fn test_regeneration_is_bit_identical() {
    let terrain = terrain();
    let coord = ChunkCoord::new(3, 1, -4);
    let a = generate_chunk(coord, DIMS, &terrain);
    let b = generate_chunk(coord, DIMS, &terrain);
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn test_terrain_produces_a_surface_near_ground_level() {
    let terrain = terrain();
    let mut mixed = 0;
    for cx in -2..2 {
        for cz in -2..2 {
            let field: VoxelField = generate_chunk(ChunkCoord::new(cx, 0, cz), DIMS, &terrain);
            let solid = field.solid_count(0.0);
            if solid > 0 && solid < field.len() {
                mixed += 1;
            }
        }
    }
    assert!(mixed > 0, "ground-level chunks should contain a surface");
}
