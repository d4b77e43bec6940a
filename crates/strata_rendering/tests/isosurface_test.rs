//! # Isosurface Tests
//!
//! Whole-field properties of Marching Cubes output: closed surfaces,
//! outward winding, seamless chunk borders and exact interpolation.

use std::collections::{HashMap, HashSet};

use strata_core::VoxelField;
use strata_procedural::{generate_chunk, NoiseTerrain, PlaneDensity, Seed, SphereDensity};
use strata_rendering::isosurface::{meshify, ChunkMesh, ExtractorOptions, IsosurfaceExtractor};
use strata_shared::ChunkCoord;

fn sphere_field(chunk_voxels: [u32; 3], center: [f32; 3], radius: f32) -> VoxelField {
    VoxelField::from_fn(chunk_voxels, |x, y, z| {
        let dx = x as f32 - center[0];
        let dy = y as f32 - center[1];
        let dz = z as f32 - center[2];
        radius - (dx * dx + dy * dy + dz * dz).sqrt()
    })
}

fn position_key(mesh: &ChunkMesh, index: u32) -> [u32; 3] {
    let p = mesh.vertices[index as usize].position;
    [p[0].to_bits(), p[1].to_bits(), p[2].to_bits()]
}

/// Welds vertices by exact position and returns the triangles as id triples.
fn welded_triangles(mesh: &ChunkMesh) -> Vec<[usize; 3]> {
    let mut ids: HashMap<[u32; 3], usize> = HashMap::new();
    mesh.indices
        .chunks_exact(3)
        .map(|tri| {
            let mut out = [0usize; 3];
            for (slot, &index) in out.iter_mut().zip(tri) {
                let next = ids.len();
                *slot = *ids.entry(position_key(mesh, index)).or_insert(next);
            }
            out
        })
        .collect()
}

#[test]
fn test_sphere_is_closed_and_consistently_wound() {
    let mesh = meshify(&sphere_field([16, 16, 16], [8.4, 7.6, 8.2], 5.3), 0.0);
    assert!(mesh.triangle_count() > 100);

    let mut directed: HashMap<(usize, usize), u32> = HashMap::new();
    for [a, b, c] in welded_triangles(&mesh) {
        assert!(a != b && b != c && c != a, "degenerate triangle");
        for edge in [(a, b), (b, c), (c, a)] {
            *directed.entry(edge).or_default() += 1;
        }
    }

    for (&(a, b), &count) in &directed {
        assert_eq!(count, 1, "edge {a}->{b} used {count} times");
        assert_eq!(
            directed.get(&(b, a)),
            Some(&1),
            "edge {a}->{b} has no opposite"
        );
    }
}

#[test]
fn test_sphere_winding_faces_outward() {
    let mesh = meshify(&sphere_field([16, 16, 16], [8.4, 7.6, 8.2], 5.3), 0.0);

    // Divergence theorem: outward winding gives a positive enclosed volume.
    let volume: f64 = mesh
        .indices
        .chunks_exact(3)
        .map(|tri| {
            let p = |i: u32| {
                let v = mesh.vertices[i as usize].position;
                [f64::from(v[0]), f64::from(v[1]), f64::from(v[2])]
            };
            let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
            let cross = [
                b[1] * c[2] - b[2] * c[1],
                b[2] * c[0] - b[0] * c[2],
                b[0] * c[1] - b[1] * c[0],
            ];
            (a[0] * cross[0] + a[1] * cross[1] + a[2] * cross[2]) / 6.0
        })
        .sum();

    let expected = 4.0 / 3.0 * std::f64::consts::PI * 5.3f64.powi(3);
    assert!(volume > 0.0, "surface is wound inward");
    assert!(
        (volume - expected).abs() / expected < 0.1,
        "volume {volume} far from {expected}"
    );
}

#[test]
fn test_uniform_fields_are_empty() {
    for density in [-1.0, 0.0, 1.0] {
        let mesh = meshify(&VoxelField::filled([8, 8, 8], density), 0.0);
        assert!(mesh.is_empty(), "uniform {density} produced geometry");
        assert_eq!(mesh.skipped_cubes, 0);
    }
}

#[test]
fn test_plane_vertices_sit_on_the_plane() {
    let field = generate_chunk(ChunkCoord::new(0, 0, 0), [8, 8, 8], &PlaneDensity::new(3.25));
    let mesh = meshify(&field, 0.0);

    // 8 x 8 cubes cut by the plane, two triangles each.
    assert_eq!(mesh.triangle_count(), 128);
    for vertex in &mesh.vertices {
        assert_eq!(vertex.position[1], 3.25);
        assert_eq!(vertex.normal, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(vertex.position[3], 1.0);
    }
}

#[test]
fn test_identical_fields_give_identical_bytes() {
    let terrain = NoiseTerrain::with_seed(Seed::new(7));
    let coord = ChunkCoord::new(1, 0, -2);
    let options = ExtractorOptions::for_chunk(coord, [16, 16, 16]);
    let extractor = IsosurfaceExtractor::new(options);

    let a = extractor.meshify(&generate_chunk(coord, [16, 16, 16], &terrain));
    let b = extractor.meshify(&generate_chunk(coord, [16, 16, 16], &terrain));
    assert_eq!(a.vertex_bytes(), b.vertex_bytes());
    assert_eq!(a.index_bytes(), b.index_bytes());

    let mut reused = ChunkMesh::default();
    extractor.meshify_into(&generate_chunk(ChunkCoord::new(0, 0, 0), [16, 16, 16], &terrain), &mut reused);
    extractor.meshify_into(&generate_chunk(coord, [16, 16, 16], &terrain), &mut reused);
    assert_eq!(reused, a);
}

#[test]
fn test_neighbouring_chunks_share_face_vertices() {
    const DIMS: [u32; 3] = [8, 8, 8];
    let sphere = SphereDensity::new([8.3, 4.2, 4.4], 3.1);

    let left_coord = ChunkCoord::new(0, 0, 0);
    let right_coord = ChunkCoord::new(1, 0, 0);
    let left = IsosurfaceExtractor::new(ExtractorOptions::for_chunk(left_coord, DIMS))
        .meshify(&generate_chunk(left_coord, DIMS, &sphere));
    let right = IsosurfaceExtractor::new(ExtractorOptions::for_chunk(right_coord, DIMS))
        .meshify(&generate_chunk(right_coord, DIMS, &sphere));

    let on_face = |mesh: &ChunkMesh| -> HashSet<[u32; 3]> {
        mesh.vertices
            .iter()
            .filter(|v| v.position[0] == 8.0)
            .map(|v| [v.position[0].to_bits(), v.position[1].to_bits(), v.position[2].to_bits()])
            .collect()
    };

    let left_face = on_face(&left);
    assert!(!left_face.is_empty(), "sphere should cross the shared face");
    assert_eq!(left_face, on_face(&right));
}

#[test]
fn test_non_finite_corners_skip_cubes() {
    let mut field = sphere_field([8, 8, 8], [4.1, 4.2, 3.9], 2.7);
    field.set(4, 4, 4, f32::NAN);
    let mesh = meshify(&field, 0.0);

    // Every cube touching the poisoned sample is skipped.
    assert_eq!(mesh.skipped_cubes, 8);
    assert!(mesh.vertices.iter().all(|v| v.position3().is_finite()));
    assert!(mesh.vertices.iter().all(|v| v.normal3().is_finite()));
}
