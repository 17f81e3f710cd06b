//! Icosphere wireframe geometry.
//!
//! The stage mesh is a subdivided icosahedron rendered as a line list of its
//! unique triangle edges. Generation is deterministic: midpoint lookups and
//! edge extraction use ordered maps, so the same subdivision level always
//! produces identical buffers.

use std::collections::{BTreeMap, BTreeSet};

use foundation::math::vec::Vec3;

/// Unit icosphere: vertices on the sphere plus the dedup'd edge list.
#[derive(Debug, Clone)]
pub struct Icosphere {
    pub vertices: Vec<[f32; 3]>,
    pub edges: Vec<[u32; 2]>,
}

impl Icosphere {
    /// Subdivide the base icosahedron `subdivisions` times (each level
    /// splits every triangle into four) and project onto the unit sphere.
    ///
    /// Counts follow the closed forms `V = 10 * 4^n + 2`, `E = 30 * 4^n`,
    /// `F = 20 * 4^n`.
    pub fn generate(subdivisions: u32) -> Self {
        let (mut vertices, mut faces) = base_icosahedron();

        for _ in 0..subdivisions {
            let mut midpoints: BTreeMap<(u32, u32), u32> = BTreeMap::new();
            let mut next = Vec::with_capacity(faces.len() * 4);
            for [a, b, c] in faces {
                let ab = midpoint(&mut vertices, &mut midpoints, a, b);
                let bc = midpoint(&mut vertices, &mut midpoints, b, c);
                let ca = midpoint(&mut vertices, &mut midpoints, c, a);
                next.push([a, ab, ca]);
                next.push([b, bc, ab]);
                next.push([c, ca, bc]);
                next.push([ab, bc, ca]);
            }
            faces = next;
        }

        let mut edge_set: BTreeSet<(u32, u32)> = BTreeSet::new();
        for [a, b, c] in &faces {
            edge_set.insert(ordered(*a, *b));
            edge_set.insert(ordered(*b, *c));
            edge_set.insert(ordered(*c, *a));
        }

        Self {
            vertices: vertices
                .iter()
                .map(|v| [v.x as f32, v.y as f32, v.z as f32])
                .collect(),
            edges: edge_set.into_iter().map(|(a, b)| [a, b]).collect(),
        }
    }

    /// Edge endpoints flattened into a line-list index buffer.
    pub fn line_indices(&self) -> Vec<u32> {
        let mut indices = Vec::with_capacity(self.edges.len() * 2);
        for [a, b] in &self.edges {
            indices.push(*a);
            indices.push(*b);
        }
        indices
    }
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

fn midpoint(
    vertices: &mut Vec<Vec3>,
    cache: &mut BTreeMap<(u32, u32), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let key = ordered(a, b);
    if let Some(&idx) = cache.get(&key) {
        return idx;
    }
    let m = ((vertices[a as usize] + vertices[b as usize]) * 0.5).normalized();
    let idx = vertices.len() as u32;
    vertices.push(m);
    cache.insert(key, idx);
    idx
}

/// The 12 vertices and 20 faces of a regular icosahedron on the unit sphere.
fn base_icosahedron() -> (Vec<Vec3>, Vec<[u32; 3]>) {
    // Golden-ratio rectangle construction.
    let t = (1.0 + 5f64.sqrt()) / 2.0;

    let raw = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ];
    let vertices = raw
        .iter()
        .map(|&(x, y, z)| Vec3::new(x, y, z).normalized())
        .collect();

    let faces = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    (vertices, faces)
}
