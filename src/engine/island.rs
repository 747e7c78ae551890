// Procedural floating island: a noisy grass disc on top of a rock cone.
//
// Layout (local space, Y up, island center on the axis):
//   - top:       center vertex + `rings` concentric rings at y = surface_height
//   - side band: rim ring down to a lip ring at y = 0
//   - underside: `rings - 1` tapering rings, then a single tip at y = -thickness
//
// The PolyMesh is closed: every edge borders exactly two faces.

use std::f32::consts::TAU;
use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use super::jitter::jitter;
use super::mesh::{PolyMesh, RenderMesh, triangulate_flat_by};
use super::noise_map::NoiseMap;

pub const ROCK_COLOR: [f32; 3] = [0.42, 0.36, 0.32];

/// Dimensions of a floating island.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandShape {
    /// Radius of the top disc (world units)
    pub radius: f32,
    /// Height of the top surface above the lip
    pub surface_height: f32,
    /// Depth of the underside tip below the lip
    pub thickness: f32,
    /// How much the underside narrows (0.0 = column, 1.0 = cone to a point)
    pub taper: f32,
    /// Concentric rings on the top disc; also the number of underside levels
    pub rings: usize,
    /// Sectors around the axis
    pub segments: usize,
}

impl Default for IslandShape {
    fn default() -> Self {
        Self {
            radius: 6.0,
            surface_height: 0.8,
            thickness: 7.0,
            taper: 0.85,
            rings: 4,
            segments: 14,
        }
    }
}

impl IslandShape {
    /// Faces `build_island` emits for the top disc. They come first in the face list.
    pub fn top_face_count(&self) -> usize {
        self.rings.max(1) * self.segments.max(3)
    }
}

fn ring(mesh: &mut PolyMesh, radius: f32, y: f32, segments: usize) -> Vec<usize> {
    (0..segments)
        .map(|j| {
            let theta = TAU * j as f32 / segments as f32;
            mesh.add_vertex(Vec3::new(theta.cos() * radius, y, theta.sin() * radius))
        })
        .collect()
}

/// Quads between two rings, `upper` nearer the top/center. CCW seen from outside.
fn stitch(mesh: &mut PolyMesh, upper: &[usize], lower: &[usize]) {
    let n = upper.len();
    for j in 0..n {
        let k = (j + 1) % n;
        mesh.add_face(vec![upper[j], upper[k], lower[k], lower[j]]);
    }
}

/// Triangle fan from a ring to a single apex vertex.
fn fan(mesh: &mut PolyMesh, apex: usize, ring: &[usize], apex_first: bool) {
    let n = ring.len();
    for j in 0..n {
        let k = (j + 1) % n;
        if apex_first {
            mesh.add_face(vec![apex, ring[k], ring[j]]);
        } else {
            mesh.add_face(vec![ring[j], ring[k], apex]);
        }
    }
}

/// Build the closed island PolyMesh in local space.
pub fn build_island(shape: &IslandShape) -> PolyMesh {
    let rings = shape.rings.max(1);
    let segments = shape.segments.max(3);
    let mut mesh = PolyMesh::new();

    // Top disc
    let center = mesh.add_vertex(Vec3::new(0.0, shape.surface_height, 0.0));
    let mut prev = ring(&mut mesh, shape.radius / rings as f32, shape.surface_height, segments);
    fan(&mut mesh, center, &prev, true);
    for r in 2..=rings {
        let next = ring(&mut mesh, shape.radius * r as f32 / rings as f32, shape.surface_height, segments);
        stitch(&mut mesh, &prev, &next);
        prev = next;
    }

    // Side band down to the lip
    let lip = ring(&mut mesh, shape.radius, 0.0, segments);
    stitch(&mut mesh, &prev, &lip);
    prev = lip;

    // Underside
    for level in 1..rings {
        let t = level as f32 / rings as f32;
        let radius = shape.radius * (1.0 - shape.taper.clamp(0.0, 1.0) * t).max(0.05);
        let next = ring(&mut mesh, radius, -shape.thickness * t, segments);
        stitch(&mut mesh, &prev, &next);
        prev = next;
    }
    let tip = mesh.add_vertex(Vec3::new(0.0, -shape.thickness, 0.0));
    fan(&mut mesh, tip, &prev, false);

    mesh
}

/// Turns island shapes into jittered, flat-shaded render meshes.
#[derive(Debug, Clone, Default)]
pub struct IslandBuilder {
    pub shape: IslandShape,
    pub noise: NoiseMap,
    pub jitter_magnitude: f32,
}

impl IslandBuilder {
    /// Build an island centred on `center` with a `grass` top and rock underside.
    pub fn build<R: Rng>(&self, center: Vec3, grass: [f32; 3], rng: &mut R) -> RenderMesh {
        let mut poly = build_island(&self.shape);
        for p in &mut poly.positions {
            *p += center;
        }

        // Hills on the top surface only, fading out toward the rim so it meets the side band.
        let top_y = center.y + self.shape.surface_height;
        let radius = self.shape.radius;
        self.noise.displace_vertical(&mut poly, |p| {
            if (p.y - top_y).abs() > 1e-4 {
                return 0.0;
            }
            let d = Vec2::new(p.x - center.x, p.z - center.z).length() / radius;
            (1.0 - d * d).max(0.0)
        });

        let top_faces = self.shape.top_face_count();
        let mut mesh = triangulate_flat_by(&poly, |fi| if fi < top_faces { grass } else { ROCK_COLOR });
        jitter(&mut mesh, self.jitter_magnitude, rng);
        mesh.recompute_flat_normals();

        log::debug!(
            "built island at {center:?}: {} triangles",
            mesh.index_count() / 3
        );
        mesh
    }
}
