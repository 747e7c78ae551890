// Procedural mesh types, the vertex-position buffer abstraction, and triangulation.
//
// Pipeline for a floating island:
//   build_island() → PolyMesh → NoiseMap::displace_vertical() → triangulate_flat() → RenderMesh
//   → jitter() → recompute_flat_normals() → GPU

use glam::Vec3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("coordinate array length {0} is not a multiple of 3")]
    MalformedPositions(usize),
}

// ============================================================================
// POSITION BUFFER
// ============================================================================

/// Mutable per-vertex position access, as a renderer's geometry buffer exposes it.
///
/// `mark_positions_dirty` tells the owner that anything derived from the
/// positions (normals, bounds, GPU copies) must be rebuilt before use.
pub trait PositionBuffer {
    fn len(&self) -> usize;
    fn position(&self, index: usize) -> Vec3;
    fn set_position(&mut self, index: usize, position: Vec3);
    fn mark_positions_dirty(&mut self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flat xyz coordinate array, the layout most loaders and web renderers hand out.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatPositions {
    coords: Vec<f32>,
    needs_update: bool,
}

impl FlatPositions {
    /// Fails if `coords` does not hold whole xyz triples.
    pub fn new(coords: Vec<f32>) -> Result<Self, MeshError> {
        if coords.len() % 3 != 0 {
            return Err(MeshError::MalformedPositions(coords.len()));
        }
        Ok(Self { coords, needs_update: false })
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        Self {
            coords: points.iter().flat_map(|p| p.to_array()).collect(),
            needs_update: false,
        }
    }

    pub fn coords(&self) -> &[f32] { &self.coords }
    pub fn needs_update(&self) -> bool { self.needs_update }

    /// Clear the dirty flag once the consumer has re-uploaded the data.
    pub fn acknowledge_update(&mut self) {
        self.needs_update = false;
    }
}

impl PositionBuffer for FlatPositions {
    fn len(&self) -> usize { self.coords.len() / 3 }

    fn position(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.coords[index * 3..index * 3 + 3])
    }

    fn set_position(&mut self, index: usize, position: Vec3) {
        position.write_to_slice(&mut self.coords[index * 3..index * 3 + 3]);
    }

    fn mark_positions_dirty(&mut self) {
        self.needs_update = true;
    }
}

// ============================================================================
// GPU VERTEX
// ============================================================================

/// GPU-ready vertex:
///   @location(0) position: vec3<f32>
///   @location(1) normal:   vec3<f32>
///   @location(2) color:    vec3<f32>
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal:   [f32; 3],
    pub color:    [f32; 3],
}

impl GpuVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

// ============================================================================
// POLY MESH
// ============================================================================

/// Intermediate polygon mesh for procedural manipulation.
/// Supports n-gon faces (arbitrary vertex count per face).
/// Faces use CCW winding when viewed from outside (consistent with back-face culling).
/// Not GPU-ready; triangulate into a `RenderMesh` to draw it.
#[derive(Debug, Clone, Default)]
pub struct PolyMesh {
    pub positions: Vec<Vec3>,
    pub faces:     Vec<Vec<usize>>,  // each face = CCW-ordered vertex index list
}

impl PolyMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, pos: Vec3) -> usize {
        let idx = self.positions.len();
        self.positions.push(pos);
        idx
    }

    /// Add a face by vertex indices (CCW order).
    pub fn add_face(&mut self, indices: Vec<usize>) {
        debug_assert!(indices.len() >= 3, "Face must have at least 3 vertices");
        self.faces.push(indices);
    }

    pub fn vertex_count(&self) -> usize { self.positions.len() }
    pub fn face_count(&self) -> usize { self.faces.len() }
}

impl PositionBuffer for PolyMesh {
    fn len(&self) -> usize { self.positions.len() }
    fn position(&self, index: usize) -> Vec3 { self.positions[index] }
    fn set_position(&mut self, index: usize, position: Vec3) { self.positions[index] = position; }
    // Nothing is derived from a PolyMesh until it is triangulated.
    fn mark_positions_dirty(&mut self) {}
}

// ============================================================================
// RENDER MESH
// ============================================================================

/// GPU-ready triangle list.
/// Upload vertex_bytes() to a VERTEX buffer, index_bytes() to an INDEX buffer.
#[derive(Debug, Clone, Default)]
pub struct RenderMesh {
    pub vertices: Vec<GpuVertex>,
    pub indices:  Vec<u32>,
    normals_stale: bool,
}

impl RenderMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cast vertex slice to raw bytes for wgpu buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Cast index slice to raw bytes for wgpu buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn index_count(&self) -> usize { self.indices.len() }
    pub fn vertex_count(&self) -> usize { self.vertices.len() }
    pub fn normals_stale(&self) -> bool { self.normals_stale }

    /// Append another mesh, rebasing its indices onto this one.
    pub fn append(&mut self, other: &RenderMesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
        self.normals_stale |= other.normals_stale;
    }

    /// Recompute one face normal per triangle and write it to all three corners.
    ///
    /// Only valid for an unshared triangle soup (see `triangulate_flat`); a
    /// vertex shared between triangles would end up with whichever face wrote last.
    pub fn recompute_flat_normals(&mut self) {
        for tri in self.indices.chunks_exact(3) {
            let a = Vec3::from(self.vertices[tri[0] as usize].position);
            let b = Vec3::from(self.vertices[tri[1] as usize].position);
            let c = Vec3::from(self.vertices[tri[2] as usize].position);
            let normal = (b - a).cross(c - a).normalize_or_zero().to_array();
            for &i in tri {
                self.vertices[i as usize].normal = normal;
            }
        }
        self.normals_stale = false;
    }
}

impl PositionBuffer for RenderMesh {
    fn len(&self) -> usize { self.vertices.len() }
    fn position(&self, index: usize) -> Vec3 { Vec3::from(self.vertices[index].position) }

    fn set_position(&mut self, index: usize, position: Vec3) {
        self.vertices[index].position = position.to_array();
    }

    fn mark_positions_dirty(&mut self) { self.normals_stale = true; }
}

// ============================================================================
// TRIANGULATION
// ============================================================================

/// Convert a PolyMesh to a flat-shaded triangle soup.
///
/// Every triangle gets its own three vertices, so a corner shared by several
/// faces in the PolyMesh appears once per triangle here. That is what gives the
/// low-poly faceted look, and why the jitterer groups vertices by position.
///
/// Faces are fan-triangulated from vertex 0.
pub fn triangulate_flat(poly: &PolyMesh, color: [f32; 3]) -> RenderMesh {
    triangulate_flat_by(poly, |_| color)
}

/// Like `triangulate_flat`, with the color picked per PolyMesh face index.
pub fn triangulate_flat_by<F>(poly: &PolyMesh, face_color: F) -> RenderMesh
where
    F: Fn(usize) -> [f32; 3],
{
    let mut mesh = RenderMesh::new();

    for (fi, face) in poly.faces.iter().enumerate() {
        let color = face_color(fi);
        for i in 1..(face.len() - 1) {
            for corner in [face[0], face[i], face[i + 1]] {
                mesh.indices.push(mesh.vertices.len() as u32);
                mesh.vertices.push(GpuVertex {
                    position: poly.positions[corner].to_array(),
                    normal:   [0.0; 3],
                    color,
                });
            }
        }
    }

    mesh.recompute_flat_normals();
    mesh
}
