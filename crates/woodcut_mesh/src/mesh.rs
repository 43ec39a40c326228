//! Indexed triangle meshes

use serde::{Serialize, Deserialize};
use woodcut_math::{Aabb, Vec3};

/// Identifier of a render material (bark, cross-section, steel, ...)
///
/// Materials themselves live in the renderer; meshes only carry ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// Outer surface of a log
    pub const BARK: Self = Self(0);
    /// Freshly cut wood face
    pub const CROSS_SECTION: Self = Self(1);
    /// Axe head and handle
    pub const STEEL: Self = Self(2);
}

/// A triangle referencing three vertices and a material
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [u32; 3],
    pub material: MaterialId,
}

/// An indexed triangle mesh in local (object) space
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from raw parts
    ///
    /// Triangles with out-of-range indices are dropped.
    pub fn from_parts(vertices: Vec<Vec3>, triangles: Vec<Triangle>) -> Self {
        let count = vertices.len() as u32;
        let triangles = triangles
            .into_iter()
            .filter(|t| t.indices.iter().all(|&i| i < count))
            .collect();
        Self { vertices, triangles }
    }

    /// Create a box centered on the origin, outward-facing, 12 triangles
    pub fn cuboid(half_extents: Vec3, material: MaterialId) -> Self {
        let h = half_extents;
        let vertices = vec![
            Vec3::new(-h.x, -h.y, -h.z), // 0
            Vec3::new(h.x, -h.y, -h.z),  // 1
            Vec3::new(h.x, h.y, -h.z),   // 2
            Vec3::new(-h.x, h.y, -h.z),  // 3
            Vec3::new(-h.x, -h.y, h.z),  // 4
            Vec3::new(h.x, -h.y, h.z),   // 5
            Vec3::new(h.x, h.y, h.z),    // 6
            Vec3::new(-h.x, h.y, h.z),   // 7
        ];
        let faces: [[u32; 3]; 12] = [
            [0, 2, 1], [0, 3, 2], // -z
            [4, 5, 6], [4, 6, 7], // +z
            [0, 1, 5], [0, 5, 4], // -y
            [3, 7, 6], [3, 6, 2], // +y
            [0, 4, 7], [0, 7, 3], // -x
            [1, 2, 6], [1, 6, 5], // +x
        ];
        let triangles = faces
            .iter()
            .map(|&indices| Triangle { indices, material })
            .collect();
        Self { vertices, triangles }
    }

    /// Append a triangle given by positions
    pub fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, material: MaterialId) {
        let base = self.vertices.len() as u32;
        self.vertices.extend([a, b, c]);
        self.triangles.push(Triangle {
            indices: [base, base + 1, base + 2],
            material,
        });
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True when the mesh has no triangles
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Positions of the three corners of a triangle
    pub fn triangle_positions(&self, tri: &Triangle) -> [Vec3; 3] {
        tri.indices.map(|i| self.vertices[i as usize])
    }

    /// Number of triangles using a material
    pub fn material_triangle_count(&self, material: MaterialId) -> usize {
        self.triangles.iter().filter(|t| t.material == material).count()
    }

    /// Local-space bounds, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        if self.is_empty() {
            return None;
        }
        Aabb::from_points(self.vertices.iter().copied())
    }

    /// Move the vertices so the bounds center sits on the local origin
    ///
    /// Returns the offset that was removed; the owner adds it (rotated into
    /// world space) to its position so the mesh stays in place.
    pub fn recenter(&mut self) -> Vec3 {
        let Some(bounds) = self.bounds() else {
            return Vec3::ZERO;
        };
        let center = bounds.center();
        for v in &mut self.vertices {
            *v -= center;
        }
        center
    }

    /// Raw vertex positions for GPU upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
