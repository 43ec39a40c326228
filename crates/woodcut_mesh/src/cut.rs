//! The plane-cut primitive
//!
//! A cut splits every triangle straddling the plane, sorts the pieces into an
//! upper hull (normal side) and a lower hull, and closes each hull with a cap
//! over the cross-section. Caps use the caller's cross-section material.

use woodcut_math::{Plane, Vec3};
use crate::{MaterialId, Mesh};

/// The two halves produced by a successful cut
#[derive(Clone, Debug)]
pub struct SlicedHull {
    /// Piece on the side the plane normal points to
    pub upper: Mesh,
    /// Piece on the opposite side
    pub lower: Mesh,
}

/// Something that can split a mesh by a plane
///
/// Returns `None` when the plane does not pass through the mesh or the mesh
/// has no usable geometry. The plane is given in the mesh's local space.
pub trait MeshCutter {
    fn cut(&self, mesh: &Mesh, plane: &Plane, cap_material: MaterialId) -> Option<SlicedHull>;
}

/// Clip-and-cap cutter for closed meshes with convex cross-sections
#[derive(Clone, Copy, Debug)]
pub struct PlaneCutter {
    /// Distance under which a vertex counts as lying on the plane
    pub epsilon: f32,
}

impl Default for PlaneCutter {
    fn default() -> Self {
        Self { epsilon: 1e-5 }
    }
}

impl PlaneCutter {
    pub fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    /// Distances with near-zero values snapped to exactly zero
    fn snapped_distances(&self, plane: &Plane, corners: &[Vec3; 3]) -> [f32; 3] {
        corners.map(|p| {
            let d = plane.signed_distance(p);
            if d.abs() <= self.epsilon { 0.0 } else { d }
        })
    }

    /// Merge cross-section points closer than epsilon
    fn dedup_points(&self, points: Vec<Vec3>) -> Vec<Vec3> {
        let mut unique: Vec<Vec3> = Vec::with_capacity(points.len());
        for p in points {
            if !unique.iter().any(|q| (*q - p).length() <= self.epsilon * 10.0) {
                unique.push(p);
            }
        }
        unique
    }
}

impl MeshCutter for PlaneCutter {
    fn cut(&self, mesh: &Mesh, plane: &Plane, cap_material: MaterialId) -> Option<SlicedHull> {
        if mesh.is_empty() || plane.normal.length_squared() < 0.5 {
            return None;
        }

        let mut upper = Mesh::new();
        let mut lower = Mesh::new();
        let mut section = Vec::new();

        for tri in mesh.triangles() {
            let corners = mesh.triangle_positions(tri);
            let d = self.snapped_distances(plane, &corners);

            if d.iter().all(|&x| x == 0.0) {
                // Coplanar faces belong to the lower piece
                lower.push_triangle(corners[0], corners[1], corners[2], tri.material);
                section.extend(corners);
                continue;
            }
            if d.iter().all(|&x| x >= 0.0) {
                upper.push_triangle(corners[0], corners[1], corners[2], tri.material);
                section.extend((0..3).filter(|&i| d[i] == 0.0).map(|i| corners[i]));
                continue;
            }
            if d.iter().all(|&x| x <= 0.0) {
                lower.push_triangle(corners[0], corners[1], corners[2], tri.material);
                section.extend((0..3).filter(|&i| d[i] == 0.0).map(|i| corners[i]));
                continue;
            }

            // Straddling triangle: walk the edges keeping winding order
            let mut above = Vec::with_capacity(4);
            let mut below = Vec::with_capacity(4);
            for i in 0..3 {
                let j = (i + 1) % 3;
                let (p, dp) = (corners[i], d[i]);
                let (q, dq) = (corners[j], d[j]);

                if dp >= 0.0 {
                    above.push(p);
                }
                if dp <= 0.0 {
                    below.push(p);
                }
                if dp == 0.0 {
                    section.push(p);
                }
                if (dp > 0.0 && dq < 0.0) || (dp < 0.0 && dq > 0.0) {
                    let t = dp / (dp - dq);
                    let hit = p.lerp(q, t);
                    above.push(hit);
                    below.push(hit);
                    section.push(hit);
                }
            }
            fan(&mut upper, &above, tri.material);
            fan(&mut lower, &below, tri.material);
        }

        if upper.is_empty() || lower.is_empty() {
            log::debug!("Plane cut missed the mesh ({} triangles)", mesh.triangle_count());
            return None;
        }

        let section = self.dedup_points(section);
        if let Some(loop_points) = order_around_normal(&section, plane.normal) {
            cap(&mut lower, &loop_points, plane.normal, cap_material);
            cap(&mut upper, &loop_points, -plane.normal, cap_material);
        }

        Some(SlicedHull { upper, lower })
    }
}

/// Triangulate a convex polygon as a fan from its first vertex
fn fan(mesh: &mut Mesh, polygon: &[Vec3], material: MaterialId) {
    if polygon.len() < 3 {
        return;
    }
    for i in 1..polygon.len() - 1 {
        mesh.push_triangle(polygon[0], polygon[i], polygon[i + 1], material);
    }
}

/// Sort cross-section points counter-clockwise around `normal`
fn order_around_normal(points: &[Vec3], normal: Vec3) -> Option<Vec<Vec3>> {
    if points.len() < 3 {
        return None;
    }
    let centroid = points.iter().fold(Vec3::ZERO, |acc, p| acc + *p) / points.len() as f32;

    let helper = if normal.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    let u = helper.cross(normal).normalized();
    let v = normal.cross(u);

    let mut ordered: Vec<(f32, Vec3)> = points
        .iter()
        .map(|p| {
            let rel = *p - centroid;
            (rel.dot(v).atan2(rel.dot(u)), *p)
        })
        .collect();
    ordered.sort_by(|a, b| a.0.total_cmp(&b.0));
    Some(ordered.into_iter().map(|(_, p)| p).collect())
}

/// Close a hull over an ordered cross-section loop, facing `facing`
fn cap(mesh: &mut Mesh, loop_points: &[Vec3], facing: Vec3, material: MaterialId) {
    let centroid = loop_points.iter().fold(Vec3::ZERO, |acc, p| acc + *p) / loop_points.len() as f32;
    for i in 0..loop_points.len() {
        let a = loop_points[i];
        let b = loop_points[(i + 1) % loop_points.len()];
        let normal = (a - centroid).cross(b - centroid);
        if normal.length_squared() < 1e-12 {
            continue;
        }
        if normal.dot(facing) >= 0.0 {
            mesh.push_triangle(centroid, a, b, material);
        } else {
            mesh.push_triangle(centroid, b, a, material);
        }
    }
}
