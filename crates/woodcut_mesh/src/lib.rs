//! Mesh geometry for choppable objects
//!
//! - [`Mesh`] - indexed triangle mesh with a material per triangle
//! - [`MeshCutter`] - the plane-cut primitive the slicer requests cuts from
//! - [`PlaneCutter`] - a cutter that splits a mesh by a plane and caps the
//!   cross-section

mod mesh;
mod cut;

pub use mesh::{MaterialId, Mesh, Triangle};
pub use cut::{MeshCutter, PlaneCutter, SlicedHull};
