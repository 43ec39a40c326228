//! Mathematics for the woodcutter gameplay core
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components
//! - [`Quat`] - unit quaternion rotation
//! - [`Aabb`] - axis-aligned bounding box (render/mesh bounds)
//! - [`Plane`] - point/normal plane used for slicing
//! - [`Axis`] - one of the three world axes

mod vec3;
mod quat;
mod aabb;
mod plane;

pub use vec3::{Axis, Vec3};
pub use quat::Quat;
pub use aabb::Aabb;
pub use plane::{Plane, PlaneSide};
