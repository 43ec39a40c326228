//! Position and rotation of an entity

use serde::{Serialize, Deserialize};
use woodcut_math::{Quat, Vec3};

/// A rigid transform: rotation then translation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Transform a point from local space to world space
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.rotate(p) + self.position
    }

    /// Transform a direction from local space to world space
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.rotation.rotate(d)
    }

    /// Transform a point from world space to local space
    pub fn inverse_transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.inverse().rotate(p - self.position)
    }

    /// Local up axis in world space
    pub fn up(&self) -> Vec3 {
        self.rotation.up()
    }
}
