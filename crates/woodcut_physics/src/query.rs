//! Scene queries

use woodcut_math::Vec3;

use crate::body::BodyKey;

/// A ray with a unit direction
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; the direction is normalized
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalized(),
        }
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Nearest body struck by a ray
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub body: BodyKey,
    pub distance: f32,
    pub point: Vec3,
}
