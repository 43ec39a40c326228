//! Unit quaternion rotations
//!
//! Rotations are stored as `w + xi + yj + zk`. All constructors return unit
//! quaternions; `rotate` assumes unit length.

use serde::{Serialize, Deserialize};
use crate::Vec3;

/// A rotation in 3D space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity rotation
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Rotation of `angle` radians around `axis`
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalized();
        if axis == Vec3::ZERO {
            return Self::IDENTITY;
        }
        let (sin_h, cos_h) = (angle * 0.5).sin_cos();
        Self {
            x: axis.x * sin_h,
            y: axis.y * sin_h,
            z: axis.z * sin_h,
            w: cos_h,
        }
    }

    /// Rotation by a scaled axis (axis * angle), e.g. angular velocity * dt
    pub fn from_scaled_axis(v: Vec3) -> Self {
        let angle = v.length();
        if angle < 1e-8 {
            return Self::IDENTITY;
        }
        Self::from_axis_angle(v / angle, angle)
    }

    /// Shortest rotation taking unit vector `from` onto unit vector `to`
    pub fn from_rotation_arc(from: Vec3, to: Vec3) -> Self {
        let from = from.normalized();
        let to = to.normalized();
        let d = from.dot(to);
        if d >= 1.0 - 1e-6 {
            return Self::IDENTITY;
        }
        if d <= -1.0 + 1e-6 {
            // Opposite vectors: rotate half a turn around any perpendicular axis
            let mut axis = Vec3::X.cross(from);
            if axis.length_squared() < 1e-6 {
                axis = Vec3::Y.cross(from);
            }
            return Self::from_axis_angle(axis, std::f32::consts::PI);
        }
        let c = from.cross(to);
        Self { x: c.x, y: c.y, z: c.z, w: 1.0 + d }.normalize()
    }

    /// Normalize to unit length
    pub fn normalize(self) -> Self {
        let mag = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if mag > 0.0 {
            let inv = 1.0 / mag;
            Self { x: self.x * inv, y: self.y * inv, z: self.z * inv, w: self.w * inv }
        } else {
            Self::IDENTITY
        }
    }

    /// Inverse rotation (conjugate of a unit quaternion)
    #[inline]
    pub fn inverse(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z, w: self.w }
    }

    /// Rotate a vector
    pub fn rotate(self, v: Vec3) -> Vec3 {
        // v' = v + 2w(q x v) + 2(q x (q x v))
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v) * 2.0;
        v + t * self.w + q.cross(t)
    }

    /// The rotated local up axis
    #[inline]
    pub fn up(self) -> Vec3 {
        self.rotate(Vec3::Y)
    }
}

impl std::ops::Mul for Quat {
    type Output = Self;

    /// Hamilton product: `a * b` applies `b` first, then `a`
    fn mul(self, o: Self) -> Self {
        Self {
            w: self.w * o.w - self.x * o.x - self.y * o.y - self.z * o.z,
            x: self.w * o.x + self.x * o.w + self.y * o.z - self.z * o.y,
            y: self.w * o.y - self.x * o.z + self.y * o.w + self.z * o.x,
            z: self.w * o.z + self.x * o.y - self.y * o.x + self.z * o.w,
        }
    }
}
