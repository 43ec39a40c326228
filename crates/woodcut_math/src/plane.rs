//! Planes for slicing

use serde::{Serialize, Deserialize};
use crate::{Quat, Vec3};

/// Which side of a plane a point lies on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneSide {
    /// Along the normal
    Above,
    /// Against the normal
    Below,
    /// Within tolerance of the plane
    On,
}

/// An infinite plane through `point` with unit `normal`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    /// Create a plane from a point on it and a normal (normalized here)
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalized(),
        }
    }

    /// Signed distance from the plane, positive on the normal side
    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        (p - self.point).dot(self.normal)
    }

    /// Classify a point with the given tolerance
    pub fn side(&self, p: Vec3, epsilon: f32) -> PlaneSide {
        let d = self.signed_distance(p);
        if d > epsilon {
            PlaneSide::Above
        } else if d < -epsilon {
            PlaneSide::Below
        } else {
            PlaneSide::On
        }
    }

    /// Express this world-space plane in the local frame of a body at
    /// `position` with `rotation`
    pub fn to_local(&self, position: Vec3, rotation: Quat) -> Self {
        let inv = rotation.inverse();
        Self {
            point: inv.rotate(self.point - position),
            normal: inv.rotate(self.normal).normalized(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_distance_and_side() {
        let plane = Plane::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y * 3.0);
        assert_eq!(plane.normal, Vec3::Y);
        assert_eq!(plane.signed_distance(Vec3::new(5.0, 3.0, 0.0)), 2.0);
        assert_eq!(plane.side(Vec3::new(0.0, 0.0, 0.0), 1e-5), PlaneSide::Below);
        assert_eq!(plane.side(Vec3::new(9.0, 1.0, 9.0), 1e-5), PlaneSide::On);
    }

    #[test]
    fn test_to_local() {
        let plane = Plane::new(Vec3::new(0.0, 2.0, 0.0), Vec3::Y);
        let rotation = Quat::from_axis_angle(Vec3::Z, std::f32::consts::FRAC_PI_2);
        let local = plane.to_local(Vec3::new(0.0, 2.0, 0.0), rotation);

        assert!(local.point.length() < 1e-5);
        // World up, seen from a body rolled a quarter turn about Z, is local +X
        assert!((local.normal - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-4);
    }
}
