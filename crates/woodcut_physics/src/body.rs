//! Rigid body types

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use woodcut_math::{Aabb, Axis, Quat, Vec3};

use crate::collision::CollisionFilter;
use crate::material::PhysicsMaterial;

// Define generational key type for rigid bodies
new_key_type! {
    /// Key to a rigid body in the physics world
    ///
    /// Generational: once a body is removed (a log that got sliced), old keys
    /// return None instead of pointing at whatever reuses the slot.
    pub struct BodyKey;
}

/// How a body participates in the simulation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    /// Integrated by the simulation and pushed by contacts
    #[default]
    Dynamic,
    /// Moved only by its velocity, never pushed
    Kinematic,
    /// Never moves
    Static,
}

bitflags! {
    /// Per-axis motion locks (an engine's "rigidbody constraints")
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BodyLocks: u8 {
        const TRANSLATION_X = 1 << 0;
        const TRANSLATION_Y = 1 << 1;
        const TRANSLATION_Z = 1 << 2;
        const ROTATION_X = 1 << 3;
        const ROTATION_Y = 1 << 4;
        const ROTATION_Z = 1 << 5;
        const TRANSLATION = Self::TRANSLATION_X.bits() | Self::TRANSLATION_Y.bits() | Self::TRANSLATION_Z.bits();
        const ROTATION = Self::ROTATION_X.bits() | Self::ROTATION_Y.bits() | Self::ROTATION_Z.bits();
        const ALL = Self::TRANSLATION.bits() | Self::ROTATION.bits();
    }
}

impl BodyLocks {
    /// Lock rotation about every axis except `free`
    pub fn rotation_except(free: Axis) -> Self {
        let all = Self::ROTATION;
        match free {
            Axis::X => all - Self::ROTATION_X,
            Axis::Y => all - Self::ROTATION_Y,
            Axis::Z => all - Self::ROTATION_Z,
        }
    }

    /// Zero the components of a linear velocity that are locked
    pub fn filter_linear(self, v: Vec3) -> Vec3 {
        Vec3::new(
            if self.contains(Self::TRANSLATION_X) { 0.0 } else { v.x },
            if self.contains(Self::TRANSLATION_Y) { 0.0 } else { v.y },
            if self.contains(Self::TRANSLATION_Z) { 0.0 } else { v.z },
        )
    }

    /// Zero the components of an angular velocity that are locked
    pub fn filter_angular(self, w: Vec3) -> Vec3 {
        Vec3::new(
            if self.contains(Self::ROTATION_X) { 0.0 } else { w.x },
            if self.contains(Self::ROTATION_Y) { 0.0 } else { w.y },
            if self.contains(Self::ROTATION_Z) { 0.0 } else { w.z },
        )
    }
}

/// A box collision volume in body space, centered on the body origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub half_extents: Vec3,
}

impl Collider {
    /// Box collider with the given half-extents
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self { half_extents: half_extents.abs() }
    }

    /// Tightest box around local-space bounds that are centered on the origin
    ///
    /// Bounds that are not centered are enclosed symmetrically.
    pub fn from_bounds(bounds: &Aabb) -> Self {
        Self::cuboid(bounds.min.abs().max_components(bounds.max.abs()))
    }

    /// World-space AABB of this box at a pose
    pub fn world_aabb(&self, position: Vec3, rotation: Quat) -> Aabb {
        let h = self.half_extents;
        let extent = rotation.rotate(Vec3::X).abs() * h.x
            + rotation.rotate(Vec3::Y).abs() * h.y
            + rotation.rotate(Vec3::Z).abs() * h.z;
        Aabb::from_center_half_extents(position, extent)
    }
}

/// A rigid body with pose, velocities and a box collider
#[derive(Clone, Debug)]
pub struct RigidBody {
    /// Position of the body origin (world space)
    pub position: Vec3,
    /// Orientation
    pub rotation: Quat,
    /// Linear velocity (units per second)
    pub velocity: Vec3,
    /// Angular velocity (radians per second, world axes)
    pub angular_velocity: Vec3,
    /// Mass (used to split contact corrections)
    pub mass: f32,
    /// Simulation participation
    pub body_type: BodyType,
    /// Axis locks
    pub locks: BodyLocks,
    /// Whether gravity applies
    pub affected_by_gravity: bool,
    /// Collision volume
    pub collider: Collider,
    /// Layer membership and mask
    pub filter: CollisionFilter,
    /// Friction/restitution
    pub material: PhysicsMaterial,
}

impl RigidBody {
    /// Create a dynamic box body
    pub fn new_box(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            body_type: BodyType::Dynamic,
            locks: BodyLocks::empty(),
            affected_by_gravity: true,
            collider: Collider::cuboid(half_extents),
            filter: CollisionFilter::default(),
            material: PhysicsMaterial::default(),
        }
    }

    /// Set the orientation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the linear velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass.max(f32::EPSILON);
        self
    }

    /// Set the body type; static and kinematic bodies ignore gravity
    pub fn with_body_type(mut self, body_type: BodyType) -> Self {
        self.body_type = body_type;
        if body_type != BodyType::Dynamic {
            self.affected_by_gravity = false;
        }
        self
    }

    /// Set the axis locks
    pub fn with_locks(mut self, locks: BodyLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Set whether gravity applies
    pub fn with_gravity(mut self, affected: bool) -> Self {
        self.affected_by_gravity = affected;
        self
    }

    /// Set the collision filter
    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the physics material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// Local up axis in world space
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation.up()
    }

    /// Transform a body-space point to world space
    #[inline]
    pub fn world_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation.rotate(local)
    }

    /// World-space bounds of the collider
    #[inline]
    pub fn world_aabb(&self) -> Aabb {
        self.collider.world_aabb(self.position, self.rotation)
    }

    /// Stop all motion
    pub fn clear_velocities(&mut self) {
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }
}

/// An immovable collider that bodies rest on
#[derive(Clone, Copy, Debug)]
pub struct StaticCollider {
    /// Height of a horizontal floor
    pub floor_y: f32,
    pub material: PhysicsMaterial,
}

impl StaticCollider {
    /// A horizontal floor at the given height
    pub fn floor(floor_y: f32, material: PhysicsMaterial) -> Self {
        Self { floor_y, material }
    }
}
