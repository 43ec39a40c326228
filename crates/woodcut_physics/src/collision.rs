//! Collision layers, filtering and contact tests
//!
//! Collisions are detected between world-space bounding boxes. The world turns
//! newly overlapping pairs into [`CollisionEvent`]s.

use bitflags::bitflags;
use woodcut_math::{Aabb, Axis, Vec3};

use crate::body::BodyKey;

bitflags! {
    /// Collision layers for filtering which objects can collide
    ///
    /// Each layer is a bit in a 32-bit mask. Objects can belong to multiple
    /// layers and define which layers they collide with via a mask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CollisionLayer: u32 {
        /// Default layer for most objects
        const DEFAULT = 1 << 0;
        /// Static world geometry (ground, stumps)
        const STATIC = 1 << 3;
        /// Trigger zones (detect but don't push)
        const TRIGGER = 1 << 4;
        /// The axe
        const AXE = 1 << 6;
        /// Choppable wood and its pieces
        const WOOD = 1 << 8;
        /// Simulated hands (never collide)
        const HAND = 1 << 9;
        /// Everything the player can point at and interact with
        const INTERACTABLE = Self::AXE.bits() | Self::WOOD.bits();
        /// All layers (collide with everything)
        const ALL = 0xFFFFFFFF;
    }
}

/// Collision filter determining what an object collides with
///
/// Two objects A and B collide if (A.layer & B.mask) != 0 AND
/// (B.layer & A.mask) != 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    /// Which layer(s) this object belongs to
    pub layer: CollisionLayer,
    /// Which layer(s) this object can collide with
    pub mask: CollisionLayer,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: CollisionLayer::DEFAULT,
            mask: CollisionLayer::ALL,
        }
    }
}

impl CollisionFilter {
    /// Create a new collision filter with specified layer and mask
    pub fn new(layer: CollisionLayer, mask: CollisionLayer) -> Self {
        Self { layer, mask }
    }

    /// Check if this filter allows collision with another filter
    pub fn collides_with(&self, other: &Self) -> bool {
        self.layer.intersects(other.mask) && other.layer.intersects(self.mask)
    }

    /// The axe hits wood and the world, never the hands holding it
    pub fn axe() -> Self {
        Self {
            layer: CollisionLayer::AXE,
            mask: CollisionLayer::ALL & !CollisionLayer::HAND,
        }
    }

    /// Wood collides with everything except hands
    pub fn wood() -> Self {
        Self {
            layer: CollisionLayer::WOOD,
            mask: CollisionLayer::ALL & !CollisionLayer::HAND,
        }
    }

    /// Hands pass through everything
    pub fn hand() -> Self {
        Self {
            layer: CollisionLayer::HAND,
            mask: CollisionLayer::empty(),
        }
    }

    /// Static world geometry
    pub fn static_world() -> Self {
        Self {
            layer: CollisionLayer::STATIC,
            mask: CollisionLayer::ALL,
        }
    }

    /// Trigger zone detecting the given layers
    pub fn trigger(detects: CollisionLayer) -> Self {
        Self {
            layer: CollisionLayer::TRIGGER,
            mask: detects,
        }
    }

    /// Whether this filter marks a trigger (reports, never pushes)
    pub fn is_trigger(&self) -> bool {
        self.layer.contains(CollisionLayer::TRIGGER)
    }
}

/// Contact information from a collision
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// Point of contact
    pub point: Vec3,
    /// Normal pointing from the second shape toward the first
    pub normal: Vec3,
    /// Penetration depth (positive means overlapping)
    pub penetration: f32,
}

impl Contact {
    pub fn new(point: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self { point, normal, penetration }
    }

    #[inline]
    pub fn is_colliding(&self) -> bool {
        self.penetration > 0.0
    }
}

/// A pair of bodies that started touching during a step
#[derive(Clone, Copy, Debug)]
pub struct CollisionEvent {
    pub body_a: BodyKey,
    pub body_b: BodyKey,
    /// Center of the overlap region
    pub point: Vec3,
    /// Normal pointing from B toward A
    pub normal: Vec3,
    /// Velocity of A relative to B, sampled before contact resolution
    pub relative_velocity: Vec3,
}

impl CollisionEvent {
    /// Whether the event involves the given body
    pub fn involves(&self, body: BodyKey) -> bool {
        self.body_a == body || self.body_b == body
    }

    /// The other body in the pair, if `body` is one of them
    pub fn other(&self, body: BodyKey) -> Option<BodyKey> {
        if self.body_a == body {
            Some(self.body_b)
        } else if self.body_b == body {
            Some(self.body_a)
        } else {
            None
        }
    }

    /// Relative collision speed
    pub fn relative_speed(&self) -> f32 {
        self.relative_velocity.length()
    }
}

/// Test AABB vs AABB overlap
///
/// Returns a contact whose normal points from `b` toward `a` along the axis of
/// least overlap.
pub fn aabb_vs_aabb(a: &Aabb, b: &Aabb) -> Option<Contact> {
    if !a.intersects(b) {
        return None;
    }

    let overlap_min = a.min.max_components(b.min);
    let overlap_max = a.max.min_components(b.max);
    let overlap = overlap_max - overlap_min;

    let mut axis = Axis::X;
    for candidate in [Axis::Y, Axis::Z] {
        if overlap.get(candidate) < overlap.get(axis) {
            axis = candidate;
        }
    }

    let normal = if a.center().get(axis) < b.center().get(axis) {
        -axis.unit()
    } else {
        axis.unit()
    };
    let point = (overlap_min + overlap_max) * 0.5;

    Some(Contact::new(point, normal, overlap.get(axis).max(0.0)))
}

/// Test an AABB against a horizontal floor at `floor_y`
pub fn aabb_vs_floor(aabb: &Aabb, floor_y: f32) -> Option<Contact> {
    let depth = floor_y - aabb.min.y;
    if depth > 0.0 {
        let c = aabb.center();
        Some(Contact::new(Vec3::new(c.x, floor_y, c.z), Vec3::Y, depth))
    } else {
        None
    }
}
