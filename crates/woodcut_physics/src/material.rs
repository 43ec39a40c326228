//! Physical material properties for collision response

use serde::{Deserialize, Serialize};

/// Physical material properties for collision response
///
/// Materials define how objects interact during collisions: friction (how
/// much objects resist sliding) and restitution (bounciness).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    /// Friction coefficient (0.0 = ice, 1.0 = rubber)
    pub friction: f32,
    /// Restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

impl PhysicsMaterial {
    /// Logs and chopped pieces: moderate friction, low bounce
    pub const WOOD: Self = Self {
        friction: 0.5,
        restitution: 0.2,
    };

    /// The axe: moderate friction and bounce
    pub const STEEL: Self = Self {
        friction: 0.3,
        restitution: 0.3,
    };

    /// Packed earth under the chopping area
    pub const GROUND: Self = Self {
        friction: 0.7,
        restitution: 0.1,
    };

    /// Create a new physics material; values are clamped to [0.0, 1.0]
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction: friction.clamp(0.0, 1.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }

    /// Combine two materials for collision response
    ///
    /// Geometric mean for friction, maximum for restitution.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            friction: (self.friction * other.friction).sqrt(),
            restitution: self.restitution.max(other.restitution),
        }
    }
}
