//! Player locomotion
//!
//! The player is a point at their feet with walking velocity, gravity,
//! jumping and a horizontal floor. It is not a rigid body and does not push
//! logs around.

use woodcut_math::Vec3;

/// Default jump height in meters
pub const DEFAULT_JUMP_HEIGHT: f32 = 2.0;

/// Feet this close to the floor while not rising count as standing on it
const GROUND_MARGIN: f32 = 0.01;

/// Player movement state
#[derive(Clone, Debug)]
pub struct PlayerBody {
    /// Feet position
    pub position: Vec3,
    pub velocity: Vec3,
    /// Whether the feet are on the floor
    pub grounded: bool,
    /// Upward velocity applied when jumping
    pub jump_velocity: f32,
}

impl PlayerBody {
    /// A player standing at `position` with the default jump under Earth gravity
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            grounded: true,
            jump_velocity: 0.0,
        }
        .with_jump_height(DEFAULT_JUMP_HEIGHT, -9.81)
    }

    /// Set the jump velocity that reaches `height` under `gravity`
    pub fn with_jump_height(mut self, height: f32, gravity: f32) -> Self {
        self.jump_velocity = (2.0 * height.max(0.0) * -gravity).max(0.0).sqrt();
        self
    }

    /// Set the horizontal walking velocity; vertical velocity is left alone
    pub fn apply_movement(&mut self, movement: Vec3) {
        self.velocity.x = movement.x;
        self.velocity.z = movement.z;
    }

    /// Jump if standing on the floor
    pub fn jump(&mut self) -> bool {
        if !self.grounded {
            return false;
        }
        self.velocity.y = self.jump_velocity;
        self.grounded = false;
        true
    }

    /// Apply gravity, integrate, and land on the floor at `floor_y`
    pub fn step(&mut self, dt: f32, gravity: f32, floor_y: f32) {
        self.velocity.y += gravity * dt;
        self.position += self.velocity * dt;

        let height = self.height_above_floor(floor_y);
        if height < 0.0 || (height <= GROUND_MARGIN && self.velocity.y <= 0.0) {
            self.position.y = floor_y;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
            self.grounded = true;
        } else {
            self.grounded = false;
        }
    }

    pub fn is_airborne(&self) -> bool {
        !self.grounded
    }

    pub fn height_above_floor(&self, floor_y: f32) -> f32 {
        self.position.y - floor_y
    }
}
