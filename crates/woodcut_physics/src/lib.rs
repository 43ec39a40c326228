//! Host physics primitives for the woodcutter core
//!
//! This crate stands in for the rigid-body services a game engine provides:
//! - Bodies with linear/angular velocity, axis locks and a box collider
//! - Collision layers and filtering
//! - Fixed joints binding a body point to a moving anchor (a hand)
//! - Raycast queries
//! - Walking, jumping player locomotion
//! - Collision-enter notifications carrying the pre-solve relative velocity
//!
//! It is deliberately small: boxes only, no rotational collision response.

pub mod body;
pub mod collision;
pub mod joint;
pub mod material;
pub mod player;
pub mod query;
pub mod world;

// Re-export commonly used types
pub use body::{BodyKey, BodyLocks, BodyType, Collider, RigidBody, StaticCollider};
pub use collision::{aabb_vs_aabb, aabb_vs_floor, CollisionEvent, CollisionFilter, CollisionLayer, Contact};
pub use joint::{FixedJoint, JointKey};
pub use material::PhysicsMaterial;
pub use player::{PlayerBody, DEFAULT_JUMP_HEIGHT};
pub use query::{Ray, RayHit};
pub use world::{PhysicsConfig, PhysicsWorld};
