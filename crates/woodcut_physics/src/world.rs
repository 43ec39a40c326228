//! Physics world and simulation

use std::collections::HashSet;

use slotmap::SlotMap;
use woodcut_math::{Quat, Vec3};

use crate::body::{BodyKey, BodyLocks, RigidBody, StaticCollider};
use crate::collision::{aabb_vs_aabb, aabb_vs_floor, CollisionEvent, CollisionLayer, Contact};
use crate::joint::{FixedJoint, JointKey};
use crate::query::{Ray, RayHit};

/// Configuration for the physics simulation
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    /// Gravity acceleration (applied to Y-axis, negative = down)
    pub gravity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { gravity: -9.81 }
    }
}

impl PhysicsConfig {
    /// Create a new physics config with the given gravity
    pub fn new(gravity: f32) -> Self {
        Self { gravity }
    }
}

/// The physics world containing all rigid bodies and joints
pub struct PhysicsWorld {
    /// All rigid bodies in the world (using generational keys)
    bodies: SlotMap<BodyKey, RigidBody>,
    /// Fixed joints driving bodies toward targets
    joints: SlotMap<JointKey, FixedJoint>,
    /// Static colliders (floors)
    static_colliders: Vec<StaticCollider>,
    /// Pairs that were touching at the end of the last step
    active_contacts: HashSet<(BodyKey, BodyKey)>,
    /// Collision-enter events not yet drained
    events: Vec<CollisionEvent>,
    /// Physics configuration
    pub config: PhysicsConfig,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            joints: SlotMap::with_key(),
            static_colliders: Vec::new(),
            active_contacts: HashSet::new(),
            events: Vec::new(),
            config,
        }
    }

    /// Add a static collider to the world
    pub fn add_static_collider(&mut self, collider: StaticCollider) {
        self.static_colliders.push(collider);
    }

    /// Get immutable access to static colliders
    pub fn static_colliders(&self) -> &[StaticCollider] {
        &self.static_colliders
    }

    /// Height of the highest floor, if any
    pub fn floor_height(&self) -> Option<f32> {
        self.static_colliders.iter().map(|c| c.floor_y).reduce(f32::max)
    }

    /// Add a body to the world and return its key
    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Remove a body, along with its joints and contact records
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        let body = self.bodies.remove(key)?;
        let before = self.joints.len();
        self.joints.retain(|_, joint| joint.body != key);
        self.active_contacts.retain(|(a, b)| *a != key && *b != key);
        if self.joints.len() != before {
            log::debug!("Removed {} joint(s) with body {:?}", before - self.joints.len(), key);
        }
        Some(body)
    }

    /// Get an immutable reference to a body by key
    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    /// Get a mutable reference to a body by key
    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    /// Get the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate over all body keys
    pub fn body_keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.bodies.keys()
    }

    /// Pin a point of a body to a world target
    ///
    /// Returns `None` if the body does not exist.
    pub fn add_joint(&mut self, joint: FixedJoint) -> Option<JointKey> {
        if !self.bodies.contains_key(joint.body) {
            log::warn!("Cannot attach joint: body {:?} does not exist", joint.body);
            return None;
        }
        Some(self.joints.insert(joint))
    }

    /// Remove a joint and return it
    pub fn remove_joint(&mut self, key: JointKey) -> Option<FixedJoint> {
        self.joints.remove(key)
    }

    /// Get a joint by key
    pub fn get_joint(&self, key: JointKey) -> Option<&FixedJoint> {
        self.joints.get(key)
    }

    /// Move a joint's world target; returns false for a stale key
    pub fn set_joint_target(&mut self, key: JointKey, target: Vec3) -> bool {
        match self.joints.get_mut(key) {
            Some(joint) => {
                joint.target = target;
                true
            }
            None => false,
        }
    }

    /// Number of joints attached to a body
    pub fn joints_on(&self, body: BodyKey) -> usize {
        self.joints.values().filter(|j| j.body == body).count()
    }

    /// Total number of joints
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Cast a ray against body bounds, returning the nearest hit
    ///
    /// Only bodies whose layer intersects `mask` are considered.
    pub fn raycast(&self, ray: &Ray, max_distance: f32, mask: CollisionLayer) -> Option<RayHit> {
        self.bodies
            .iter()
            .filter(|(_, body)| body.filter.layer.intersects(mask))
            .filter_map(|(key, body)| {
                let t = body.world_aabb().ray_intersection(ray.origin, ray.direction)?;
                (t <= max_distance).then_some((key, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(body, distance)| RayHit {
                body,
                distance,
                point: ray.at(distance),
            })
    }

    /// Take all collision-enter events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Step the physics simulation forward by dt seconds
    ///
    /// This performs:
    /// 1. Joint driving of attached bodies
    /// 2. Gravity and velocity integration for free dynamic bodies
    /// 3. Floor collision resolution
    /// 4. Body-body detection, collision-enter events and resolution
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let driven = self.drive_joints(dt);

        // Integrate free bodies
        for (key, body) in &mut self.bodies {
            if body.is_static() || driven.contains(&key) {
                continue;
            }

            if body.is_dynamic() && body.affected_by_gravity {
                body.velocity.y += self.config.gravity * dt;
            }
            body.velocity = body.locks.filter_linear(body.velocity);
            body.angular_velocity = body.locks.filter_angular(body.angular_velocity);

            body.position += body.velocity * dt;
            if body.angular_velocity != Vec3::ZERO {
                body.rotation =
                    (Quat::from_scaled_axis(body.angular_velocity * dt) * body.rotation).normalize();
            }
        }

        self.resolve_floor_collisions(&driven);
        self.resolve_body_collisions(&driven);
    }

    /// Move jointed bodies onto their targets; returns the set of driven bodies
    fn drive_joints(&mut self, dt: f32) -> HashSet<BodyKey> {
        let mut sums: Vec<(BodyKey, Vec3, u32)> = Vec::new();
        for joint in self.joints.values() {
            let Some(body) = self.bodies.get(joint.body) else {
                continue;
            };
            let desired = joint.target - body.rotation.rotate(joint.local_anchor);
            match sums.iter_mut().find(|(k, _, _)| *k == joint.body) {
                Some(entry) => {
                    entry.1 += desired;
                    entry.2 += 1;
                }
                None => sums.push((joint.body, desired, 1)),
            }
        }

        let mut driven = HashSet::with_capacity(sums.len());
        for (key, sum, count) in sums {
            let Some(body) = self.bodies.get_mut(key) else {
                continue;
            };
            let desired = sum / count as f32;
            // Translation locks do not apply to a held body; rotation locks do
            body.velocity = (desired - body.position) / dt;
            body.angular_velocity = body.locks.filter_angular(body.angular_velocity);
            body.position = desired;
            if body.angular_velocity != Vec3::ZERO {
                body.rotation =
                    (Quat::from_scaled_axis(body.angular_velocity * dt) * body.rotation).normalize();
            }
            driven.insert(key);
        }
        driven
    }

    /// Resolve collisions between dynamic bodies and floors
    fn resolve_floor_collisions(&mut self, driven: &HashSet<BodyKey>) {
        for (key, body) in &mut self.bodies {
            if !body.is_dynamic() || driven.contains(&key) || body.locks.contains(BodyLocks::TRANSLATION) {
                continue;
            }

            for floor in &self.static_colliders {
                let Some(contact) = aabb_vs_floor(&body.world_aabb(), floor.floor_y) else {
                    continue;
                };
                body.position += contact.normal * contact.penetration;

                let combined = body.material.combine(&floor.material);
                apply_velocity_response(body, contact.normal, combined.restitution, combined.friction);
            }
        }
    }

    /// Detect body pairs, record collision-enter events and push bodies apart
    fn resolve_body_collisions(&mut self, driven: &HashSet<BodyKey>) {
        let keys: Vec<BodyKey> = self.bodies.keys().collect();
        let mut touching = HashSet::new();

        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                let (key_a, key_b) = ordered(keys[i], keys[j]);
                let body_a = &self.bodies[key_a];
                let body_b = &self.bodies[key_b];

                if body_a.is_static() && body_b.is_static() {
                    continue;
                }
                if !body_a.filter.collides_with(&body_b.filter) {
                    continue;
                }

                // Normal points from B toward A
                let Some(contact) = aabb_vs_aabb(&body_a.world_aabb(), &body_b.world_aabb()) else {
                    continue;
                };

                touching.insert((key_a, key_b));
                if !self.active_contacts.contains(&(key_a, key_b)) {
                    self.events.push(CollisionEvent {
                        body_a: key_a,
                        body_b: key_b,
                        point: contact.point,
                        normal: contact.normal,
                        relative_velocity: body_a.velocity - body_b.velocity,
                    });
                }

                if body_a.filter.is_trigger() || body_b.filter.is_trigger() {
                    continue;
                }
                if contact.is_colliding() {
                    self.resolve_body_pair(key_a, key_b, &contact, driven);
                }
            }
        }

        self.active_contacts = touching;
    }

    /// Resolve collision between two specific bodies
    fn resolve_body_pair(
        &mut self,
        key_a: BodyKey,
        key_b: BodyKey,
        contact: &Contact,
        driven: &HashSet<BodyKey>,
    ) {
        let movable = |world: &Self, key: BodyKey| {
            let body = &world.bodies[key];
            body.is_dynamic() && !driven.contains(&key) && !body.locks.contains(BodyLocks::TRANSLATION)
        };
        let movable_a = movable(self, key_a);
        let movable_b = movable(self, key_b);

        let (share_a, share_b) = match (movable_a, movable_b) {
            (false, false) => return,
            (true, false) => (1.0, 0.0),
            (false, true) => (0.0, 1.0),
            (true, true) => {
                let mass_a = self.bodies[key_a].mass;
                let mass_b = self.bodies[key_b].mass;
                let total = mass_a + mass_b;
                (mass_b / total, mass_a / total)
            }
        };

        let combined = self.bodies[key_a].material.combine(&self.bodies[key_b].material);

        if movable_a {
            let body = &mut self.bodies[key_a];
            body.position += contact.normal * contact.penetration * share_a;
            apply_velocity_response(body, contact.normal, combined.restitution, combined.friction);
        }
        if movable_b {
            let body = &mut self.bodies[key_b];
            body.position -= contact.normal * contact.penetration * share_b;
            apply_velocity_response(body, -contact.normal, combined.restitution, combined.friction);
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn ordered(a: BodyKey, b: BodyKey) -> (BodyKey, BodyKey) {
    if a < b { (a, b) } else { (b, a) }
}

/// Cancel velocity into a surface whose outward normal is `normal`, then
/// bounce and damp the tangential part
fn apply_velocity_response(body: &mut RigidBody, normal: Vec3, restitution: f32, friction: f32) {
    let along_normal = body.velocity.dot(normal);
    if along_normal >= 0.0 {
        return;
    }
    body.velocity -= normal * along_normal * (1.0 + restitution);

    let normal_part = normal * body.velocity.dot(normal);
    let tangent = body.velocity - normal_part;
    if tangent.length() > 0.0001 {
        body.velocity = normal_part + tangent * (1.0 - friction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyType;
    use crate::collision::CollisionFilter;
    use crate::material::PhysicsMaterial;

    fn world_with_floor(floor_y: f32) -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.add_static_collider(StaticCollider::floor(floor_y, PhysicsMaterial::GROUND));
        world
    }

    #[test]
    fn test_physics_config_default() {
        assert!((PhysicsConfig::default().gravity + 9.81).abs() < 1e-6);
    }

    #[test]
    fn test_floor_height_is_highest_floor() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.floor_height(), None);
        world.add_static_collider(StaticCollider::floor(-1.0, PhysicsMaterial::GROUND));
        world.add_static_collider(StaticCollider::floor(0.5, PhysicsMaterial::GROUND));
        assert_eq!(world.floor_height(), Some(0.5));
    }

    #[test]
    fn test_world_add_and_remove_body() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::new_box(Vec3::ZERO, Vec3::ONE));
        assert_eq!(world.body_count(), 1);

        assert!(world.remove_body(key).is_some());
        assert!(world.get_body(key).is_none());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_gravity_pulls_body_down() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::new_box(Vec3::new(0.0, 10.0, 0.0), Vec3::splat(0.5)));
        world.step(0.1);
        assert!(world.get_body(key).unwrap().position.y < 10.0);
    }

    #[test]
    fn test_locked_body_does_not_move() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(
            RigidBody::new_box(Vec3::new(0.0, 10.0, 0.0), Vec3::splat(0.5)).with_locks(BodyLocks::ALL),
        );
        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        assert_eq!(world.get_body(key).unwrap().position, Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_body_rests_on_floor() {
        let mut world = world_with_floor(0.0);
        let key = world.add_body(RigidBody::new_box(Vec3::new(0.0, 2.0, 0.0), Vec3::splat(0.5)));
        for _ in 0..240 {
            world.step(1.0 / 60.0);
        }
        let body = world.get_body(key).unwrap();
        assert!((body.world_aabb().min.y - 0.0).abs() < 0.05);
    }

    #[test]
    fn test_joint_drives_anchor_onto_target() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::new_box(Vec3::ZERO, Vec3::new(0.05, 0.5, 0.05)));
        let anchor = Vec3::new(0.0, -0.4, 0.0);
        let joint = world
            .add_joint(FixedJoint::new(key, anchor, Vec3::new(1.0, 1.0, 0.0)))
            .unwrap();

        world.step(0.1);
        let body = world.get_body(key).unwrap();
        assert!((body.world_point(anchor) - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-4);
        assert!(body.velocity.length() > 0.0);

        assert!(world.set_joint_target(joint, Vec3::new(2.0, 1.0, 0.0)));
        world.step(0.1);
        let body = world.get_body(key).unwrap();
        assert!((body.world_point(anchor) - Vec3::new(2.0, 1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_joint_on_missing_body_fails() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::new_box(Vec3::ZERO, Vec3::ONE));
        world.remove_body(key);
        assert!(world.add_joint(FixedJoint::new(key, Vec3::ZERO, Vec3::ZERO)).is_none());
    }

    #[test]
    fn test_removing_body_drops_its_joints() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::new_box(Vec3::ZERO, Vec3::ONE));
        world.add_joint(FixedJoint::new(key, Vec3::ZERO, Vec3::ZERO)).unwrap();
        assert_eq!(world.joints_on(key), 1);
        world.remove_body(key);
        assert_eq!(world.joint_count(), 0);
    }

    #[test]
    fn test_collision_enter_event_fires_once() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(0.0));
        let axe = world.add_body(
            RigidBody::new_box(Vec3::new(0.0, 0.6, 0.0), Vec3::splat(0.1))
                .with_velocity(Vec3::new(0.0, -6.0, 0.0))
                .with_filter(CollisionFilter::axe()),
        );
        let log = world.add_body(
            RigidBody::new_box(Vec3::ZERO, Vec3::splat(0.5))
                .with_body_type(BodyType::Static)
                .with_filter(CollisionFilter::wood()),
        );

        world.step(0.05);
        let events = world.drain_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].involves(axe) && events[0].involves(log));
        assert!(events[0].relative_speed() > 5.0);

        // Still overlapping: no new enter event
        world.get_body_mut(axe).unwrap().position = Vec3::new(0.0, 0.5, 0.0);
        world.step(0.05);
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_filtered_pairs_produce_no_events() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(0.0));
        world.add_body(RigidBody::new_box(Vec3::ZERO, Vec3::ONE).with_filter(CollisionFilter::hand()));
        world.add_body(RigidBody::new_box(Vec3::ZERO, Vec3::ONE).with_filter(CollisionFilter::wood()));
        world.step(0.01);
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_raycast_hits_nearest_in_mask() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(0.0));
        let near = world.add_body(
            RigidBody::new_box(Vec3::new(0.0, 0.0, -2.0), Vec3::splat(0.5)).with_filter(CollisionFilter::wood()),
        );
        world.add_body(
            RigidBody::new_box(Vec3::new(0.0, 0.0, -5.0), Vec3::splat(0.5)).with_filter(CollisionFilter::axe()),
        );
        world.add_body(
            RigidBody::new_box(Vec3::new(0.0, 0.0, -1.0), Vec3::splat(0.2))
                .with_filter(CollisionFilter::static_world()),
        );

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = world.raycast(&ray, 10.0, CollisionLayer::INTERACTABLE).unwrap();
        assert_eq!(hit.body, near);
        assert!((hit.distance - 1.5).abs() < 1e-4);

        assert!(world.raycast(&ray, 1.0, CollisionLayer::INTERACTABLE).is_none());
    }
}
