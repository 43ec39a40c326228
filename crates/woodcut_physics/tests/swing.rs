//! A jointed body swung through a log on the block produces one enter event

use woodcut_math::Vec3;
use woodcut_physics::{
    BodyLocks, CollisionFilter, FixedJoint, PhysicsMaterial, PhysicsWorld, RigidBody, StaticCollider,
};

#[test]
fn test_jointed_swing_reports_relative_velocity() {
    let mut world = PhysicsWorld::new();
    world.add_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::GROUND));

    let log = world.add_body(
        RigidBody::new_box(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.15, 0.5, 0.15))
            .with_filter(CollisionFilter::wood())
            .with_material(PhysicsMaterial::WOOD)
            .with_locks(BodyLocks::ALL),
    );
    let axe = world.add_body(
        RigidBody::new_box(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.05, 0.4, 0.05))
            .with_filter(CollisionFilter::axe())
            .with_locks(BodyLocks::ROTATION_X | BodyLocks::ROTATION_Z),
    );
    let grip = Vec3::new(0.0, 0.3, 0.0);
    let joint = world.add_joint(FixedJoint::new(axe, grip, Vec3::new(0.0, 2.3, 0.0))).unwrap();

    // Bring the hand down fast: 0.15 per 1/60 s is 9 units/s
    let dt = 1.0 / 60.0;
    let mut target_y = 2.3;
    let mut hits = Vec::new();
    for _ in 0..30 {
        target_y -= 0.15;
        world.set_joint_target(joint, Vec3::new(0.0, target_y, 0.0));
        world.step(dt);
        hits.extend(world.drain_events());
    }

    let hit = hits
        .iter()
        .find(|e| e.involves(axe) && e.involves(log))
        .expect("axe should strike the log");
    assert!(hit.relative_speed() >= 5.0);
    assert_eq!(hits.iter().filter(|e| e.involves(axe) && e.involves(log)).count(), 1);
}
