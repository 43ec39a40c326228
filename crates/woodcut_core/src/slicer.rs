//! Collision-triggered wood slicing
//!
//! A qualifying hit splits a choppable entity in two along its dominant
//! bounding-box axis. The two halves get recentered pivots, their own box
//! colliders and dynamic bodies, and the original's tags and collision layer.
//! The original is removed.
//!
//! One [`Slicer`] belongs to one axe. Its guard walks `Idle -> Settling -> Idle`
//! so a single contact cannot slice the same log, or a fresh half of it, twice
//! before physics settles. A cut runs inside [`Slicer::on_collision`] while it
//! holds the slicer mutably, so there is no separate in-flight state.

use serde::{Serialize, Deserialize};
use woodcut_math::{Plane, Vec3};
use woodcut_mesh::{MaterialId, Mesh, MeshCutter, PlaneCutter};
use woodcut_physics::{BodyLocks, BodyType, Collider, CollisionLayer, RigidBody};

use crate::entity::{Entity, WOOD_TAG};
use crate::timer::Countdown;
use crate::world::{EntityKey, World};
use crate::Transform;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    /// Minimum relative collision speed
    pub velocity_threshold: f32,
    /// `axe_up . world_down` must exceed this
    pub downward_angle_threshold: f32,
    /// Pieces with a smaller bounds diagonal are discarded
    pub min_fragment_size: f32,
    /// Settle time before the guard reopens
    pub guard_reset_delay: f32,
    /// Material of the new cut faces
    pub cross_section_material: u32,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            velocity_threshold: 5.0,
            downward_angle_threshold: -0.5,
            min_fragment_size: 0.01,
            guard_reset_delay: 0.1,
            cross_section_material: MaterialId::CROSS_SECTION.0,
        }
    }
}

/// A collision being considered for slicing
#[derive(Clone, Copy, Debug)]
pub struct SliceEvent {
    /// The entity the axe struck
    pub target: EntityKey,
    pub contact_point: Vec3,
    /// Magnitude of the relative collision velocity
    pub relative_speed: f32,
    /// Axe up axis dotted with world down
    pub swing_dot: f32,
}

/// Re-entrancy guard
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SliceGuard {
    #[default]
    Idle,
    Settling(Countdown),
}

/// Why a collision did not start a slice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceRejection {
    /// Target gone or not wood
    NotChoppable,
    TooSlow,
    NotDownward,
    /// A slice is in flight or settling
    Busy,
}

/// A slice that started but could not complete
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceError {
    /// The target has no mesh to cut
    NoMesh,
    /// The target has no physics body
    MissingBody,
    /// The cutter produced no hull
    CutFailed,
}

impl std::fmt::Display for SliceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SliceError::NoMesh => write!(f, "target has no valid mesh for slicing"),
            SliceError::MissingBody => write!(f, "target has no physics body"),
            SliceError::CutFailed => write!(f, "no valid sliced hull was created"),
        }
    }
}

impl std::error::Error for SliceError {}

/// What a slice attempt did to the world
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SliceOutcome {
    /// Nothing happened
    Rejected(SliceRejection),
    /// The target was replaced by two pieces
    Sliced {
        original: EntityKey,
        pieces: [EntityKey; 2],
        plane: Plane,
    },
    /// A piece was too small: the target and both pieces are gone
    Discarded { original: EntityKey },
    /// The slice aborted; the target is untouched
    Failed(SliceError),
}

impl SliceOutcome {
    pub fn is_sliced(&self) -> bool {
        matches!(self, SliceOutcome::Sliced { .. })
    }
}

/// Splits choppable entities hit by one axe
pub struct Slicer {
    config: SliceConfig,
    guard: SliceGuard,
    cutter: Box<dyn MeshCutter>,
}

impl Slicer {
    /// Slicer using the clip-and-cap plane cutter
    pub fn new(config: SliceConfig) -> Self {
        Self::with_cutter(config, Box::new(PlaneCutter::default()))
    }

    pub fn with_cutter(config: SliceConfig, cutter: Box<dyn MeshCutter>) -> Self {
        Self {
            config,
            guard: SliceGuard::Idle,
            cutter,
        }
    }

    #[inline]
    pub fn config(&self) -> &SliceConfig {
        &self.config
    }

    #[inline]
    pub fn guard(&self) -> SliceGuard {
        self.guard
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.guard == SliceGuard::Idle
    }

    /// Advance the settle delay
    pub fn tick(&mut self, dt: f32) {
        if let SliceGuard::Settling(ref mut countdown) = self.guard {
            if countdown.tick(dt) || !countdown.is_running() {
                self.guard = SliceGuard::Idle;
            }
        }
    }

    /// Reopen the guard immediately
    pub fn reset(&mut self) {
        self.guard = SliceGuard::Idle;
    }

    /// Check the qualifying conditions without touching anything
    pub fn qualify(&self, world: &World, event: &SliceEvent) -> Result<(), SliceRejection> {
        let is_wood = world.get_entity(event.target).map_or(false, Entity::is_wood);
        if !is_wood {
            return Err(SliceRejection::NotChoppable);
        }
        if event.relative_speed < self.config.velocity_threshold {
            return Err(SliceRejection::TooSlow);
        }
        if event.swing_dot <= self.config.downward_angle_threshold {
            return Err(SliceRejection::NotDownward);
        }
        if !self.is_idle() {
            return Err(SliceRejection::Busy);
        }
        Ok(())
    }

    /// Handle a collision between the axe and `event.target`
    pub fn on_collision(&mut self, world: &mut World, event: &SliceEvent) -> SliceOutcome {
        if let Err(rejection) = self.qualify(world, event) {
            return SliceOutcome::Rejected(rejection);
        }

        match self.perform_slice(world, event.target) {
            Ok(outcome) => {
                self.settle();
                outcome
            }
            Err(SliceError::CutFailed) => {
                log::warn!("Slicing failed: {}", SliceError::CutFailed);
                self.settle();
                SliceOutcome::Failed(SliceError::CutFailed)
            }
            Err(error) => {
                log::warn!("Cannot slice {:?}: {}", event.target, error);
                self.guard = SliceGuard::Idle;
                SliceOutcome::Failed(error)
            }
        }
    }

    fn settle(&mut self) {
        self.guard = if self.config.guard_reset_delay > 0.0 {
            SliceGuard::Settling(Countdown::new(self.config.guard_reset_delay))
        } else {
            SliceGuard::Idle
        };
    }

    fn perform_slice(&mut self, world: &mut World, target: EntityKey) -> Result<SliceOutcome, SliceError> {
        let entity = world.get_entity(target).ok_or(SliceError::MissingBody)?;
        let mesh = entity
            .mesh
            .as_ref()
            .filter(|m| !m.is_empty())
            .ok_or(SliceError::NoMesh)?;
        let original_body = world.body_of(target).ok_or(SliceError::MissingBody)?.clone();
        let bounds = entity.world_bounds().ok_or(SliceError::NoMesh)?;

        let plane = Plane::new(bounds.center(), bounds.dominant_axis().unit());
        let transform = entity.transform;
        let local_plane = plane.to_local(transform.position, transform.rotation);
        log::debug!("Slicing {:?} at {:?} along {:?}", target, plane.point, plane.normal);

        let hull = self
            .cutter
            .cut(mesh, &local_plane, MaterialId(self.config.cross_section_material))
            .ok_or(SliceError::CutFailed)?;

        let template = entity.clone();
        let pieces = [hull.upper, hull.lower].map(|mesh| Piece::new(mesh, &transform));

        let too_small = pieces.iter().any(|p| p.diagonal < self.config.min_fragment_size);
        world.despawn(target);
        if too_small {
            log::info!("Slice of {:?} produced a fragment below {}; discarding both pieces", target, self.config.min_fragment_size);
            return Ok(SliceOutcome::Discarded { original: target });
        }

        let [upper, lower] = pieces.map(|piece| piece.spawn(world, &template, &original_body));
        log::info!("Sliced {:?} into {:?} and {:?}", target, upper, lower);
        Ok(SliceOutcome::Sliced {
            original: target,
            pieces: [upper, lower],
            plane,
        })
    }
}

/// One half of a cut, recentered on its own bounds
struct Piece {
    mesh: Mesh,
    transform: Transform,
    half_extents: Vec3,
    diagonal: f32,
}

impl Piece {
    fn new(mut mesh: Mesh, parent: &Transform) -> Self {
        let offset = mesh.recenter();
        let bounds = mesh.bounds();
        let transform = Transform::from_position_rotation(parent.transform_point(offset), parent.rotation);
        let (half_extents, diagonal) = match bounds {
            Some(b) => (Collider::from_bounds(&b).half_extents, b.diagonal()),
            None => (Vec3::ZERO, 0.0),
        };
        Self {
            mesh,
            transform,
            half_extents,
            diagonal,
        }
    }

    fn spawn(self, world: &mut World, original: &Entity, original_body: &RigidBody) -> EntityKey {
        let mut filter = original_body.filter;
        filter.layer |= CollisionLayer::WOOD;

        let body = RigidBody::new_box(self.transform.position, self.half_extents)
            .with_rotation(self.transform.rotation)
            .with_velocity(original_body.velocity)
            .with_mass((original_body.mass * 0.5).max(0.01))
            .with_body_type(BodyType::Dynamic)
            .with_locks(BodyLocks::empty())
            .with_filter(filter)
            .with_material(original_body.material);

        let mut entity = Entity::new(self.transform)
            .with_tags(original.tags.iter().cloned())
            .with_tag(WOOD_TAG)
            .with_mesh(self.mesh);
        if let Some(ref name) = original.name {
            entity = entity.with_name(format!("{name} piece"));
        }
        world.spawn(entity, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, EntityTemplate};
    use std::cell::Cell;
    use std::rc::Rc;
    use woodcut_mesh::SlicedHull;
    use woodcut_physics::PhysicsConfig;

    struct CountingCutter {
        calls: Rc<Cell<usize>>,
        inner: Option<PlaneCutter>,
    }

    impl MeshCutter for CountingCutter {
        fn cut(&self, mesh: &Mesh, plane: &Plane, cap: MaterialId) -> Option<SlicedHull> {
            self.calls.set(self.calls.get() + 1);
            self.inner.as_ref()?.cut(mesh, plane, cap)
        }
    }

    fn counting(working: bool) -> (Slicer, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let cutter = CountingCutter {
            calls: Rc::clone(&calls),
            inner: working.then(PlaneCutter::default),
        };
        (Slicer::with_cutter(SliceConfig::default(), Box::new(cutter)), calls)
    }

    fn world_with_log() -> (World, EntityKey) {
        let mut world = World::with_physics(PhysicsConfig::new(0.0));
        let template = EntityTemplate::new(
            EntityKind::Wood,
            Transform::from_position(Vec3::new(0.0, 0.5, 0.0)),
            Vec3::new(0.15, 0.5, 0.15),
        )
        .with_name("log");
        let key = world.spawn(template.to_entity(), template.to_body());
        (world, key)
    }

    fn hit(target: EntityKey, speed: f32) -> SliceEvent {
        SliceEvent {
            target,
            contact_point: Vec3::new(0.0, 1.0, 0.0),
            relative_speed: speed,
            swing_dot: 0.8,
        }
    }

    #[test]
    fn test_below_threshold_never_cuts() {
        let (mut world, log) = world_with_log();
        let (mut slicer, calls) = counting(true);

        let outcome = slicer.on_collision(&mut world, &hit(log, 2.0));
        assert_eq!(outcome, SliceOutcome::Rejected(SliceRejection::TooSlow));
        assert_eq!(calls.get(), 0);
        assert!(world.contains(log));
        assert!(slicer.is_idle());
    }

    #[test]
    fn test_upward_swing_rejected() {
        let (mut world, log) = world_with_log();
        let (mut slicer, calls) = counting(true);
        let event = SliceEvent { swing_dot: -0.8, ..hit(log, 8.0) };
        assert_eq!(
            slicer.on_collision(&mut world, &event),
            SliceOutcome::Rejected(SliceRejection::NotDownward)
        );
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_non_wood_rejected() {
        let mut world = World::with_physics(PhysicsConfig::new(0.0));
        let template = EntityTemplate::new(EntityKind::Prop, Transform::identity(), Vec3::splat(0.5));
        let stump = world.spawn(template.to_entity(), template.to_body());
        let mut slicer = Slicer::new(SliceConfig::default());
        assert_eq!(
            slicer.on_collision(&mut world, &hit(stump, 8.0)),
            SliceOutcome::Rejected(SliceRejection::NotChoppable)
        );
    }

    #[test]
    fn test_successful_slice_replaces_log() {
        let (mut world, log) = world_with_log();
        let mut slicer = Slicer::new(SliceConfig::default());
        let before = world.count_tagged(WOOD_TAG);

        let outcome = slicer.on_collision(&mut world, &hit(log, 8.0));
        let SliceOutcome::Sliced { original, pieces, plane } = outcome else {
            panic!("expected a slice, got {:?}", outcome);
        };
        assert_eq!(original, log);
        assert_eq!(plane.normal, Vec3::Y);
        assert!(!world.contains(log));
        assert_eq!(world.count_tagged(WOOD_TAG), before + 1);

        for piece in pieces {
            let entity = world.get_entity(piece).unwrap();
            assert!(entity.is_wood());
            assert!(entity.mesh.as_ref().unwrap().material_triangle_count(MaterialId::CROSS_SECTION) > 0);
            // Pivot sits on the mesh bounds center
            let local = entity.mesh.as_ref().unwrap().bounds().unwrap();
            assert!(local.center().length() < 1e-4);

            let body = world.body_of(piece).unwrap();
            assert!(body.is_dynamic());
            assert!(body.filter.layer.contains(CollisionLayer::WOOD));
            assert!((body.collider.half_extents.y - 0.25).abs() < 1e-4);
        }

        let upper = world.get_entity(pieces[0]).unwrap().transform.position;
        let lower = world.get_entity(pieces[1]).unwrap().transform.position;
        assert!((upper.y - 0.75).abs() < 1e-4);
        assert!((lower.y - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_guard_blocks_until_settled() {
        let mut world = World::with_physics(PhysicsConfig::new(0.0));
        let mut logs = Vec::new();
        for x in [0.0, 2.0] {
            let t = EntityTemplate::new(EntityKind::Wood, Transform::from_position(Vec3::new(x, 0.5, 0.0)), Vec3::new(0.15, 0.5, 0.15));
            logs.push(world.spawn(t.to_entity(), t.to_body()));
        }
        let mut slicer = Slicer::new(SliceConfig::default());

        assert!(slicer.on_collision(&mut world, &hit(logs[0], 8.0)).is_sliced());
        assert!(matches!(slicer.guard(), SliceGuard::Settling(_)));
        assert_eq!(
            slicer.on_collision(&mut world, &hit(logs[1], 8.0)),
            SliceOutcome::Rejected(SliceRejection::Busy)
        );

        slicer.tick(0.05);
        assert!(!slicer.is_idle());
        slicer.tick(0.06);
        assert!(slicer.is_idle());
        assert!(slicer.on_collision(&mut world, &hit(logs[1], 8.0)).is_sliced());
    }

    #[test]
    fn test_no_mesh_releases_guard_immediately() {
        let mut world = World::with_physics(PhysicsConfig::new(0.0));
        let template = EntityTemplate::new(EntityKind::Wood, Transform::identity(), Vec3::splat(0.2)).without_mesh();
        let log = world.spawn(template.to_entity(), template.to_body());
        let (mut slicer, calls) = counting(true);

        assert_eq!(slicer.on_collision(&mut world, &hit(log, 8.0)), SliceOutcome::Failed(SliceError::NoMesh));
        assert_eq!(slicer.guard(), SliceGuard::Idle);
        assert!(slicer.is_idle());
        assert!(world.contains(log));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_cut_failure_keeps_original_and_settles() {
        let (mut world, log) = world_with_log();
        let (mut slicer, calls) = counting(false);

        assert_eq!(slicer.on_collision(&mut world, &hit(log, 8.0)), SliceOutcome::Failed(SliceError::CutFailed));
        assert_eq!(calls.get(), 1);
        assert!(world.contains(log));
        assert!(matches!(slicer.guard(), SliceGuard::Settling(_)));
        slicer.tick(0.1);
        assert!(slicer.is_idle());
    }

    #[test]
    fn test_undersized_fragments_discard_both() {
        let (mut world, log) = world_with_log();
        let config = SliceConfig {
            min_fragment_size: 0.7,
            ..SliceConfig::default()
        };
        let mut slicer = Slicer::new(config);
        let before = world.count_tagged(WOOD_TAG);

        // Each half is 0.3 x 0.5 x 0.3, diagonal about 0.66
        let outcome = slicer.on_collision(&mut world, &hit(log, 8.0));
        assert_eq!(outcome, SliceOutcome::Discarded { original: log });
        assert_eq!(world.count_tagged(WOOD_TAG), before - 1);
        assert_eq!(world.physics().body_count(), 0);
    }

    #[test]
    fn test_wide_log_is_cut_across_x() {
        let mut world = World::with_physics(PhysicsConfig::new(0.0));
        let t = EntityTemplate::new(EntityKind::Wood, Transform::from_position(Vec3::new(0.0, 0.2, 0.0)), Vec3::new(0.6, 0.15, 0.15));
        let log = world.spawn(t.to_entity(), t.to_body());
        let mut slicer = Slicer::new(SliceConfig::default());

        let SliceOutcome::Sliced { plane, .. } = slicer.on_collision(&mut world, &hit(log, 8.0)) else {
            panic!("expected a slice");
        };
        assert_eq!(plane.normal, Vec3::X);
    }

    #[test]
    fn test_guard_goes_straight_to_settling() {
        let (mut world, log) = world_with_log();
        let mut slicer = Slicer::new(SliceConfig::default());
        assert_eq!(slicer.guard(), SliceGuard::Idle);

        assert!(slicer.on_collision(&mut world, &hit(log, 8.0)).is_sliced());
        let SliceGuard::Settling(countdown) = slicer.guard() else {
            panic!("expected settling, got {:?}", slicer.guard());
        };
        assert!(countdown.is_running());

        let (mut world, log) = world_with_log();
        let mut instant = Slicer::new(SliceConfig {
            guard_reset_delay: 0.0,
            ..SliceConfig::default()
        });
        assert!(instant.on_collision(&mut world, &hit(log, 8.0)).is_sliced());
        assert_eq!(instant.guard(), SliceGuard::Idle);
    }
}
