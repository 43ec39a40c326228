//! Session-level chopping scenarios

use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::Rc;

use woodcut_core::{
    AudioChannel, AudioSink, ChopSession, CollisionEvent, EffectSpawner, EntityKey, EntityKind, EntityTemplate,
    FrameInput, GripInput, Hand, ImpactGateState, Quat, Scene, SessionConfig, SliceOutcome, SliceRejection,
    Transform, Vec3, Viewpoint, WOOD_TAG,
};

#[derive(Default)]
struct Recorded {
    chops: Vec<f32>,
    effects: Vec<(Vec3, f32)>,
    volumes: Vec<(AudioChannel, f32)>,
}

struct Sink(Rc<RefCell<Recorded>>);

impl AudioSink for Sink {
    fn play_chop(&mut self, pitch: f32) {
        self.0.borrow_mut().chops.push(pitch);
    }

    fn set_volume(&mut self, channel: AudioChannel, volume: f32) {
        self.0.borrow_mut().volumes.push((channel, volume));
    }
}

impl EffectSpawner for Sink {
    fn spawn_chop_effect(&mut self, point: Vec3, lifetime: f32) {
        self.0.borrow_mut().effects.push((point, lifetime));
    }
}

const DT: f32 = 1.0 / 60.0;
const LOG_POS: Vec3 = Vec3::new(0.0, 0.5, -1.0);
const AXE_POS: Vec3 = Vec3::new(1.0, 1.0, -1.0);

fn yard() -> Scene {
    let mut scene = Scene::new("yard")
        .with_gravity(0.0)
        .with_player_spawn(Vec3::new(0.0, 0.0, 1.0));
    scene.add_entity(
        EntityTemplate::new(EntityKind::Wood, Transform::from_position(LOG_POS), Vec3::new(0.15, 0.5, 0.15))
            .with_name("log")
            .placed(),
    );
    scene.add_entity(
        EntityTemplate::new(EntityKind::Axe, Transform::from_position(AXE_POS), Vec3::new(0.05, 0.4, 0.05))
            .with_name("axe")
            .placed(),
    );
    scene
}

fn session_with(config: SessionConfig) -> (ChopSession, Rc<RefCell<Recorded>>) {
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    let session = ChopSession::from_scene(&yard(), config)
        .unwrap()
        .with_seed(3)
        .with_audio(Box::new(Sink(Rc::clone(&recorded))))
        .with_effects(Box::new(Sink(Rc::clone(&recorded))));
    (session, recorded)
}

fn session() -> (ChopSession, Rc<RefCell<Recorded>>) {
    session_with(SessionConfig::default())
}

fn log_key(session: &ChopSession) -> EntityKey {
    session.world().find_by_name("log").unwrap()
}

/// Steer both hands onto their grab points and press both buttons
fn grab_with_both_hands(session: &mut ChopSession) {
    let world = session.world();
    let input = FrameInput {
        grip: GripInput {
            left_pressed: true,
            right_pressed: true,
            left_target: session.grip().grab_point_world(world, Hand::Left),
            right_target: session.grip().grab_point_world(world, Hand::Right),
            ..GripInput::default()
        },
        ..FrameInput::default()
    };
    session.tick(&input, DT);
    assert!(session.grip().both_engaged());
}

/// Rotate the axe about X so its up axis has the given dot with world down
fn tilt_axe(session: &mut ChopSession, swing_dot: f32) {
    let axe = session.axe();
    let angle = (-swing_dot).acos();
    session.world_mut().body_of_mut(axe).unwrap().rotation = Quat::from_axis_angle(Vec3::X, angle);
}

fn strike(session: &ChopSession, target: EntityKey, speed: f32) -> CollisionEvent {
    let world = session.world();
    CollisionEvent {
        body_a: world.get_entity(session.axe()).unwrap().physics_body.unwrap(),
        body_b: world.get_entity(target).unwrap().physics_body.unwrap(),
        point: LOG_POS + Vec3::new(0.0, 0.5, 0.0),
        normal: Vec3::Y,
        relative_velocity: Vec3::new(0.0, -speed, 0.0),
    }
}

#[test]
fn test_fast_downward_chop_splits_log_upward_normal() {
    let (mut session, recorded) = session();
    let log = log_key(&session);
    grab_with_both_hands(&mut session);
    tilt_axe(&mut session, 0.8);

    let chop = session.handle_collision(&strike(&session, log, 8.0)).unwrap();
    let SliceOutcome::Sliced { original, pieces, plane } = chop.slice else {
        panic!("expected a slice, got {:?}", chop.slice);
    };
    assert_eq!(original, log);
    assert!((plane.normal - Vec3::Y).length() < 1e-6);
    assert!(!session.world().contains(log));
    assert_eq!(session.world().count_tagged(WOOD_TAG), 2);
    for piece in pieces {
        assert!(session.world().get_entity(piece).unwrap().is_wood());
        assert!(session.world().body_of(piece).unwrap().is_dynamic());
    }

    let impact = chop.impact.expect("held axe on wood should play an impact");
    assert!((0.9..=1.1).contains(&impact.pitch));
    assert_eq!(recorded.borrow().chops, vec![impact.pitch]);
    assert_eq!(recorded.borrow().effects, vec![(impact.effect_point, 1.0)]);
    assert!(session.clock().hit_stop_active());
}

#[test]
fn test_slow_hit_plays_impact_but_never_cuts() {
    let (mut session, recorded) = session();
    let log = log_key(&session);
    grab_with_both_hands(&mut session);
    tilt_axe(&mut session, 0.8);

    let chop = session.handle_collision(&strike(&session, log, 2.0)).unwrap();
    assert_eq!(chop.slice, SliceOutcome::Rejected(SliceRejection::TooSlow));
    assert!(chop.impact.is_some());
    assert!(session.world().contains(log));
    assert_eq!(session.world().count_tagged(WOOD_TAG), 1);
    assert_eq!(recorded.borrow().chops.len(), 1);
}

#[test]
fn test_undersized_pieces_are_both_discarded() {
    let mut config = SessionConfig::default();
    config.slicing.min_fragment_size = 0.7;
    let (mut session, _) = session_with(config);
    let log = log_key(&session);
    grab_with_both_hands(&mut session);
    tilt_axe(&mut session, 0.8);

    let chop = session.handle_collision(&strike(&session, log, 8.0)).unwrap();
    assert_eq!(chop.slice, SliceOutcome::Discarded { original: log });
    assert_eq!(session.world().count_tagged(WOOD_TAG), 0);
}

#[test]
fn test_gate_fires_once_per_cooldown_window() {
    let (mut session, recorded) = session();
    let log = log_key(&session);
    grab_with_both_hands(&mut session);

    // 0.3 s of repeated contact
    let mut fired = 0;
    for _ in 0..30 {
        let chop = session.handle_collision(&strike(&session, log, 2.0)).unwrap();
        fired += chop.impact.is_some() as usize;
        session.tick(&FrameInput::default(), 0.01);
    }
    assert_eq!(fired, 1);
    assert_eq!(recorded.borrow().chops.len(), 1);

    for _ in 0..25 {
        session.tick(&FrameInput::default(), 0.01);
    }
    assert_eq!(session.gate().state(), ImpactGateState::Ready);
    assert!(session.handle_collision(&strike(&session, log, 2.0)).unwrap().impact.is_some());
}

#[test]
fn test_unheld_axe_makes_no_impact() {
    let (mut session, recorded) = session();
    let log = log_key(&session);
    let chop = session.handle_collision(&strike(&session, log, 8.0)).unwrap();
    assert!(chop.impact.is_none());
    assert!(recorded.borrow().chops.is_empty());
}

#[test]
fn test_failsafe_with_nothing_held_only_clears_guards() {
    let (mut session, _) = session();
    let released = session.failsafe_reset();
    assert_eq!(released, 0);
    assert!(session.grip().is_placed());
    assert_eq!(session.world().physics().joint_count(), 0);
    assert!(session.slicer().is_idle());
    assert!(!session.gate().is_cooling());
}

#[test]
fn test_failsafe_after_chop_releases_everything() {
    let (mut session, _) = session();
    let log = log_key(&session);
    grab_with_both_hands(&mut session);
    tilt_axe(&mut session, 0.8);
    session.handle_collision(&strike(&session, log, 8.0));
    assert!(!session.slicer().is_idle());
    assert!(session.gate().is_cooling());

    let report = session.tick(
        &FrameInput {
            failsafe_reset: true,
            ..FrameInput::default()
        },
        DT,
    );
    assert_eq!(report.hands_released, 2);
    assert!(!session.grip().is_holding());
    assert_eq!(session.world().physics().joint_count(), 0);
    assert!(session.slicer().is_idle());
    assert!(!session.gate().is_cooling());

    // Idempotent
    assert_eq!(session.failsafe_reset(), 0);
}

#[test]
fn test_paused_session_advances_nothing() {
    let (mut session, _) = session();
    let report = session.tick(
        &FrameInput {
            toggle_pause: true,
            ..FrameInput::default()
        },
        DT,
    );
    assert!(report.paused);
    assert_eq!(report.sim_dt, 0.0);

    let world = session.world();
    let input = FrameInput {
        grip: GripInput {
            right_pressed: true,
            right_target: session.grip().grab_point_world(world, Hand::Right),
            ..GripInput::default()
        },
        ..FrameInput::default()
    };
    session.tick(&input, DT);
    assert!(!session.grip().is_holding());

    let resume = FrameInput {
        toggle_pause: true,
        ..input
    };
    let report = session.tick(&resume, DT);
    assert!(!report.paused);
    assert!(session.grip().hand(Hand::Right).is_engaged());
}

#[test]
fn test_new_wood_target_resets_gate() {
    let (mut session, _) = session();
    let log = log_key(&session);
    grab_with_both_hands(&mut session);
    session.handle_collision(&strike(&session, log, 2.0));
    assert!(session.gate().is_cooling());

    let eye = Vec3::new(0.0, 0.5, 1.0);
    let look = FrameInput {
        viewpoint: Some(Viewpoint::new(eye, LOG_POS - eye)),
        ..FrameInput::default()
    };
    let report = session.tick(&look, 0.01);
    assert!(report.interaction.new_wood_target);
    assert!(!session.gate().is_cooling());
    assert!(session.presentation().looking_at_interactable());
}

#[test]
fn test_same_log_behind_held_axe_keeps_gate_cooling() {
    let (mut session, recorded) = session();
    let log = log_key(&session);
    grab_with_both_hands(&mut session);

    let eye = Vec3::new(0.0, 0.5, 1.0);
    let look = FrameInput {
        viewpoint: Some(Viewpoint::new(eye, LOG_POS - eye)),
        ..FrameInput::default()
    };
    assert!(session.tick(&look, 0.01).interaction.new_wood_target);
    assert!(session.handle_collision(&strike(&session, log, 2.0)).unwrap().impact.is_some());
    assert!(session.gate().is_cooling());

    // Held axe between the eye and the log
    let axe = session.axe();
    session.world_mut().body_of_mut(axe).unwrap().position = Vec3::new(0.0, 0.5, 0.0);
    let report = session.tick(&look, 0.01);
    assert!(report.interaction.target.is_none());

    session.world_mut().body_of_mut(axe).unwrap().position = AXE_POS;
    let report = session.tick(&look, 0.01);
    assert_eq!(report.interaction.target, Some(woodcut_core::InteractionTarget::Wood(log)));
    assert!(!report.interaction.new_wood_target);
    assert!(session.gate().is_cooling());

    assert!(session.handle_collision(&strike(&session, log, 2.0)).unwrap().impact.is_none());
    assert_eq!(recorded.borrow().chops.len(), 1);
}

#[test]
fn test_gate_reset_on_new_target_can_be_disabled() {
    let mut config = SessionConfig::default();
    config.interaction.reset_gate_on_new_target = false;
    let (mut session, _) = session_with(config);
    let log = log_key(&session);
    grab_with_both_hands(&mut session);
    session.handle_collision(&strike(&session, log, 2.0));

    let eye = Vec3::new(0.0, 0.5, 1.0);
    let look = FrameInput {
        viewpoint: Some(Viewpoint::new(eye, LOG_POS - eye)),
        ..FrameInput::default()
    };
    assert!(session.tick(&look, 0.01).interaction.new_wood_target);
    assert!(session.gate().is_cooling());
}

#[test]
fn test_lost_axe_respawns_next_to_player() {
    let (mut session, _) = session();
    let axe = session.axe();
    session.world_mut().body_of_mut(axe).unwrap().position = Vec3::new(100.0, 0.0, 0.0);

    let report = session.tick(&FrameInput::default(), DT);
    assert!(report.axe_respawned);
    let body = session.world().body_of(axe).unwrap();
    assert_eq!(body.position, Vec3::new(0.0, 1.0, 1.0) + Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(body.velocity, Vec3::ZERO);
}

#[test]
fn test_volume_changes_reach_sink() {
    let (mut session, recorded) = session();
    // with_audio pushed the defaults
    assert_eq!(recorded.borrow().volumes.len(), 4);
    session.set_volume(AudioChannel::Sfx, 1.4);
    assert_eq!(recorded.borrow().volumes.last(), Some(&(AudioChannel::Sfx, 1.0)));
    assert_eq!(session.volumes().sfx, 1.0);
}

#[test]
fn test_swinging_held_axe_down_through_log() {
    let (mut session, _) = session();
    let log = log_key(&session);
    let axe = session.axe();

    // Head down, then bring it over the log
    {
        let body = session.world_mut().body_of_mut(axe).unwrap();
        body.rotation = Quat::from_axis_angle(Vec3::X, PI);
        body.position = Vec3::new(LOG_POS.x, 2.0, LOG_POS.z);
    }
    session.world_mut().sync_transforms();
    grab_with_both_hands(&mut session);

    let mut left = session.grip().hand(Hand::Left).position();
    let mut right = session.grip().hand(Hand::Right).position();
    let mut chops = Vec::new();
    for _ in 0..30 {
        // 0.15 per 1/60 s is 9 units/s
        left.y -= 0.15;
        right.y -= 0.15;
        let input = FrameInput {
            grip: GripInput {
                left_target: Some(left),
                right_target: Some(right),
                ..GripInput::default()
            },
            ..FrameInput::default()
        };
        chops.extend(session.tick(&input, DT).chops);
    }

    let first = chops.first().expect("axe should strike the log");
    assert_eq!(first.target, log);
    assert!(first.impact.is_some());
    assert!(first.slice.is_sliced());
    assert!(!session.world().contains(log));
}
