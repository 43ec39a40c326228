//! Two-handed axe grip
//!
//! Each hand is a [`HandAttachment`] cycling `Resting -> Engaged -> Returning
//! -> Resting`. [`AxeGrip`] owns both hands, creates and destroys the fixed
//! joints binding them to the axe body, and derives the axe's
//! [`ConstraintMode`]: stabilized exactly while both hands are engaged.

use serde::{Serialize, Deserialize};
use woodcut_math::{Axis, Vec3};
use woodcut_physics::{BodyKey, BodyLocks, FixedJoint, JointKey};

use crate::presentation::CursorPresenter;
use crate::world::{EntityKey, World};

/// One of the two simulated hands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const BOTH: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn name(self) -> &'static str {
        match self {
            Hand::Left => "left hand",
            Hand::Right => "right hand",
        }
    }
}

/// Engagement state of one hand
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HandState {
    /// Disengaged and at (or following input near) its rest pose
    #[default]
    Resting,
    /// Jointed to the axe
    Engaged,
    /// Disengaged and easing back toward the rest pose
    Returning,
}

/// Rotational constraint applied to the axe body
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConstraintMode {
    /// No rotational lock
    #[default]
    Free,
    /// Rotation locked about the two axes other than the swing axis
    Stabilized,
}

/// Grip tuning
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GripConfig {
    /// A hand can engage only closer than this to its grab point
    pub engage_distance: f32,
    /// Rate of the eased return to rest
    pub return_speed: f32,
    /// The return ends once a hand is this close to rest
    pub rest_tolerance: f32,
    /// Left grab point in axe space
    pub left_grab_point: Vec3,
    /// Right grab point in axe space
    pub right_grab_point: Vec3,
    /// Axis left free while stabilized
    pub swing_axis: Axis,
}

impl Default for GripConfig {
    fn default() -> Self {
        Self {
            engage_distance: 0.5,
            return_speed: 5.0,
            rest_tolerance: 0.1,
            left_grab_point: Vec3::new(0.0, -0.3, 0.0),
            right_grab_point: Vec3::new(0.0, 0.1, 0.0),
            swing_axis: Axis::Y,
        }
    }
}

impl GripConfig {
    pub fn grab_point(&self, hand: Hand) -> Vec3 {
        match hand {
            Hand::Left => self.left_grab_point,
            Hand::Right => self.right_grab_point,
        }
    }
}

/// Grab/release edges and hand targets for one tick
///
/// The left hand is bound to the secondary mouse button and the right hand to
/// the primary one; the input layer maps buttons onto these fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct GripInput {
    pub left_pressed: bool,
    pub left_released: bool,
    pub right_pressed: bool,
    pub right_released: bool,
    /// Where the player is steering the left hand
    pub left_target: Option<Vec3>,
    /// Where the player is steering the right hand
    pub right_target: Option<Vec3>,
}

impl GripInput {
    pub fn pressed(&self, hand: Hand) -> bool {
        match hand {
            Hand::Left => self.left_pressed,
            Hand::Right => self.right_pressed,
        }
    }

    pub fn released(&self, hand: Hand) -> bool {
        match hand {
            Hand::Left => self.left_released,
            Hand::Right => self.right_released,
        }
    }

    pub fn target(&self, hand: Hand) -> Option<Vec3> {
        match hand {
            Hand::Left => self.left_target,
            Hand::Right => self.right_target,
        }
    }
}

/// One hand: its anchor position, rest pose, state and joint
#[derive(Clone, Debug)]
pub struct HandAttachment {
    hand: Hand,
    position: Vec3,
    rest_position: Vec3,
    state: HandState,
    joint: Option<JointKey>,
}

impl HandAttachment {
    /// A resting hand at its rest pose
    pub fn new(hand: Hand, rest_position: Vec3) -> Self {
        Self {
            hand,
            position: rest_position,
            rest_position,
            state: HandState::Resting,
            joint: None,
        }
    }

    #[inline]
    pub fn hand(&self) -> Hand {
        self.hand
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn rest_position(&self) -> Vec3 {
        self.rest_position
    }

    #[inline]
    pub fn state(&self) -> HandState {
        self.state
    }

    #[inline]
    pub fn is_engaged(&self) -> bool {
        self.state == HandState::Engaged
    }

    #[inline]
    pub fn joint(&self) -> Option<JointKey> {
        self.joint
    }

    /// Move the rest pose (it follows the player)
    pub fn set_rest_position(&mut self, rest: Vec3) {
        self.rest_position = rest;
    }

    /// Steer the hand; returning hands ignore steering
    pub fn follow(&mut self, target: Vec3) {
        if self.state != HandState::Returning {
            self.position = target;
        }
    }

    fn attach(&mut self, joint: JointKey) {
        self.joint = Some(joint);
        self.state = HandState::Engaged;
    }

    fn detach(&mut self) -> Option<JointKey> {
        self.state = HandState::Returning;
        self.joint.take()
    }

    /// Advance the eased return by `dt`
    ///
    /// Exponential approach: each tick closes `dt * speed` of the remaining
    /// gap. Ends, without snapping, once within `tolerance` of rest.
    pub fn ease_toward_rest(&mut self, dt: f32, speed: f32, tolerance: f32) {
        if self.state != HandState::Returning {
            return;
        }
        if self.position.distance(self.rest_position) <= tolerance {
            self.state = HandState::Resting;
            log::debug!("{} returned to rest", self.hand.name());
            return;
        }
        let t = (dt * speed).clamp(0.0, 1.0);
        self.position = self.position.lerp(self.rest_position, t);
        if self.position.distance(self.rest_position) <= tolerance {
            self.state = HandState::Resting;
            log::debug!("{} returned to rest", self.hand.name());
        }
    }
}

/// The two-handed grip on the axe
#[derive(Clone, Debug)]
pub struct AxeGrip {
    config: GripConfig,
    axe: EntityKey,
    left: HandAttachment,
    right: HandAttachment,
    mode: ConstraintMode,
    /// The axe still sits where the scene placed it, fully locked
    placed: bool,
}

impl AxeGrip {
    /// Grip on a placed axe with both hands at rest
    pub fn new(config: GripConfig, axe: EntityKey, left_rest: Vec3, right_rest: Vec3) -> Self {
        Self {
            config,
            axe,
            left: HandAttachment::new(Hand::Left, left_rest),
            right: HandAttachment::new(Hand::Right, right_rest),
            mode: ConstraintMode::Free,
            placed: true,
        }
    }

    #[inline]
    pub fn config(&self) -> &GripConfig {
        &self.config
    }

    #[inline]
    pub fn axe(&self) -> EntityKey {
        self.axe
    }

    pub fn hand(&self, hand: Hand) -> &HandAttachment {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    fn hand_mut(&mut self, hand: Hand) -> &mut HandAttachment {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    #[inline]
    pub fn mode(&self) -> ConstraintMode {
        self.mode
    }

    /// Whether the placement constraint is still in force
    #[inline]
    pub fn is_placed(&self) -> bool {
        self.placed
    }

    /// At least one hand holds the axe
    pub fn is_holding(&self) -> bool {
        self.left.is_engaged() || self.right.is_engaged()
    }

    pub fn both_engaged(&self) -> bool {
        self.left.is_engaged() && self.right.is_engaged()
    }

    /// Move both rest poses
    pub fn set_rest_positions(&mut self, left: Vec3, right: Vec3) {
        self.left.set_rest_position(left);
        self.right.set_rest_position(right);
    }

    fn axe_body(&self, world: &World) -> Option<BodyKey> {
        let key = world.get_entity(self.axe)?.physics_body?;
        world.physics().get_body(key).map(|_| key)
    }

    /// World position of a hand's grab point on the axe
    pub fn grab_point_world(&self, world: &World, hand: Hand) -> Option<Vec3> {
        let body = world.physics().get_body(self.axe_body(world)?)?;
        Some(body.world_point(self.config.grab_point(hand)))
    }

    /// Run one tick of the grip
    ///
    /// Hands follow their targets, pressed hands try to engage, released
    /// hands disengage, returning hands ease toward rest, and the constraint
    /// mode is re-derived.
    pub fn update(
        &mut self,
        world: &mut World,
        input: &GripInput,
        dt: f32,
        presenter: &mut dyn CursorPresenter,
    ) {
        for hand in Hand::BOTH {
            if let Some(target) = input.target(hand) {
                self.hand_mut(hand).follow(target);
            }
        }

        if self.axe_body(world).is_none() {
            log::warn!("Axe body is missing; skipping grip update");
        } else {
            for hand in Hand::BOTH {
                if input.pressed(hand) {
                    self.engage(world, hand, presenter);
                }
            }
            self.apply_mode(world);

            for hand in Hand::BOTH {
                if input.released(hand) {
                    self.disengage(world, hand, presenter);
                }
            }
            self.sync_joint_targets(world);
        }

        let (speed, tolerance) = (self.config.return_speed, self.config.rest_tolerance);
        self.left.ease_toward_rest(dt, speed, tolerance);
        self.right.ease_toward_rest(dt, speed, tolerance);
    }

    /// Attach a hand to its grab point
    ///
    /// Succeeds only if the hand is not engaged and is closer than
    /// `engage_distance` to its grab point. The first engagement clears the
    /// placement constraint.
    pub fn engage(&mut self, world: &mut World, hand: Hand, presenter: &mut dyn CursorPresenter) -> bool {
        if self.hand(hand).is_engaged() {
            return false;
        }
        let Some(body_key) = self.axe_body(world) else {
            log::error!("Cannot engage {}: axe body is missing", hand.name());
            return false;
        };
        let Some(grab_point) = self.grab_point_world(world, hand) else {
            return false;
        };
        let position = self.hand(hand).position();
        let distance = position.distance(grab_point);
        if distance >= self.config.engage_distance {
            log::debug!("{} too far from its grab point ({:.2})", hand.name(), distance);
            return false;
        }

        let anchor = self.config.grab_point(hand);
        let Some(joint) = world
            .physics_mut()
            .add_joint(FixedJoint::new(body_key, anchor, position))
        else {
            log::error!("Failed to create joint for {}", hand.name());
            return false;
        };
        self.hand_mut(hand).attach(joint);

        if self.placed {
            if let Some(body) = world.physics_mut().get_body_mut(body_key) {
                body.locks = BodyLocks::empty();
            }
            self.placed = false;
            log::info!("Axe picked up");
        }

        log::info!("{} engaged", hand.name());
        presenter.set_hand_attached(hand, true);
        self.apply_mode(world);
        true
    }

    /// Detach a hand and start its return to rest
    pub fn disengage(&mut self, world: &mut World, hand: Hand, presenter: &mut dyn CursorPresenter) -> bool {
        if !self.hand(hand).is_engaged() {
            return false;
        }
        match self.hand_mut(hand).detach() {
            Some(joint) => {
                if world.physics_mut().remove_joint(joint).is_none() {
                    log::warn!("Joint for {} was already gone", hand.name());
                }
            }
            None => log::warn!("{} was engaged without a joint", hand.name()),
        }

        log::info!("{} disengaged", hand.name());
        presenter.set_hand_attached(hand, false);
        self.apply_mode(world);
        true
    }

    /// Disengage every engaged hand; returns how many were released
    pub fn release_all(&mut self, world: &mut World, presenter: &mut dyn CursorPresenter) -> usize {
        let mut released = 0;
        for hand in Hand::BOTH {
            if self.disengage(world, hand, presenter) {
                released += 1;
            }
        }
        released
    }

    /// Recompute the constraint mode and push it to the axe body
    fn apply_mode(&mut self, world: &mut World) {
        self.mode = if self.both_engaged() {
            ConstraintMode::Stabilized
        } else {
            ConstraintMode::Free
        };

        if self.placed {
            return;
        }
        let locks = match self.mode {
            ConstraintMode::Stabilized => BodyLocks::rotation_except(self.config.swing_axis),
            ConstraintMode::Free => BodyLocks::empty(),
        };
        if let Some(body) = world.body_of_mut(self.axe) {
            body.locks = locks;
        }
    }

    fn sync_joint_targets(&self, world: &mut World) {
        for attachment in [&self.left, &self.right] {
            if let Some(joint) = attachment.joint() {
                world.physics_mut().set_joint_target(joint, attachment.position());
            }
        }
    }
}
