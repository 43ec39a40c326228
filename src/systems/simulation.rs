//! Game simulation system
//!
//! Turns accumulated input into one session tick:
//! - Delta time calculation
//! - Player walking, jumping and crouching
//! - Viewpoint and hand targets from the camera and crosshair
//! - Session tick (grip, physics, impacts, slicing)
//! - Camera rotation from the crosshair view delta

use std::time::Instant;

use woodcut_core::{ChopSession, PlayerBody, TickReport, Vec3, Viewpoint};

use crate::config::{HandsConfig, PlayerConfig};
use crate::input::{InputState, PlayerController};

/// Spacing between the hands across the handle
const HAND_SPACING: f32 = 0.3;

/// First-person yaw/pitch camera standing on the player position
#[derive(Debug, Clone, Copy)]
pub struct ViewCamera {
    /// Player feet
    pub position: Vec3,
    pub eye_height: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub pitch_limit: f32,
}

impl ViewCamera {
    pub fn new(position: Vec3, eye_height: f32) -> Self {
        Self {
            position,
            eye_height,
            yaw: 0.0,
            pitch: 0.0,
            pitch_limit: 89f32.to_radians(),
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::Y * self.eye_height
    }

    /// View direction; yaw 0 looks down -Z, positive yaw turns right
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(sy * cp, sp, -cy * cp)
    }

    /// Horizontal forward vector
    pub fn flat_forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(sy, 0.0, -cy)
    }

    /// Horizontal right vector
    pub fn right(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(cy, 0.0, sy)
    }

    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.yaw += yaw;
        self.pitch = (self.pitch + pitch).clamp(-self.pitch_limit, self.pitch_limit);
    }

    pub fn viewpoint(&self) -> Viewpoint {
        Viewpoint::new(self.eye(), self.forward())
    }
}

/// Manages the game simulation loop
pub struct SimulationSystem {
    last_frame: Instant,
    camera: ViewCamera,
    player: PlayerBody,
    /// Floor used when the scene has none: the spawn height
    spawn_floor: f32,
    hands: HandsConfig,
    movement: PlayerConfig,
    mouse_scale: f32,
}

impl SimulationSystem {
    pub fn new(player: Vec3, hands: HandsConfig, movement: PlayerConfig, mouse_scale: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            camera: ViewCamera::new(player, hands.eye_height),
            player: PlayerBody::new(player).with_jump_height(movement.jump_height, movement.gravity),
            spawn_floor: player.y,
            hands,
            movement,
            mouse_scale,
        }
    }

    #[inline]
    pub fn camera(&self) -> &ViewCamera {
        &self.camera
    }

    #[inline]
    pub fn player(&self) -> &PlayerBody {
        &self.player
    }

    /// Where the hands are steered for a crosshair offset
    ///
    /// Both hands sit `reach` in front of the eye; the crosshair's vertical
    /// offset raises or lowers them. The right hand rides higher on the handle.
    pub fn hand_targets(&self, crosshair: [f32; 2]) -> [Vec3; 2] {
        let right = self.camera.right();
        let center = self.camera.eye()
            + self.camera.forward() * self.hands.reach
            + right * (crosshair[0] * self.hands.lift)
            + Vec3::Y * (-crosshair[1] * self.hands.lift);
        let left_target = center - right * (HAND_SPACING * 0.5);
        let right_target = center + right * (HAND_SPACING * 0.5) + Vec3::Y * 0.4;
        [left_target, right_target]
    }

    /// Walk, jump and crouch for one frame
    fn move_player(&mut self, controller: &mut PlayerController, floor_y: f32, dt: f32) {
        let (forward, right) = controller.movement_input();
        let mut direction = self.camera.flat_forward() * forward + self.camera.right() * right;
        if direction.length() > 1.0 {
            direction = direction.normalized();
        }
        let speed = if controller.is_crouching() {
            self.movement.crouch_speed
        } else {
            self.movement.move_speed
        };
        self.player.apply_movement(direction * speed);
        if controller.consume_jump() {
            self.player.jump();
        }
        self.player.step(dt, self.movement.gravity, floor_y);

        let eye_target = if controller.is_crouching() {
            self.movement.crouch_eye_height
        } else {
            self.hands.eye_height
        };
        let blend = (self.movement.crouch_transition_speed * dt).min(1.0);
        self.camera.eye_height += (eye_target - self.camera.eye_height) * blend;
    }

    /// Run one frame with wall-clock delta time
    pub fn update(
        &mut self,
        session: &mut ChopSession,
        input: &mut InputState,
        controller: &mut PlayerController,
    ) -> TickReport {
        let now = Instant::now();
        // Cap dt so a stall (first frame, window focus) cannot fling the axe
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        self.step(session, input, controller, dt)
    }

    /// Run one frame with an explicit delta time
    pub fn step(
        &mut self,
        session: &mut ChopSession,
        input: &mut InputState,
        controller: &mut PlayerController,
        dt: f32,
    ) -> TickReport {
        if session.is_paused() {
            controller.consume_jump();
        } else {
            let floor_y = session.world().physics().floor_height().unwrap_or(self.spawn_floor);
            self.move_player(controller, floor_y, dt);
        }
        self.camera.position = self.player.position;
        let targets = self.hand_targets(session.presentation().crosshair());
        let frame = input.take_frame(self.mouse_scale, self.camera.viewpoint(), targets, self.camera.position);

        let report = session.tick(&frame, dt);
        if let Some((yaw, pitch)) = report.view_delta {
            self.camera.rotate(yaw, pitch);
        }
        report
    }
}
