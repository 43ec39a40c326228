//! The per-tick driver tying the woodcutting systems together
//!
//! [`ChopSession::tick`] is the single entry point. Each tick it:
//!
//! 1. Applies presentation toggles (aim mode, pause) and the failsafe reset
//! 2. Maps real frame time to simulation time through the [`SimClock`]
//! 3. Advances the impact cooldown (real time) and slicer settle delay (sim time)
//! 4. Probes what the player looks at
//! 5. Runs the grip, then steps physics
//! 6. Routes axe-vs-wood collisions through the impact gate and the slicer
//! 7. Updates the wood counter and the axe respawn watchdog

use serde::{Serialize, Deserialize};
use woodcut_math::{Aabb, Vec3};
use woodcut_physics::CollisionEvent;

use crate::audio::{AudioChannel, AudioSink, NullAudio, VolumeSettings};
use crate::counter::WoodCounter;
use crate::effects::{EffectSpawner, NullEffects};
use crate::entity::{Entity, AXE_TAG};
use crate::grip::{AxeGrip, GripConfig, GripInput};
use crate::impact::{ImpactConfig, ImpactGate, ImpactResponse};
use crate::interaction::{InteractionConfig, InteractionDetector, InteractionReport, Viewpoint};
use crate::presentation::PresentationController;
use crate::respawn::{AxeRespawnWatchdog, RespawnConfig};
use crate::scene::Scene;
use crate::slicer::{SliceConfig, SliceEvent, SliceOutcome, Slicer};
use crate::timer::SimClock;
use crate::world::{EntityKey, World};

/// Tuning for every system in a session
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub grip: GripConfig,
    pub interaction: InteractionConfig,
    pub impact: ImpactConfig,
    pub slicing: SliceConfig,
    pub respawn: RespawnConfig,
    /// Left hand rest pose relative to the player
    pub left_hand_rest: Vec3,
    /// Right hand rest pose relative to the player
    pub right_hand_rest: Vec3,
    /// Seconds the aim-mode alert stays up
    pub alert_duration: f32,
    pub crosshair_sensitivity: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grip: GripConfig::default(),
            interaction: InteractionConfig::default(),
            impact: ImpactConfig::default(),
            slicing: SliceConfig::default(),
            respawn: RespawnConfig::default(),
            left_hand_rest: Vec3::new(-0.25, 1.0, -0.6),
            right_hand_rest: Vec3::new(0.25, 1.2, -0.6),
            alert_duration: 2.0,
            crosshair_sensitivity: 2.0,
        }
    }
}

/// Everything the host feeds in for one tick
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub grip: GripInput,
    pub toggle_aim_mode: bool,
    pub toggle_pause: bool,
    pub failsafe_reset: bool,
    /// Camera pose for the interaction probe; no probe without one
    pub viewpoint: Option<Viewpoint>,
    /// Mouse delta for the crosshair
    pub look_delta: Option<(f32, f32)>,
    /// New player position, moves the hand rest poses
    pub player_position: Option<Vec3>,
}

/// What one axe-vs-wood collision did
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChopReport {
    pub target: EntityKey,
    pub impact: Option<ImpactResponse>,
    pub slice: SliceOutcome,
}

/// What happened during one tick
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    /// Simulation step taken (0 while paused or in hit-stop)
    pub sim_dt: f32,
    pub paused: bool,
    pub interaction: InteractionReport,
    /// View rotation the camera should apply (crosshair mode)
    pub view_delta: Option<(f32, f32)>,
    pub chops: Vec<ChopReport>,
    pub axe_respawned: bool,
    /// Hands released by a failsafe reset
    pub hands_released: usize,
}

impl TickReport {
    pub fn impacts(&self) -> impl Iterator<Item = &ImpactResponse> {
        self.chops.iter().filter_map(|c| c.impact.as_ref())
    }

    pub fn slices(&self) -> impl Iterator<Item = &SliceOutcome> {
        self.chops.iter().map(|c| &c.slice)
    }
}

/// Error building a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The scene has no entity tagged as the axe
    NoAxe,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NoAxe => write!(f, "scene contains no entity tagged '{}'", AXE_TAG),
        }
    }
}

impl std::error::Error for SessionError {}

/// One player chopping wood with one axe
pub struct ChopSession {
    world: World,
    axe: EntityKey,
    player: Vec3,
    config: SessionConfig,
    grip: AxeGrip,
    detector: InteractionDetector,
    gate: ImpactGate,
    slicer: Slicer,
    presentation: PresentationController,
    counter: Option<WoodCounter>,
    watchdog: AxeRespawnWatchdog,
    clock: SimClock,
    volumes: VolumeSettings,
    audio: Box<dyn AudioSink>,
    effects: Box<dyn EffectSpawner>,
}

impl ChopSession {
    pub fn new(world: World, axe: EntityKey, player: Vec3, config: SessionConfig) -> Self {
        let grip = AxeGrip::new(
            config.grip.clone(),
            axe,
            player + config.left_hand_rest,
            player + config.right_hand_rest,
        );
        Self {
            world,
            axe,
            player,
            grip,
            detector: InteractionDetector::new(config.interaction.clone()),
            gate: ImpactGate::new(config.impact.clone()),
            slicer: Slicer::new(config.slicing.clone()),
            presentation: PresentationController::new(config.alert_duration, config.crosshair_sensitivity),
            counter: None,
            watchdog: AxeRespawnWatchdog::new(config.respawn.clone()),
            clock: SimClock::new(),
            volumes: VolumeSettings::default(),
            audio: Box::new(NullAudio),
            effects: Box::new(NullEffects),
            config,
        }
    }

    /// Instantiate a scene and pick up its axe, player spawn and wood zone
    pub fn from_scene(scene: &Scene, config: SessionConfig) -> Result<Self, SessionError> {
        let world = scene.instantiate();
        let axe = world.tagged(AXE_TAG).first().copied().ok_or(SessionError::NoAxe)?;
        let player = scene.player_spawn.unwrap_or(Vec3::ZERO);
        let mut session = Self::new(world, axe, player, config);
        if let Some(zone) = scene.wood_zone {
            session = session.with_wood_zone(zone);
        }
        Ok(session)
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = audio;
        self.volumes.apply(self.audio.as_mut());
        self
    }

    pub fn with_effects(mut self, effects: Box<dyn EffectSpawner>) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_wood_zone(mut self, zone: Aabb) -> Self {
        self.counter = Some(WoodCounter::new(zone));
        self
    }

    /// Deterministic chop pitch jitter
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.gate = ImpactGate::with_seed(self.config.impact.clone(), seed);
        self
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[inline]
    pub fn axe(&self) -> EntityKey {
        self.axe
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    pub fn grip(&self) -> &AxeGrip {
        &self.grip
    }

    #[inline]
    pub fn gate(&self) -> &ImpactGate {
        &self.gate
    }

    #[inline]
    pub fn slicer(&self) -> &Slicer {
        &self.slicer
    }

    #[inline]
    pub fn presentation(&self) -> &PresentationController {
        &self.presentation
    }

    #[inline]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    #[inline]
    pub fn player_position(&self) -> Vec3 {
        self.player
    }

    /// Wood pieces in the collection zone, `None` without a zone
    pub fn wood_collected(&self) -> Option<usize> {
        self.counter.as_ref().map(WoodCounter::count)
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn pause(&mut self) {
        self.clock.pause();
        log::info!("Game paused");
    }

    pub fn resume(&mut self) {
        self.clock.resume();
        log::info!("Game resumed");
    }

    #[inline]
    pub fn volumes(&self) -> VolumeSettings {
        self.volumes
    }

    /// Replace all volume levels and push them to the audio sink
    pub fn set_volumes(&mut self, volumes: VolumeSettings) {
        self.volumes = volumes;
        self.volumes.apply(self.audio.as_mut());
    }

    pub fn set_volume(&mut self, channel: AudioChannel, volume: f32) {
        self.volumes.set(channel, volume);
        self.audio.set_volume(channel, self.volumes.get(channel));
    }

    /// Move the player; the hand rest poses follow
    pub fn set_player_position(&mut self, player: Vec3) {
        self.player = player;
        self.grip.set_rest_positions(
            player + self.config.left_hand_rest,
            player + self.config.right_hand_rest,
        );
    }

    /// Release both hands and clear the slicer guard and impact cooldown
    ///
    /// Safe to call at any time; with nothing held it only clears the guards.
    pub fn failsafe_reset(&mut self) -> usize {
        let released = self.grip.release_all(&mut self.world, &mut self.presentation);
        self.slicer.reset();
        self.gate.reset();
        log::info!("Failsafe reset ({} hand(s) released)", released);
        released
    }

    /// Run one frame
    pub fn tick(&mut self, input: &FrameInput, real_dt: f32) -> TickReport {
        let mut report = TickReport::default();

        if input.toggle_aim_mode {
            self.presentation.toggle_aim_mode();
        }
        if input.toggle_pause {
            if self.clock.is_paused() {
                self.resume();
            } else {
                self.pause();
            }
        }
        self.presentation.update(real_dt);
        if let Some((dx, dy)) = input.look_delta {
            report.view_delta = self.presentation.move_crosshair(dx, dy);
        }
        if input.failsafe_reset {
            report.hands_released = self.failsafe_reset();
        }

        let sim_dt = self.clock.advance(real_dt);
        report.sim_dt = sim_dt;
        if self.clock.is_paused() {
            report.paused = true;
            return report;
        }

        self.gate.tick(real_dt);
        self.slicer.tick(sim_dt);

        if let Some(player) = input.player_position {
            self.set_player_position(player);
        }
        if let Some(view) = input.viewpoint {
            report.interaction = self.detector.update(
                &self.world,
                &view,
                self.axe,
                self.grip.is_holding(),
                &mut self.presentation,
            );
            if report.interaction.new_wood_target && self.detector.config().reset_gate_on_new_target {
                self.gate.reset();
            }
        }

        self.grip.update(&mut self.world, &input.grip, sim_dt, &mut self.presentation);
        self.world.update(sim_dt);

        for event in self.world.physics_mut().drain_events() {
            if let Some(chop) = self.handle_collision(&event) {
                report.chops.push(chop);
            }
        }

        if let Some(counter) = self.counter.as_mut() {
            counter.update(&self.world);
        }
        report.axe_respawned = self.watchdog.update(&mut self.world, self.axe, self.player);
        report
    }

    /// Route one collision-enter event
    ///
    /// Only collisions between this session's axe and a wood entity produce a
    /// report. The impact gate and the slicer judge the hit independently.
    pub fn handle_collision(&mut self, event: &CollisionEvent) -> Option<ChopReport> {
        let axe_body = self.world.get_entity(self.axe)?.physics_body?;
        let other = event.other(axe_body)?;
        let Some(target) = self.world.entity_for_body(other) else {
            log::warn!("Axe hit body {:?} with no entity", other);
            return None;
        };
        if !self.world.get_entity(target).map_or(false, Entity::is_wood) {
            return None;
        }

        let impact = self.gate.evaluate(self.grip.is_holding(), true, event.point);
        if let Some(ref response) = impact {
            self.play_impact(response);
        }

        let swing_dot = self
            .world
            .body_of(self.axe)
            .map_or(-1.0, |body| body.up().dot(Vec3::NEG_Y));
        let slice_event = SliceEvent {
            target,
            contact_point: event.point,
            relative_speed: event.relative_speed(),
            swing_dot,
        };
        let slice = self.slicer.on_collision(&mut self.world, &slice_event);

        Some(ChopReport { target, impact, slice })
    }

    fn play_impact(&mut self, response: &ImpactResponse) {
        self.audio.play_chop(response.pitch);
        self.effects.spawn_chop_effect(response.effect_point, response.effect_lifetime);
        if let Some(duration) = response.hit_stop {
            self.clock.start_hit_stop(duration);
        }
    }
}
