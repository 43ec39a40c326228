//! Transient visual effects seam

use woodcut_math::Vec3;

/// Spawns short-lived effects in whatever draws the world
pub trait EffectSpawner {
    /// Wood chips at `point`, removed after `lifetime` seconds
    fn spawn_chop_effect(&mut self, point: Vec3, lifetime: f32);
}

/// Spawner that drops everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEffects;

impl EffectSpawner for NullEffects {
    fn spawn_chop_effect(&mut self, _point: Vec3, _lifetime: f32) {}
}
