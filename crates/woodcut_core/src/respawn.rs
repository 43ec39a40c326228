//! Brings a lost axe back to the player

use serde::{Serialize, Deserialize};
use woodcut_math::Vec3;

use crate::world::{EntityKey, World};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RespawnConfig {
    /// Distance from the player beyond which the axe respawns
    pub max_distance: f32,
    /// Respawn point relative to the player
    pub respawn_offset: Vec3,
}

impl Default for RespawnConfig {
    fn default() -> Self {
        Self {
            max_distance: 30.0,
            respawn_offset: Vec3::new(0.0, 1.0, 1.0),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AxeRespawnWatchdog {
    config: RespawnConfig,
}

impl AxeRespawnWatchdog {
    pub fn new(config: RespawnConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &RespawnConfig {
        &self.config
    }

    /// Move the axe next to the player if it drifted too far
    ///
    /// Zeroes linear and angular velocity on respawn. Returns true if the axe
    /// was moved.
    pub fn update(&self, world: &mut World, axe: EntityKey, player: Vec3) -> bool {
        let Some(body) = world.body_of_mut(axe) else {
            log::warn!("Axe {:?} has no body; cannot check respawn", axe);
            return false;
        };
        if body.position.distance(player) <= self.config.max_distance {
            return false;
        }

        body.position = player + self.config.respawn_offset;
        body.clear_velocities();
        log::info!("Axe respawned near the player at {:?}", body.position);
        world.sync_transforms();
        true
    }
}
