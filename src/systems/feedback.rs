//! Log-backed audio and effect outputs
//!
//! The binary has no mixer or particle renderer; chop sounds and chip effects
//! are reported through the log.

use woodcut_core::{AudioChannel, AudioSink, EffectSpawner, Vec3, VolumeSettings};

/// Audio sink that logs what it would play
#[derive(Debug, Default)]
pub struct LogAudio {
    volumes: VolumeSettings,
    chops_played: usize,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volumes(&self) -> VolumeSettings {
        self.volumes
    }

    pub fn chops_played(&self) -> usize {
        self.chops_played
    }
}

impl AudioSink for LogAudio {
    fn play_chop(&mut self, pitch: f32) {
        self.chops_played += 1;
        let gain = self.volumes.master * self.volumes.sfx;
        log::info!("*chop* (pitch {:.2}, gain {:.2})", pitch, gain);
    }

    fn set_volume(&mut self, channel: AudioChannel, volume: f32) {
        self.volumes.set(channel, volume);
        log::debug!("{:?} volume set to {:.2}", channel, volume);
    }
}

/// Effect spawner that logs each chip burst
#[derive(Debug, Default)]
pub struct LogEffects {
    spawned: usize,
}

impl LogEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawned(&self) -> usize {
        self.spawned
    }
}

impl EffectSpawner for LogEffects {
    fn spawn_chop_effect(&mut self, point: Vec3, lifetime: f32) {
        self.spawned += 1;
        log::debug!("Wood chips at ({:.2}, {:.2}, {:.2}) for {:.1}s", point.x, point.y, point.z, lifetime);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effects_counted() {
        let mut effects = LogEffects::new();
        effects.spawn_chop_effect(Vec3::ZERO, 1.0);
        effects.spawn_chop_effect(Vec3::ONE, 0.2);
        assert_eq!(effects.spawned(), 2);
    }

    #[test]
    fn test_audio_tracks_volume_and_chops() {
        let mut audio = LogAudio::new();
        audio.set_volume(AudioChannel::Sfx, 0.9);
        audio.play_chop(1.0);
        assert_eq!(audio.volumes().sfx, 0.9);
        assert_eq!(audio.chops_played(), 1);
    }
}
