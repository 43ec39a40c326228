//! Chop feedback debounce
//!
//! One swing can touch a log over many physics steps. The gate lets the first
//! qualifying contact through, producing an [`ImpactResponse`], then ignores
//! every contact until its cooldown has run out in real time.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};
use woodcut_math::Vec3;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Seconds during which further impacts are ignored
    pub cooldown: f32,
    /// Lowest chop pitch
    pub pitch_min: f32,
    /// Highest chop pitch
    pub pitch_max: f32,
    /// Lifetime of the chip/splinter effect
    pub effect_duration: f32,
    /// Simulation freeze on impact, 0 disables
    pub hit_stop: f32,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            cooldown: 0.5,
            pitch_min: 0.9,
            pitch_max: 1.1,
            effect_duration: 1.0,
            hit_stop: 0.05,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImpactGateState {
    Ready,
    Cooling { remaining: f32 },
}

/// Feedback to play for one accepted impact
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpactResponse {
    pub pitch: f32,
    pub effect_point: Vec3,
    pub effect_lifetime: f32,
    pub hit_stop: Option<f32>,
}

/// Per-axe impact debounce
#[derive(Clone, Debug)]
pub struct ImpactGate {
    config: ImpactConfig,
    state: ImpactGateState,
    rng: StdRng,
}

impl ImpactGate {
    pub fn new(config: ImpactConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic pitch jitter
    pub fn with_seed(config: ImpactConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ImpactConfig, rng: StdRng) -> Self {
        Self {
            config,
            state: ImpactGateState::Ready,
            rng,
        }
    }

    #[inline]
    pub fn state(&self) -> ImpactGateState {
        self.state
    }

    #[inline]
    pub fn is_cooling(&self) -> bool {
        matches!(self.state, ImpactGateState::Cooling { .. })
    }

    /// Consider one collision; `Some` only when it passes the gate
    ///
    /// Passing requires the axe to be held, the other body to be wood and the
    /// gate to be ready. Passing starts the cooldown.
    pub fn evaluate(&mut self, axe_held: bool, target_is_wood: bool, contact_point: Vec3) -> Option<ImpactResponse> {
        if !axe_held || !target_is_wood || self.is_cooling() {
            return None;
        }

        let (lo, hi) = (self.config.pitch_min, self.config.pitch_max);
        let pitch = if hi > lo { self.rng.gen_range(lo..=hi) } else { lo };
        if self.config.cooldown > 0.0 {
            self.state = ImpactGateState::Cooling {
                remaining: self.config.cooldown,
            };
        }
        log::debug!("Chop impact at {:?} (pitch {:.3})", contact_point, pitch);

        Some(ImpactResponse {
            pitch,
            effect_point: contact_point,
            effect_lifetime: self.config.effect_duration,
            hit_stop: (self.config.hit_stop > 0.0).then_some(self.config.hit_stop),
        })
    }

    /// Advance the cooldown by real (unscaled) time
    pub fn tick(&mut self, real_dt: f32) {
        if let ImpactGateState::Cooling { remaining } = self.state {
            let remaining = remaining - real_dt.max(0.0);
            self.state = if remaining <= 0.0 {
                ImpactGateState::Ready
            } else {
                ImpactGateState::Cooling { remaining }
            };
        }
    }

    /// Cut the cooldown short
    pub fn reset(&mut self) {
        if self.is_cooling() {
            log::debug!("Impact cooldown reset");
        }
        self.state = ImpactGateState::Ready;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> ImpactGate {
        ImpactGate::with_seed(ImpactConfig::default(), 7)
    }

    #[test]
    fn test_fires_once_per_window() {
        let mut gate = gate();
        let mut fired = 0;
        for _ in 0..20 {
            if gate.evaluate(true, true, Vec3::ZERO).is_some() {
                fired += 1;
            }
            gate.tick(0.01);
        }
        // 20 notifications across 0.2 s, inside one 0.5 s window
        assert_eq!(fired, 1);
        assert!(gate.is_cooling());
    }

    #[test]
    fn test_ready_again_after_cooldown() {
        let mut gate = gate();
        assert!(gate.evaluate(true, true, Vec3::ZERO).is_some());
        gate.tick(0.3);
        assert!(gate.evaluate(true, true, Vec3::ZERO).is_none());
        gate.tick(0.3);
        assert_eq!(gate.state(), ImpactGateState::Ready);
        assert!(gate.evaluate(true, true, Vec3::ZERO).is_some());
    }

    #[test]
    fn test_requires_held_axe_and_wood() {
        let mut gate = gate();
        assert!(gate.evaluate(false, true, Vec3::ZERO).is_none());
        assert!(gate.evaluate(true, false, Vec3::ZERO).is_none());
        assert!(!gate.is_cooling());
    }

    #[test]
    fn test_pitch_in_range() {
        let mut gate = gate();
        for _ in 0..100 {
            let response = gate.evaluate(true, true, Vec3::ZERO).unwrap();
            assert!((0.9..=1.1).contains(&response.pitch));
            gate.reset();
        }
    }

    #[test]
    fn test_response_carries_effect_and_hit_stop() {
        let mut gate = gate();
        let point = Vec3::new(1.0, 0.5, 0.0);
        let response = gate.evaluate(true, true, point).unwrap();
        assert_eq!(response.effect_point, point);
        assert_eq!(response.effect_lifetime, 1.0);
        assert_eq!(response.hit_stop, Some(0.05));

        let mut quiet = ImpactGate::with_seed(ImpactConfig { hit_stop: 0.0, ..ImpactConfig::default() }, 1);
        assert_eq!(quiet.evaluate(true, true, point).unwrap().hit_stop, None);
    }

    #[test]
    fn test_reset_short_circuits_cooling() {
        let mut gate = gate();
        gate.evaluate(true, true, Vec3::ZERO);
        assert!(gate.is_cooling());
        gate.reset();
        assert!(gate.evaluate(true, true, Vec3::ZERO).is_some());
    }
}
