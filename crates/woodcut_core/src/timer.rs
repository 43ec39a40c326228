//! Timed transitions advanced once per tick
//!
//! Nothing in the core sleeps or suspends. Delays are [`Countdown`]s ticked
//! by the session, and pausing or hit-stop is the [`SimClock`] handing out a
//! zero simulation step.

/// A countdown that finishes once its remaining time reaches zero
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Countdown {
    remaining: f32,
}

impl Countdown {
    /// Start a countdown of `duration` seconds
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: duration.max(0.0),
        }
    }

    /// Advance by `dt`; returns true on the tick the countdown finishes
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining -= dt.max(0.0);
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.remaining > 0.0
    }

    /// Stop without finishing
    pub fn cancel(&mut self) {
        self.remaining = 0.0;
    }
}

/// Simulation clock mapping real frame time to simulation time
///
/// Paused: every step is zero. Hit-stop: zero steps until the real-time
/// countdown runs out, then normal time resumes.
#[derive(Clone, Debug)]
pub struct SimClock {
    time_scale: f32,
    paused: bool,
    hit_stop: Countdown,
    real_elapsed: f64,
    sim_elapsed: f64,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            time_scale: 1.0,
            paused: false,
            hit_stop: Countdown::default(),
            real_elapsed: 0.0,
            sim_elapsed: 0.0,
        }
    }

    /// Advance by a real frame time and return the simulation step
    pub fn advance(&mut self, real_dt: f32) -> f32 {
        let real_dt = real_dt.max(0.0);
        self.real_elapsed += real_dt as f64;

        if self.paused {
            return 0.0;
        }
        if self.hit_stop.is_running() {
            if self.hit_stop.tick(real_dt) {
                log::debug!("Hit-stop finished");
            }
            return 0.0;
        }

        let sim_dt = real_dt * self.time_scale;
        self.sim_elapsed += sim_dt as f64;
        sim_dt
    }

    /// Freeze simulation time (time scale 0)
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume simulation time (time scale 1)
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle pause; returns the new paused state
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze simulation for `duration` seconds of real time
    pub fn start_hit_stop(&mut self, duration: f32) {
        if duration > 0.0 {
            self.hit_stop = Countdown::new(duration);
        }
    }

    #[inline]
    pub fn hit_stop_active(&self) -> bool {
        self.hit_stop.is_running()
    }

    /// Scale applied to real time while running
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Real seconds since the clock was created
    #[inline]
    pub fn real_elapsed(&self) -> f64 {
        self.real_elapsed
    }

    /// Simulated seconds since the clock was created
    #[inline]
    pub fn sim_elapsed(&self) -> f64 {
        self.sim_elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_finishes_once() {
        let mut c = Countdown::new(0.1);
        assert!(c.is_running());
        assert!(!c.tick(0.05));
        assert!(c.tick(0.06));
        assert!(!c.is_running());
        assert!(!c.tick(0.05));
    }

    #[test]
    fn test_countdown_cancel() {
        let mut c = Countdown::new(1.0);
        c.cancel();
        assert!(!c.is_running());
        assert_eq!(c.remaining(), 0.0);
    }

    #[test]
    fn test_paused_clock_yields_zero() {
        let mut clock = SimClock::new();
        clock.pause();
        assert_eq!(clock.advance(0.016), 0.0);
        assert!(clock.real_elapsed() > 0.0);
        clock.resume();
        assert!((clock.advance(0.016) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_hit_stop_uses_real_time() {
        let mut clock = SimClock::new();
        clock.start_hit_stop(0.05);
        assert_eq!(clock.advance(0.03), 0.0);
        assert_eq!(clock.advance(0.03), 0.0);
        assert!(!clock.hit_stop_active());
        assert!(clock.advance(0.03) > 0.0);
    }

    #[test]
    fn test_time_scale() {
        let mut clock = SimClock::new();
        clock.set_time_scale(0.5);
        assert!((clock.advance(0.02) - 0.01).abs() < 1e-6);
    }
}
