//! Per-tick simulation context passed into every component call.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Standard gravity (m/s²).
pub const STANDARD_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Clock and environment for one fixed tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimContext {
    /// Simulation time at the start of this tick (seconds).
    pub now: f64,
    /// Fixed tick duration (seconds).
    pub dt: f32,
    /// World gravity.
    pub gravity: Vec3,
}

impl SimContext {
    pub fn new(now: f64, dt: f32, gravity: Vec3) -> Self {
        Self { now, dt, gravity }
    }

    /// Context for a tick running at `rate` Hz under standard gravity.
    pub fn at_rate(now: f64, rate: f32) -> Self {
        Self::new(now, 1.0 / rate, STANDARD_GRAVITY)
    }

    /// The context for the tick after this one.
    pub fn next(&self) -> Self {
        Self {
            now: self.now + f64::from(self.dt),
            ..*self
        }
    }

    /// Time elapsed since `then` (seconds).
    #[inline]
    pub fn since(&self, then: f64) -> f64 {
        self.now - then
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_advances_by_dt() {
        let ctx = SimContext::at_rate(1.0, 50.0);
        let next = ctx.next();
        assert!((next.now - 1.02).abs() < 1e-6);
        assert_eq!(next.dt, ctx.dt);
        assert!((next.since(1.0) - 0.02).abs() < 1e-6);
    }
}
