//! Tick-rate look integration with a two-sample snapshot for presentation.
//!
//! Look deltas arrive at device rate and are accumulated; each fixed tick
//! folds them into yaw/pitch and publishes a [`LookSnapshot`]. A renderer
//! running at any rate interpolates between the snapshot's two samples.

use std::sync::Arc;

use glam::{Quat, Vec2, Vec3};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::config::LookConfig;

/// Previous and current look angles (degrees) stamped with the tick time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LookSnapshot {
    pub prev_yaw: f32,
    pub prev_pitch: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Simulation time of the tick that produced `yaw`/`pitch`.
    pub stamp: f64,
}

impl LookSnapshot {
    /// Interpolation factor for `now`, clamped to `[0, 1]`.
    pub fn alpha(&self, now: f64, tick_duration: f32) -> f32 {
        if tick_duration <= 0.0 {
            return 1.0;
        }
        (((now - self.stamp) / f64::from(tick_duration)) as f32).clamp(0.0, 1.0)
    }

    /// Yaw and pitch at `alpha`: shortest-path for yaw, linear for pitch.
    pub fn lerp(&self, alpha: f32) -> (f32, f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        let yaw = lerp_angle(self.prev_yaw, self.yaw, alpha);
        let pitch = self.prev_pitch + (self.pitch - self.prev_pitch) * alpha;
        (yaw, pitch)
    }

    /// Interpolated yaw and pitch for presentation at wall time `now`.
    pub fn interpolate(&self, now: f64, tick_duration: f32) -> (f32, f32) {
        self.lerp(self.alpha(now, tick_duration))
    }

    /// Current yaw-only rotation.
    pub fn yaw_rotation(&self) -> Quat {
        yaw_rotation(self.yaw)
    }

    /// Current view rotation including pitch.
    pub fn view_rotation(&self) -> Quat {
        view_rotation(self.yaw, self.pitch)
    }
}

/// Interpolate between two angles (degrees) along the shorter arc.
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let delta = (to - from + 180.0).rem_euclid(360.0) - 180.0;
    (from + delta * t).rem_euclid(360.0)
}

/// Rotation about world up for a yaw in degrees. Yaw 0 faces +Z.
pub fn yaw_rotation(yaw_deg: f32) -> Quat {
    Quat::from_rotation_y(yaw_deg.to_radians())
}

/// View rotation for yaw and pitch in degrees. Positive pitch looks up.
pub fn view_rotation(yaw_deg: f32, pitch_deg: f32) -> Quat {
    yaw_rotation(yaw_deg) * Quat::from_rotation_x(-pitch_deg.to_radians())
}

/// Planar forward direction for a yaw.
pub fn forward(yaw_deg: f32) -> Vec3 {
    yaw_rotation(yaw_deg) * Vec3::Z
}

/// Planar right direction for a yaw.
pub fn right(yaw_deg: f32) -> Vec3 {
    forward(yaw_deg).cross(Vec3::Y)
}

/// Single-writer, many-reader slot the simulation publishes snapshots into.
#[derive(Debug, Clone, Default)]
pub struct SnapshotFeed {
    slot: Arc<RwLock<LookSnapshot>>,
}

impl SnapshotFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published snapshot.
    pub fn publish(&self, snapshot: LookSnapshot) {
        *self.slot.write() = snapshot;
    }

    /// Copy of the latest snapshot.
    pub fn latest(&self) -> LookSnapshot {
        *self.slot.read()
    }
}

/// Accumulates look input and advances yaw/pitch once per tick.
#[derive(Debug, Clone)]
pub struct LookIntegrator {
    config: LookConfig,
    pending: Vec2,
    snapshot: LookSnapshot,
}

impl LookIntegrator {
    pub fn new(config: LookConfig) -> Self {
        Self {
            config,
            pending: Vec2::ZERO,
            snapshot: LookSnapshot::default(),
        }
    }

    /// Start facing `yaw_deg` with level pitch.
    pub fn with_yaw(mut self, yaw_deg: f32) -> Self {
        let yaw = yaw_deg.rem_euclid(360.0);
        self.snapshot.yaw = yaw;
        self.snapshot.prev_yaw = yaw;
        self
    }

    pub fn config(&self) -> &LookConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: LookConfig) {
        self.config = config;
    }

    /// Add a raw look delta (x = yaw, y = pitch) to the pending accumulator.
    pub fn accumulate(&mut self, raw_delta: Vec2) {
        self.pending += raw_delta * self.config.sensitivity;
    }

    /// Fold pending input into the angles and produce the tick's snapshot.
    pub fn tick(&mut self, now: f64) -> LookSnapshot {
        let yaw = (self.snapshot.yaw + self.pending.x).rem_euclid(360.0);
        let pitch = (self.snapshot.pitch + self.pending.y)
            .clamp(self.config.min_pitch, self.config.max_pitch);
        self.pending = Vec2::ZERO;

        self.snapshot = LookSnapshot {
            prev_yaw: self.snapshot.yaw,
            prev_pitch: self.snapshot.pitch,
            yaw,
            pitch,
            stamp: now,
        };
        self.snapshot
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> &LookSnapshot {
        &self.snapshot
    }

    pub fn yaw(&self) -> f32 {
        self.snapshot.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.snapshot.pitch
    }
}

impl Default for LookIntegrator {
    fn default() -> Self {
        Self::new(LookConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_look() -> LookIntegrator {
        LookIntegrator::new(LookConfig {
            sensitivity: 1.0,
            ..LookConfig::default()
        })
    }

    #[test]
    fn test_tick_rolls_previous() {
        let mut look = unit_look();
        look.accumulate(Vec2::new(10.0, 0.0));
        look.tick(0.0);
        look.accumulate(Vec2::new(5.0, 0.0));
        look.accumulate(Vec2::new(5.0, 4.0));
        let snap = look.tick(1.0 / 60.0);

        assert_eq!(snap.prev_yaw, 10.0);
        assert_eq!(snap.yaw, 20.0);
        assert_eq!(snap.prev_pitch, 0.0);
        assert_eq!(snap.pitch, 4.0);
        assert_eq!(snap.stamp, 1.0 / 60.0);

        // Accumulator was reset
        let idle = look.tick(2.0 / 60.0);
        assert_eq!(idle.yaw, 20.0);
        assert_eq!(idle.prev_yaw, 20.0);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut look = unit_look();
        look.accumulate(Vec2::new(0.0, 500.0));
        assert_eq!(look.tick(0.0).pitch, 85.0);
        look.accumulate(Vec2::new(0.0, -1000.0));
        assert_eq!(look.tick(0.1).pitch, -85.0);
    }

    #[test]
    fn test_yaw_wraps() {
        let mut look = unit_look().with_yaw(350.0);
        look.accumulate(Vec2::new(20.0, 0.0));
        assert!((look.tick(0.0).yaw - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_interpolation_midpoint() {
        let snap = LookSnapshot {
            prev_yaw: 10.0,
            prev_pitch: 0.0,
            yaw: 20.0,
            pitch: 10.0,
            stamp: 1.0,
        };
        let dt = 0.02;
        let (yaw, pitch) = snap.interpolate(1.01, dt);
        assert!((yaw - 15.0).abs() < 1e-3);
        assert!((pitch - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_alpha_is_clamped() {
        let snap = LookSnapshot {
            stamp: 1.0,
            ..LookSnapshot::default()
        };
        assert_eq!(snap.alpha(5.0, 0.02), 1.0);
        assert_eq!(snap.alpha(0.5, 0.02), 0.0);

        let late = LookSnapshot {
            prev_yaw: 10.0,
            yaw: 20.0,
            stamp: 1.0,
            ..LookSnapshot::default()
        };
        assert!((late.interpolate(3.0, 0.02).0 - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_shortest_path_across_zero() {
        // 350 -> 10 goes forward through 0, not back through 180
        assert!((lerp_angle(350.0, 10.0, 0.5) - 0.0).abs() < 1e-3);
        assert!((lerp_angle(10.0, 350.0, 0.25) - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_view_rotation_pitch_up() {
        let dir = view_rotation(0.0, 45.0) * Vec3::Z;
        assert!(dir.y > 0.7);
        assert!((forward(90.0) - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_feed_publishes_latest() {
        let feed = SnapshotFeed::new();
        let reader = feed.clone();
        let mut look = unit_look();
        look.accumulate(Vec2::new(3.0, 0.0));
        feed.publish(look.tick(0.5));
        assert_eq!(reader.latest().yaw, 3.0);
    }
}
