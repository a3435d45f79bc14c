//! Movement configuration constants.
//!
//! All locomotion tunables are grouped here for easy tuning, together with
//! [`ConfigHandle`], the shared, hot-swappable holder the motor polls.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Configuration for player locomotion.
///
/// All values use metric units (meters, seconds) unless otherwise noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ========================================================================
    // Ground Move
    // ========================================================================
    /// Target speed for full stick deflection on the ground (m/s).
    pub move_speed: f32,

    /// Ground acceleration toward the target velocity (m/s²).
    pub accel: f32,

    /// Hard cap on the planar target velocity on the ground (m/s).
    pub max_ground_speed: f32,

    /// Velocity-proportional planar friction while grounded (1/s).
    pub ground_friction: f32,

    // ========================================================================
    // Air Control
    // ========================================================================
    /// Air acceleration toward the target velocity (m/s²).
    pub air_accel: f32,

    /// Target and cap for planar speed in the air (m/s).
    pub max_air_speed: f32,

    // ========================================================================
    // Jump
    // ========================================================================
    /// Apex height of a jump from rest (meters).
    pub jump_height: f32,

    /// Grace window after leaving the ground during which jump still fires (seconds).
    pub coyote_time: f32,

    /// How long a jump press is remembered before it fires (seconds).
    pub jump_buffer: f32,

    /// Suspension is switched off for this long after a jump (seconds).
    pub jump_suspension_suppression: f32,

    // ========================================================================
    // Slide
    // ========================================================================
    /// Minimum speed to start a slide instead of crawling (m/s).
    pub slide_min_speed: f32,

    /// Velocity-proportional friction along the ground plane while sliding (1/s).
    pub slide_friction: f32,

    // ========================================================================
    // Crawl
    // ========================================================================
    /// Target and cap for planar speed while crawling (m/s).
    pub crawl_speed: f32,

    /// Fraction of `accel` available while crawling.
    pub crawl_accel_factor: f32,

    /// Velocity-proportional planar friction while crawling (1/s).
    pub crawl_friction: f32,

    /// A slide drops to a crawl below `crawl_speed` times this factor.
    pub slide_exit_factor: f32,

    // ========================================================================
    // Capsule
    // ========================================================================
    /// Capsule radius (meters).
    pub capsule_radius: f32,

    /// Standing capsule height (meters).
    pub stand_height: f32,

    /// Crawling capsule height (meters).
    pub crawl_height: f32,

    /// Rate of the exponential height blend (1/s).
    pub height_lerp_rate: f32,

    /// Eye height when standing (meters from feet).
    pub eye_height_stand: f32,

    /// Eye height when crawling or sliding (meters from feet).
    pub eye_height_crawl: f32,

    // ========================================================================
    // Hover Spring
    // ========================================================================
    /// Distance the suspension holds the center of mass above the ground (meters).
    pub ride_height: f32,

    /// Spring constant in acceleration units (1/s²).
    pub spring_k: f32,

    /// Height errors smaller than this are ignored (meters).
    pub hover_tolerance: f32,

    /// Cap on suspension acceleration (m/s²).
    pub max_spring_accel: f32,

    // ========================================================================
    // Ground Probe
    // ========================================================================
    /// Radius of the downward ground probe sphere (meters).
    pub ground_probe_radius: f32,

    /// Probe reach past the ride height (meters).
    pub ground_probe_margin: f32,

    /// Steepest surface still counted as ground (degrees).
    pub max_slope_deg: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            // Ground move
            move_speed: 6.0,
            accel: 30.0,
            max_ground_speed: 7.0,
            ground_friction: 5.0,

            // Air
            air_accel: 8.0,
            max_air_speed: 5.0,

            // Jump
            jump_height: 1.2,
            coyote_time: 0.12,
            jump_buffer: 0.12,
            jump_suspension_suppression: 0.2,

            // Slide
            slide_min_speed: 8.0,
            slide_friction: 1.5,

            // Crawl
            crawl_speed: 2.5,
            crawl_accel_factor: 0.6,
            crawl_friction: 6.0,
            slide_exit_factor: 1.2,

            // Capsule
            capsule_radius: 0.4,
            stand_height: 1.8,
            crawl_height: 1.0,
            height_lerp_rate: 12.0,
            eye_height_stand: 1.6,
            eye_height_crawl: 0.8,

            // Hover spring
            ride_height: 0.9,
            spring_k: 1200.0,
            hover_tolerance: 0.01,
            max_spring_accel: 60.0,

            // Ground probe
            ground_probe_radius: 0.25,
            ground_probe_margin: 0.6,
            max_slope_deg: 50.0,
        }
    }
}

impl MovementConfig {
    /// Fast, floaty movement with lots of air control.
    pub fn arcade() -> Self {
        Self {
            move_speed: 8.0,
            accel: 45.0,
            max_ground_speed: 9.5,
            air_accel: 14.0,
            max_air_speed: 7.0,
            jump_height: 1.5,
            coyote_time: 0.18,
            jump_buffer: 0.18,
            slide_min_speed: 7.0,
            slide_friction: 0.8,
            ..Default::default()
        }
    }

    /// Slower, heavier movement with little air control.
    pub fn tactical() -> Self {
        Self {
            move_speed: 4.0,
            accel: 20.0,
            max_ground_speed: 5.0,
            ground_friction: 7.0,
            air_accel: 3.0,
            max_air_speed: 3.5,
            jump_height: 0.9,
            coyote_time: 0.08,
            jump_buffer: 0.08,
            slide_min_speed: 6.0,
            slide_friction: 2.5,
            crawl_speed: 1.8,
            ..Default::default()
        }
    }

    /// Capsule height for a crouched (`true`) or upright stance.
    pub fn height(&self, crouched: bool) -> f32 {
        if crouched {
            self.crawl_height
        } else {
            self.stand_height
        }
    }

    /// Eye height for a crouched (`true`) or upright stance.
    pub fn eye_height(&self, crouched: bool) -> f32 {
        if crouched {
            self.eye_height_crawl
        } else {
            self.eye_height_stand
        }
    }

    /// Furthest the ground probe reaches below the center of mass.
    pub fn ground_probe_distance(&self) -> f32 {
        self.ride_height + self.ground_probe_margin
    }

    /// Launch speed that reaches `jump_height` against `gravity` (m/s²).
    pub fn jump_velocity(&self, gravity: f32) -> f32 {
        (2.0 * gravity.abs() * self.jump_height).sqrt()
    }
}

/// Look tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookConfig {
    /// Degrees of rotation per unit of raw look delta.
    pub sensitivity: f32,

    /// Lowest allowed pitch (degrees, negative looks down).
    pub min_pitch: f32,

    /// Highest allowed pitch (degrees).
    pub max_pitch: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.1,
            min_pitch: -85.0,
            max_pitch: 85.0,
        }
    }
}

#[derive(Debug)]
struct Versioned {
    version: u64,
    config: Arc<MovementConfig>,
}

/// Shared, hot-swappable movement configuration.
///
/// Clones share the same slot. Every [`ConfigHandle::set`] bumps a version
/// counter; consumers compare it against the version they last applied and
/// recompute derived state when it moves.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    slot: Arc<RwLock<Versioned>>,
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new(MovementConfig::default())
    }
}

impl ConfigHandle {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Versioned {
                version: 0,
                config: Arc::new(config),
            })),
        }
    }

    /// Current configuration snapshot.
    pub fn snapshot(&self) -> Arc<MovementConfig> {
        Arc::clone(&self.slot.read().config)
    }

    /// Current version.
    pub fn version(&self) -> u64 {
        self.slot.read().version
    }

    /// Snapshot and version read together.
    pub fn load(&self) -> (u64, Arc<MovementConfig>) {
        let guard = self.slot.read();
        (guard.version, Arc::clone(&guard.config))
    }

    /// Replace the configuration and return the new version.
    pub fn set(&self, config: MovementConfig) -> u64 {
        let mut guard = self.slot.write();
        guard.version += 1;
        guard.config = Arc::new(config);
        tracing::debug!(version = guard.version, "movement config replaced");
        guard.version
    }

    /// Whether two handles share the same slot.
    pub fn same_slot(&self, other: &ConfigHandle) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    /// Edit the configuration in place and return the new version.
    pub fn update(&self, edit: impl FnOnce(&mut MovementConfig)) -> u64 {
        let mut next = (*self.snapshot()).clone();
        edit(&mut next);
        self.set(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MovementConfig::default();
        assert_eq!(config.move_speed, 6.0);
        assert_eq!(config.spring_k, 1200.0);
        assert!((config.ground_probe_distance() - 1.5).abs() < 1e-6);
        assert!(config.crawl_height < config.stand_height);
    }

    #[test]
    fn test_presets_differ_from_default() {
        let base = MovementConfig::default();
        assert!(MovementConfig::arcade().move_speed > base.move_speed);
        assert!(MovementConfig::tactical().move_speed < base.move_speed);
        // Presets keep the capsule geometry
        assert_eq!(MovementConfig::tactical().stand_height, base.stand_height);
    }

    #[test]
    fn test_jump_velocity_reaches_height() {
        let config = MovementConfig::default();
        let g = 9.81;
        let v = config.jump_velocity(-g);
        // v² / 2g = h
        assert!((v * v / (2.0 * g) - config.jump_height).abs() < 1e-4);
    }

    #[test]
    fn test_handle_versions_and_shares() {
        let handle = ConfigHandle::default();
        let other = handle.clone();
        assert_eq!(handle.version(), 0);

        let v = other.update(|c| c.crawl_height = 0.8);
        assert_eq!(v, 1);
        assert_eq!(handle.version(), 1);
        assert_eq!(handle.snapshot().crawl_height, 0.8);

        let (version, config) = handle.load();
        assert_eq!(version, 1);
        assert_eq!(config.stand_height, 1.8);
    }
}
