//! Simulation configuration.
//!
//! Every tunable lives in [`SimulationConfig`], which can be loaded from a
//! TOML file. Missing keys fall back to their defaults, so a file only needs
//! the values it changes:
//!
//! ```toml
//! tick_rate = 60
//!
//! [movement]
//! move_speed = 7.0
//!
//! [lease]
//! grace_period = 0.3
//! ```

use std::path::Path;

use glam::Vec3;
use kinetra_authority::LeaseConfig;
use kinetra_physics::dynamics::JointLimits;
use kinetra_physics::{LookConfig, MovementConfig, STANDARD_GRAVITY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Grab, throw and push tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    // ========================================================================
    // Grab
    // ========================================================================
    /// Reach of the grab ray from the viewpoint (meters).
    pub use_distance: f32,

    /// Distance in front of the viewpoint a held body is carried at (meters).
    pub hold_distance: f32,

    /// Heaviest body that can be picked up (kg).
    pub max_grab_mass: f32,

    /// Linear spring of the carry joint (1/s²). The angular spring runs at half this.
    pub hold_spring: f32,

    /// Damper of the carry joint (1/s).
    pub hold_damper: f32,

    /// Linear slack of the carry joint (meters).
    pub hold_linear_slack: f32,

    /// Angular slack of the carry joint (degrees).
    pub hold_angular_slack_deg: f32,

    /// Cap on the carry joint's linear acceleration (m/s²).
    pub hold_max_accel: f32,

    /// Velocity change given to a thrown body (m/s).
    pub throw_impulse: f32,

    // ========================================================================
    // Contact
    // ========================================================================
    /// How far past the capsule the contact proxy reaches (meters).
    pub contact_margin: f32,

    /// Push impulse per m/s of closing speed (kg·m/s per m/s).
    pub push_power: f32,

    /// Bodies heavier than this get proportionally weaker pushes (kg).
    pub max_push_mass: f32,

    /// Slower contacts don't push (m/s).
    pub min_push_speed: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            use_distance: 3.0,
            hold_distance: 1.5,
            max_grab_mass: 25.0,
            hold_spring: 400.0,
            hold_damper: 40.0,
            hold_linear_slack: 0.01,
            hold_angular_slack_deg: 10.0,
            hold_max_accel: 250.0,
            throw_impulse: 8.0,
            contact_margin: 0.1,
            push_power: 1.5,
            max_push_mass: 200.0,
            min_push_speed: 0.2,
        }
    }
}

impl InteractionConfig {
    /// Limits for the carry joint.
    pub fn joint_limits(&self) -> JointLimits {
        JointLimits {
            linear_slack: self.hold_linear_slack,
            angular_slack_deg: self.hold_angular_slack_deg,
            spring: self.hold_spring,
            damper: self.hold_damper,
            max_acceleration: self.hold_max_accel,
        }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// World gravity (m/s²).
    pub gravity: Vec3,

    /// Mass of every player body (kg).
    pub player_mass: f32,

    pub movement: MovementConfig,
    pub look: LookConfig,
    pub interaction: InteractionConfig,
    pub lease: LeaseConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            gravity: STANDARD_GRAVITY,
            player_mass: 80.0,
            movement: MovementConfig::default(),
            look: LookConfig::default(),
            interaction: InteractionConfig::default(),
            lease: LeaseConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Reject values the simulation can't run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(invalid("tick_rate", "must be at least 1"));
        }
        if !self.gravity.is_finite() {
            return Err(invalid("gravity", "must be finite"));
        }
        positive("player_mass", self.player_mass)?;

        let m = &self.movement;
        positive("movement.capsule_radius", m.capsule_radius)?;
        positive("movement.stand_height", m.stand_height)?;
        positive("movement.crawl_height", m.crawl_height)?;
        if m.crawl_height > m.stand_height {
            return Err(invalid("movement.crawl_height", "must not exceed stand_height"));
        }
        if m.stand_height < m.capsule_radius * 2.0 {
            return Err(invalid("movement.stand_height", "must fit both capsule caps"));
        }
        positive("movement.ride_height", m.ride_height)?;
        positive("movement.ground_probe_radius", m.ground_probe_radius)?;
        non_negative("movement.hover_tolerance", m.hover_tolerance)?;
        non_negative("movement.spring_k", m.spring_k)?;
        non_negative("movement.max_spring_accel", m.max_spring_accel)?;
        non_negative("movement.coyote_time", m.coyote_time)?;
        non_negative("movement.jump_buffer", m.jump_buffer)?;
        non_negative("movement.height_lerp_rate", m.height_lerp_rate)?;
        if !(0.0..=90.0).contains(&m.max_slope_deg) {
            return Err(invalid("movement.max_slope_deg", "must be within 0..=90"));
        }

        if self.look.min_pitch > self.look.max_pitch {
            return Err(invalid("look.min_pitch", "must not exceed max_pitch"));
        }

        let i = &self.interaction;
        positive("interaction.use_distance", i.use_distance)?;
        positive("interaction.hold_distance", i.hold_distance)?;
        non_negative("interaction.max_grab_mass", i.max_grab_mass)?;
        non_negative("interaction.hold_spring", i.hold_spring)?;
        non_negative("interaction.hold_damper", i.hold_damper)?;
        non_negative("interaction.contact_margin", i.contact_margin)?;

        non_negative("lease.grace_period", self.lease.grace_period)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be non-negative, got {value}")))
    }
}
