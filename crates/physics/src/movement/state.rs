//! Motor states, per-tick input and the transition table.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The locomotion state of a body. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MotorState {
    Grounded,
    /// Bodies spawn airborne and settle onto the ground.
    #[default]
    Air,
    Slide,
    Crawl,
}

impl MotorState {
    pub const ALL: [MotorState; 4] = [Self::Grounded, Self::Air, Self::Slide, Self::Crawl];

    /// Whether the capsule should be at crawl height in this state.
    #[inline]
    pub fn is_crouched(self) -> bool {
        matches!(self, Self::Slide | Self::Crawl)
    }
}

impl fmt::Display for MotorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Grounded => "grounded",
            Self::Air => "air",
            Self::Slide => "slide",
            Self::Crawl => "crawl",
        };
        f.write_str(name)
    }
}

/// Player intent for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotorInput {
    /// Planar move vector, x = strafe right, y = forward. Clamped to unit length.
    pub move_axis: Vec2,
    /// Crouch is held this tick.
    pub crouch_held: bool,
    /// A jump press happened since the last tick.
    pub jump_pressed: bool,
    /// Facing yaw in degrees.
    pub yaw_deg: f32,
}

impl MotorInput {
    /// Move axis with its length clamped to 1.
    pub fn clamped_axis(&self) -> Vec2 {
        self.move_axis.clamp_length_max(1.0)
    }
}

/// Everything the transition table looks at, sampled after movement was applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionInput {
    pub grounded: bool,
    pub crouch_held: bool,
    /// A jump fired this tick.
    pub jumped: bool,
    /// Full body speed (m/s).
    pub speed: f32,
    pub slide_min_speed: f32,
    /// Slides below this speed drop to a crawl.
    pub slide_exit_speed: f32,
}

/// Evaluate the transition table once.
///
/// `can_stand` is only consulted when leaving a crawl, since it costs a
/// collision query.
pub fn next_state(state: MotorState, input: &TransitionInput, can_stand: impl FnOnce() -> bool) -> MotorState {
    let airborne_or_grounded = if input.grounded {
        MotorState::Grounded
    } else {
        MotorState::Air
    };

    match state {
        MotorState::Grounded => {
            if input.jumped || !input.grounded {
                MotorState::Air
            } else if input.crouch_held && input.speed > input.slide_min_speed {
                MotorState::Slide
            } else if input.crouch_held {
                MotorState::Crawl
            } else {
                MotorState::Grounded
            }
        }
        MotorState::Air => airborne_or_grounded,
        MotorState::Slide => {
            if !input.crouch_held {
                airborne_or_grounded
            } else if input.speed < input.slide_exit_speed {
                MotorState::Crawl
            } else {
                MotorState::Slide
            }
        }
        MotorState::Crawl => {
            if !input.grounded {
                MotorState::Air
            } else if !input.crouch_held && can_stand() {
                MotorState::Grounded
            } else {
                MotorState::Crawl
            }
        }
    }
}

/// A state change reported by the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorTransition {
    pub from: MotorState,
    pub to: MotorState,
}
