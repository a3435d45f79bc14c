//! Player input.
//!
//! Input is split in two: continuously sampled analog state (move vector,
//! look delta, crouch held) that is simply overwritten, and discrete
//! button presses that are queued and drained exactly once per tick.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Continuously sampled input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalogInput {
    /// Planar move vector, x = strafe right, y = forward.
    pub move_axis: Vec2,
    /// Crouch button held.
    pub crouch_held: bool,
}

/// Edge-triggered presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputEvent {
    Jump,
    /// Grab, or drop what is held.
    Interact,
    Throw,
}

/// Everything one tick consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub analog: AnalogInput,
    /// Look delta accumulated since the last tick (raw units).
    pub look_delta: Vec2,
    /// Presses in arrival order.
    pub events: Vec<InputEvent>,
}

impl TickInput {
    /// Check if `event` was pressed this tick.
    pub fn pressed(&self, event: InputEvent) -> bool {
        self.events.contains(&event)
    }
}

/// Collects input between ticks.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    analog: AnalogInput,
    look_delta: Vec2,
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the analog state. The move axis is clamped to unit length.
    pub fn set_analog(&mut self, analog: AnalogInput) {
        self.analog = AnalogInput {
            move_axis: analog.move_axis.clamp_length_max(1.0),
            ..analog
        };
    }

    pub fn set_move(&mut self, move_axis: Vec2) {
        self.set_analog(AnalogInput { move_axis, ..self.analog });
    }

    pub fn set_crouch(&mut self, held: bool) {
        self.analog.crouch_held = held;
    }

    /// Add a raw look delta.
    pub fn look(&mut self, delta: Vec2) {
        self.look_delta += delta;
    }

    /// Queue a press.
    pub fn press(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn analog(&self) -> AnalogInput {
        self.analog
    }

    /// Take everything for this tick. Presses and look delta are consumed;
    /// analog state carries over.
    pub fn drain(&mut self) -> TickInput {
        TickInput {
            analog: self.analog,
            look_delta: std::mem::take(&mut self.look_delta),
            events: self.events.drain(..).collect(),
        }
    }
}
