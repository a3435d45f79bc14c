//! Jump buffering and coyote time.
//!
//! A press is remembered for the buffer window; it fires once the body has
//! also been grounded within the coyote window. Both windows must hold at the
//! same time. After firing, the press is consumed and a short cooldown stops
//! the same ground contact from launching a second jump.

use serde::{Deserialize, Serialize};

/// Whether a jump should fire at `now`.
///
/// Both the buffered press and the coyote grace must be satisfied.
pub fn jump_ready(now: f64, last_pressed: f64, last_grounded: f64, buffer: f32, coyote: f32) -> bool {
    let buffered = now - last_pressed <= f64::from(buffer);
    let coyote = now - last_grounded <= f64::from(coyote);
    buffered && coyote
}

/// Jump input memory for one body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JumpState {
    /// Time of the most recent unconsumed press.
    last_pressed: f64,
    /// No jump may fire before this time.
    cooldown_until: f64,
}

impl Default for JumpState {
    fn default() -> Self {
        Self {
            last_pressed: f64::NEG_INFINITY,
            cooldown_until: f64::NEG_INFINITY,
        }
    }
}

impl JumpState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a jump press.
    pub fn press(&mut self, now: f64) {
        self.last_pressed = now;
    }

    /// Time of the pending press, `NEG_INFINITY` when none.
    pub fn last_pressed(&self) -> f64 {
        self.last_pressed
    }

    /// Check if a press is still inside the buffer window.
    pub fn is_buffered(&self, now: f64, buffer: f32) -> bool {
        now - self.last_pressed <= f64::from(buffer)
    }

    /// Fire the jump if the windows line up; consumes the press on success.
    pub fn try_fire(&mut self, now: f64, last_grounded: f64, buffer: f32, coyote: f32, cooldown: f32) -> bool {
        if now < self.cooldown_until {
            return false;
        }
        if !jump_ready(now, self.last_pressed, last_grounded, buffer, coyote) {
            return false;
        }
        self.last_pressed = f64::NEG_INFINITY;
        self.cooldown_until = now + f64::from(cooldown);
        true
    }

    /// Forget any pending press.
    pub fn clear(&mut self) {
        self.last_pressed = f64::NEG_INFINITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUFFER: f32 = 0.12;
    const COYOTE: f32 = 0.12;

    #[test]
    fn test_fires_inside_coyote() {
        // Pressed at t=0, last grounded at t=-0.10
        assert!(jump_ready(0.0, 0.0, -0.10, BUFFER, COYOTE));
    }

    #[test]
    fn test_blocked_outside_coyote() {
        // Pressed at t=0, last grounded at t=-0.20
        assert!(!jump_ready(0.0, 0.0, -0.20, BUFFER, COYOTE));
    }

    #[test]
    fn test_blocked_outside_buffer() {
        assert!(!jump_ready(0.0, -0.2, 0.0, BUFFER, COYOTE));
        assert!(!jump_ready(0.0, f64::NEG_INFINITY, 0.0, BUFFER, COYOTE));
    }

    #[test]
    fn test_window_edges_are_inclusive() {
        assert!(jump_ready(0.25, 0.125, 0.125, 0.125, 0.125));
    }

    #[test]
    fn test_buffered_press_fires_on_landing() {
        let mut jump = JumpState::new();
        jump.press(1.0);

        // Still airborne, last grounded long ago
        assert!(!jump.try_fire(1.05, 0.5, BUFFER, COYOTE, 0.2));
        // Lands inside the buffer
        assert!(jump.try_fire(1.1, 1.1, BUFFER, COYOTE, 0.2));
        // Press consumed
        assert!(!jump.is_buffered(1.1, BUFFER));
        assert!(!jump.try_fire(1.11, 1.11, BUFFER, COYOTE, 0.2));
    }

    #[test]
    fn test_cooldown_blocks_double_jump() {
        let mut jump = JumpState::new();
        jump.press(0.0);
        assert!(jump.try_fire(0.0, 0.0, BUFFER, COYOTE, 0.2));

        // Pressed again while the probe still sees ground
        jump.press(0.05);
        assert!(!jump.try_fire(0.05, 0.05, BUFFER, COYOTE, 0.2));
        // Buffered press survives until the cooldown ends
        assert!(!jump.try_fire(0.16, 0.16, BUFFER, COYOTE, 0.2));
        assert!(jump.is_buffered(0.16, BUFFER));
    }
}
