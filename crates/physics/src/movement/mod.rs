//! Player locomotion.
//!
//! A physics-driven character: the body is a dynamic capsule floating on a
//! hover spring, and every tick the components below run in a fixed order:
//!
//! 1. [`GroundSensor`] classifies the ground under the body
//! 2. [`SuspensionController`] pushes the body toward ride height
//! 3. [`LocomotionMotor`] applies movement forces and runs the state machine
//!
//! Look input is integrated separately by [`LookIntegrator`] and handed to
//! the motor as a yaw.
//!
//! Nothing here writes body state directly. All writes go through the
//! [`Dynamics`](crate::dynamics::Dynamics) service.

mod config;
mod ground;
mod jump;
mod look;
mod motor;
mod state;
mod suspension;

pub use config::{ConfigHandle, LookConfig, MovementConfig};
pub use ground::{slope_angle_deg, GroundContact, GroundProbe, GroundSensor};
pub use jump::{jump_ready, JumpState};
pub use look::{forward, lerp_angle, right, view_rotation, yaw_rotation, LookIntegrator, LookSnapshot, SnapshotFeed};
pub use motor::{blend_height, LocomotionMotor, MotorReport};
pub use state::{next_state, MotorInput, MotorState, MotorTransition, TransitionInput};
pub use suspension::{spring_acceleration, SpringParams, SuspensionController, SuspensionOutput};
