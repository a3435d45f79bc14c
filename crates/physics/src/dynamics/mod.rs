//! Bodies and the forces applied to them.
//!
//! A small integrator: bodies are capsules or boxes, moved with
//! semi-implicit Euler and a collide-and-slide pass. The locomotion core and
//! the grab constraint push on these bodies.
//!
//! # Key Types
//!
//! - [`BodySet`]: Owns every body and integrates them once per tick
//! - [`Dynamics`]: The force-application service the rest of the engine writes through
//! - [`CompliantJoint`]: Soft position/orientation link used to carry bodies

mod body;
mod joint;
mod set;
mod slide_move;

pub use body::{Body, BodyId, BodyShape};
pub use joint::{CompliantJoint, JointDrive, JointFrame, JointLimits};
pub use set::{BodyContact, BodySet, Dynamics, StepReport};
pub use slide_move::{clip_velocity, slide_move, SlideContact, SlideOutcome};
