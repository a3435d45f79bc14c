//! Kinetra Physics
//!
//! Collision queries, a small rigid-body store and the locomotion core for a
//! physics-driven first-person character.
//!
//! # Architecture
//!
//! - **Collision**: parry3d-backed world answering sweeps, raycasts and overlaps
//! - **Dynamics**: bodies, the force-application service, the collide-and-slide
//!   integrator and the compliant joint used for held objects
//! - **Movement**: ground sensing, hover suspension, look integration and the
//!   locomotion state machine
//!
//! Every component takes a [`SimContext`] carrying the tick clock and gravity,
//! and reaches the world only through the [`CollisionQuery`] and [`Dynamics`]
//! traits.

pub mod collision;
pub mod context;
pub mod diag;
pub mod dynamics;
pub mod movement;

// Re-export commonly used types
pub use collision::{CollisionQuery, CollisionWorld, ContentFlags, QueryFilter, QueryHit, TraceResult, TraceShape};
pub use context::{SimContext, STANDARD_GRAVITY};
pub use diag::WarnOnce;
pub use dynamics::{Body, BodyId, BodySet, BodyShape, CompliantJoint, Dynamics, JointLimits, StepReport};
pub use movement::{
    ConfigHandle, GroundContact, GroundSensor, LocomotionMotor, LookConfig, LookIntegrator, LookSnapshot,
    MotorInput, MotorState, MotorTransition, MovementConfig, SuspensionController,
};
