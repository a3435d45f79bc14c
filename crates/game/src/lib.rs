//! Kinetra Game
//!
//! Composes the physics and authority crates into a runnable world:
//!
//! - [`Player`]: one participant's body, motor, look, grab and contact proxy
//! - [`GrabInteractor`]: pick up, carry and throw light props
//! - [`AuthorityGate`]: drops writes to bodies the participant does not hold
//! - [`Simulation`]: the fixed-tick driver
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Simulation                           │
//! │  ┌────────┐   ┌──────────────────────┐   ┌────────────────┐  │
//! │  │ Input  │──►│ Player               │──►│ BodySet        │  │
//! │  │ Queue  │   │ motor · grab · look  │   │ (step, sync)   │  │
//! │  └────────┘   └──────────┬───────────┘   └────────────────┘  │
//! │                          │ AuthorityGate                      │
//! │                 ┌────────▼─────────┐                          │
//! │                 │ LeaseArbiter     │ contact / grab leases    │
//! │                 └──────────────────┘                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod contacts;
pub mod gate;
pub mod grab;
pub mod input;
pub mod player;
pub mod simulation;

pub use config::{ConfigError, InteractionConfig, SimulationConfig};
pub use contacts::{push_impulse, ContactChanges, ContactTracker};
pub use gate::AuthorityGate;
pub use grab::{GrabInteractor, HeldConstraint, Viewpoint};
pub use input::{AnalogInput, InputEvent, InputQueue, TickInput};
pub use player::{Player, PlayerTickReport};
pub use simulation::{Simulation, TickReport};

// Re-export the types callers need to drive a simulation
pub use kinetra_authority::{LeaseConfig, LeaseNotice, ParticipantId};
pub use kinetra_physics::{BodyId, LookConfig, MotorState, MotorTransition, MovementConfig};
