//! Collision detection for locomotion and interaction.
//!
//! This module provides world collision testing with capsule, box and sphere
//! shapes, backed by parry3d.
//!
//! # Key Types
//!
//! - [`CollisionWorld`]: Static brushes plus colliders that follow bodies
//! - [`CollisionQuery`]: The query surface the movement code is written against
//! - [`TraceResult`]: Output from a swept-shape trace
//! - [`TraceShape`]: Shape used for tracing
//!
//! # Tracing Algorithm
//!
//! Sweeps march the shape along its path against each collider, then bisect
//! the first overlapping step to locate the impact. Normals and contact points
//! come from a parry contact query at the impact position.

mod flags;
mod query;
mod trace;
mod world;

pub use flags::ContentFlags;
pub use query::{CollisionQuery, HitBody, QueryFilter, QueryHit};
pub use trace::{TraceResult, TraceShape};
pub use world::{Collider, CollisionWorld};
