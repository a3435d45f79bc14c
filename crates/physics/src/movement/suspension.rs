//! Hover suspension holding the body at ride height.
//!
//! The body floats on a critically damped spring instead of resting its
//! capsule on the floor. The spring only ever pushes away from the ground:
//! it never pulls the body down, so it cannot fight gravity while airborne
//! at the edges of the state machine. Descending slopes are followed by
//! gravity alone.

use glam::Vec3;

use crate::collision::{CollisionQuery, QueryFilter, QueryHit};
use crate::context::SimContext;
use crate::dynamics::{BodyId, Dynamics};

/// Extra ray length past the ride height.
const RAY_MARGIN: f32 = 1.0;

/// Spring tunables for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    /// Target distance from the ray origin to the ground.
    pub rest_height: f32,
    /// Spring constant in acceleration units (1/s²).
    pub k: f32,
    /// Dead zone half-width around the rest height.
    pub tolerance: f32,
    /// Cap on the output acceleration.
    pub max_accel: f32,
}

impl SpringParams {
    /// Critical damping coefficient for this spring in acceleration units.
    pub fn damping(&self) -> f32 {
        2.0 * self.k.max(1.0).sqrt()
    }
}

/// Acceleration along the contact normal for a height error and relative normal velocity.
///
/// `error` is `rest_height - hit_distance` (positive when too low).
/// Only a closing (negative) `normal_velocity` is damped, and the result is
/// clamped to `[0, max_accel]`.
pub fn spring_acceleration(error: f32, normal_velocity: f32, params: &SpringParams) -> f32 {
    if error.abs() < params.tolerance {
        return 0.0;
    }
    let closing = normal_velocity.min(0.0);
    (error * params.k - closing * params.damping()).clamp(0.0, params.max_accel)
}

/// What the suspension did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SuspensionOutput {
    /// Acceleration applied along the contact normal.
    pub acceleration: f32,
    /// Height error that produced it.
    pub error: f32,
    /// Ground the ray hit, if any.
    pub hit: Option<QueryHit>,
}

/// Applies the hover spring and tracks the post-jump suppression window.
#[derive(Debug, Clone, Default)]
pub struct SuspensionController {
    suppressed_until: f64,
}

impl SuspensionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the spring off until `until` (seconds).
    pub fn suppress_until(&mut self, until: f64) {
        self.suppressed_until = self.suppressed_until.max(until);
    }

    pub fn suppressed_until(&self) -> f64 {
        self.suppressed_until
    }

    #[inline]
    pub fn is_suppressed(&self, now: f64) -> bool {
        now < self.suppressed_until
    }

    /// Cast down from `origin` and push `body` toward the rest height.
    ///
    /// A dynamic body underneath receives the opposite force at the hit point.
    pub fn apply(
        &self,
        ctx: &SimContext,
        world: &impl CollisionQuery,
        dynamics: &mut impl Dynamics,
        body: BodyId,
        origin: Vec3,
        params: &SpringParams,
        filter: &QueryFilter,
    ) -> SuspensionOutput {
        if self.is_suppressed(ctx.now) {
            return SuspensionOutput::default();
        }

        let Some(velocity) = dynamics.body(body).map(|b| b.velocity) else {
            return SuspensionOutput::default();
        };

        let Some(hit) = world.raycast(origin, Vec3::NEG_Y, params.rest_height + RAY_MARGIN, filter) else {
            return SuspensionOutput::default();
        };

        let error = params.rest_height - hit.distance;
        let normal_velocity = (velocity - hit.surface_velocity()).dot(hit.normal);
        let acceleration = spring_acceleration(error, normal_velocity, params);

        if acceleration > 0.0 {
            dynamics.apply_acceleration(body, hit.normal * acceleration);

            if let Some(ground) = hit.body.filter(|b| b.is_dynamic()) {
                let mass = dynamics.body(body).map_or(0.0, |b| b.mass);
                dynamics.apply_force_at_point(ground.id, -hit.normal * acceleration * mass, hit.point);
            }
        }

        SuspensionOutput {
            acceleration,
            error,
            hit: Some(hit),
        }
    }
}
