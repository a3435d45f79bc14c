//! The locomotion motor.
//!
//! Runs once per fixed tick after the ground sensor and suspension. It drives
//! the body with accelerations for the active [`MotorState`], fires buffered
//! jumps, evaluates the transition table once, and blends the capsule height
//! toward the height the new state wants.
//!
//! # Tick order
//!
//! 1. Pick up configuration edits (reapplying the target height at once)
//! 2. Per-state movement, including the jump check
//! 3. One transition evaluation
//! 4. Exponential height blend

use std::sync::Arc;

use glam::Vec3;
use tracing::{debug, trace};

use crate::collision::{CollisionQuery, ContentFlags, QueryFilter};
use crate::context::SimContext;
use crate::diag::WarnOnce;
use crate::dynamics::{Body, BodyId, BodyShape, Dynamics};
use crate::warn_once;

use super::config::{ConfigHandle, MovementConfig};
use super::ground::{GroundContact, GroundProbe};
use super::jump::JumpState;
use super::look::{forward, right};
use super::state::{next_state, MotorInput, MotorState, MotorTransition, TransitionInput};
use super::suspension::{SpringParams, SuspensionController};

/// Height differences below this are treated as converged (meters).
const HEIGHT_EPSILON: f32 = 1e-4;

/// Head clearance added to the stand-up check (meters).
const STAND_CLEARANCE: f32 = 0.05;

/// The stand-up probe is slightly thinner than the capsule so walls don't block it.
const STAND_PROBE_RADIUS_SCALE: f32 = 0.95;

/// What the motor did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorReport {
    pub transition: Option<MotorTransition>,
    pub jumped: bool,
    /// Capsule height after the blend.
    pub height: f32,
}

/// Fixed-tick locomotion state machine for one body.
#[derive(Debug)]
pub struct LocomotionMotor {
    body: BodyId,
    handle: ConfigHandle,
    config: Arc<MovementConfig>,
    config_version: u64,
    state: MotorState,
    jump: JumpState,
    missing_body: WarnOnce,
}

impl LocomotionMotor {
    /// Create a motor for `body`. Bodies start in [`MotorState::Air`].
    pub fn new(body: BodyId, handle: ConfigHandle) -> Self {
        let (config_version, config) = handle.load();
        Self {
            body,
            handle,
            config,
            config_version,
            state: MotorState::Air,
            jump: JumpState::new(),
            missing_body: WarnOnce::new(),
        }
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn handle(&self) -> &ConfigHandle {
        &self.handle
    }

    /// Capsule height the current state wants.
    pub fn target_height(&self) -> f32 {
        self.config.height(self.state.is_crouched())
    }

    /// Eye height above the body origin for the current state.
    pub fn eye_height(&self) -> f32 {
        self.config.eye_height(self.state.is_crouched())
    }

    /// Snap the capsule to the target height. Call once after spawning.
    pub fn initialize(&mut self, dynamics: &mut impl Dynamics) {
        self.apply_target_height(dynamics);
    }

    /// Swap to a different configuration slot and reapply derived state now.
    pub fn set_config(&mut self, handle: ConfigHandle, dynamics: &mut impl Dynamics) {
        if handle.same_slot(&self.handle) {
            return;
        }
        self.handle = handle;
        self.reload_config(dynamics);
    }

    /// Pick up an edit to the current slot immediately instead of at the next tick.
    pub fn refresh_config(&mut self, dynamics: &mut impl Dynamics) -> bool {
        if self.handle.version() == self.config_version {
            return false;
        }
        self.reload_config(dynamics);
        true
    }

    fn reload_config(&mut self, dynamics: &mut impl Dynamics) {
        let (version, config) = self.handle.load();
        self.config_version = version;
        self.config = config;
        debug!(body = %self.body, version, "motor picked up config change");
        self.apply_target_height(dynamics);
    }

    fn apply_target_height(&self, dynamics: &mut impl Dynamics) {
        dynamics.resize_capsule(self.body, self.target_height(), true);
    }

    /// Ground probe for `body` under the current configuration.
    pub fn ground_probe(&self, body: &Body) -> GroundProbe {
        GroundProbe {
            origin: body.center_of_mass(),
            radius: self.config.ground_probe_radius,
            max_distance: self.config.ground_probe_distance(),
            max_slope_deg: self.config.max_slope_deg,
        }
    }

    /// Suspension spring under the current configuration.
    pub fn spring_params(&self) -> SpringParams {
        SpringParams {
            rest_height: self.config.ride_height,
            k: self.config.spring_k,
            tolerance: self.config.hover_tolerance,
            max_accel: self.config.max_spring_accel,
        }
    }

    /// Filter for queries made on behalf of this body.
    pub fn ground_filter(&self) -> QueryFilter {
        QueryFilter::new(ContentFlags::MASK_GROUND).excluding(self.body)
    }

    /// Advance one tick.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        ctx: &SimContext,
        world: &impl CollisionQuery,
        dynamics: &mut impl Dynamics,
        ground: &GroundContact,
        suspension: &mut SuspensionController,
        input: &MotorInput,
    ) -> MotorReport {
        self.refresh_config(dynamics);

        if input.jump_pressed {
            self.jump.press(ctx.now);
        }

        let Some(body) = dynamics.body(self.body) else {
            warn_once!(self.missing_body, body = %self.body, "motor body missing; skipping tick");
            return MotorReport::default();
        };
        self.missing_body.reset();
        let velocity = body.velocity;

        // A jump owns the body until its suppression window ends
        let grounded = ground.grounded && !suspension.is_suppressed(ctx.now);
        let config = Arc::clone(&self.config);
        let mut jumped = false;

        match self.state {
            MotorState::Grounded => {
                let wish = wish_direction(input, ground.normal) * config.move_speed;
                self.accelerate_toward(dynamics, velocity, wish, config.accel, config.max_ground_speed, ctx.dt);
                jumped = self.try_jump(ctx, dynamics, ground, &config);
                apply_planar_friction(dynamics, self.body, velocity, config.ground_friction);
            }
            MotorState::Air => {
                let wish = wish_direction(input, Vec3::Y) * config.max_air_speed;
                self.accelerate_toward(dynamics, velocity, wish, config.air_accel, config.max_air_speed, ctx.dt);
                // Coyote time: a press just after walking off an edge still counts
                jumped = self.try_jump(ctx, dynamics, ground, &config);
            }
            MotorState::Slide => {
                let normal = ground.normal;
                let plane_velocity = velocity - normal * velocity.dot(normal);
                let gravity_along = ctx.gravity - normal * ctx.gravity.dot(normal);
                dynamics.apply_acceleration(self.body, -plane_velocity * config.slide_friction + gravity_along);
            }
            MotorState::Crawl => {
                self.set_height(dynamics, config.crawl_height);
                let wish = wish_direction(input, ground.normal) * config.crawl_speed;
                self.accelerate_toward(
                    dynamics,
                    velocity,
                    wish,
                    config.accel * config.crawl_accel_factor,
                    config.crawl_speed,
                    ctx.dt,
                );
                apply_planar_friction(dynamics, self.body, velocity, config.crawl_friction);
            }
        }

        if jumped {
            suspension.suppress_until(ctx.now + f64::from(config.jump_suspension_suppression));
        }

        let speed = dynamics.body(self.body).map_or(0.0, |b| b.velocity.length());
        let transition_input = TransitionInput {
            grounded,
            crouch_held: input.crouch_held,
            jumped,
            speed,
            slide_min_speed: config.slide_min_speed,
            slide_exit_speed: config.crawl_speed * config.slide_exit_factor,
        };
        let next = next_state(self.state, &transition_input, || self.can_stand(world, &*dynamics));

        let transition = (next != self.state).then(|| {
            let transition = MotorTransition { from: self.state, to: next };
            debug!(body = %self.body, from = %self.state, to = %next, speed, "motor state change");
            self.state = next;
            transition
        });

        let height = self.update_height(dynamics, ctx.dt);

        MotorReport {
            transition,
            jumped,
            height,
        }
    }

    fn try_jump(
        &mut self,
        ctx: &SimContext,
        dynamics: &mut impl Dynamics,
        ground: &GroundContact,
        config: &MovementConfig,
    ) -> bool {
        let fired = self.jump.try_fire(
            ctx.now,
            ground.last_grounded,
            config.jump_buffer,
            config.coyote_time,
            config.jump_suspension_suppression,
        );
        if !fired {
            return false;
        }

        let vertical = dynamics.body(self.body).map_or(0.0, |b| b.velocity.y);
        if vertical < 0.0 {
            dynamics.apply_velocity_change(self.body, Vec3::new(0.0, -vertical, 0.0));
        }
        let launch = config.jump_velocity(ctx.gravity.length());
        dynamics.apply_velocity_change(self.body, Vec3::Y * launch);
        trace!(body = %self.body, launch, "jump");
        true
    }

    /// Accelerate the planar velocity toward `target`, capping the change per tick.
    fn accelerate_toward(
        &self,
        dynamics: &mut impl Dynamics,
        velocity: Vec3,
        target: Vec3,
        accel: f32,
        max_speed: f32,
        dt: f32,
    ) {
        if dt <= 0.0 {
            return;
        }
        let current = Vec3::new(velocity.x, 0.0, velocity.z);
        let target = Vec3::new(target.x, 0.0, target.z).clamp_length_max(max_speed);
        let delta = (target - current).clamp_length_max(accel * dt);
        dynamics.apply_acceleration(self.body, delta / dt);
    }

    /// Whether the body can grow back to standing height without hitting anything.
    fn can_stand(&self, world: &impl CollisionQuery, dynamics: &impl Dynamics) -> bool {
        let Some(body) = dynamics.body(self.body) else {
            return false;
        };
        let BodyShape::Capsule { radius, height } = body.shape else {
            return true;
        };
        let reach = (self.config.stand_height - height).max(0.0) + STAND_CLEARANCE;
        let filter = QueryFilter::new(ContentFlags::MASK_PLAYER_SOLID).excluding(self.body);
        world
            .capsule_cast(
                body.position,
                radius * STAND_PROBE_RADIUS_SCALE,
                height,
                Vec3::Y,
                reach,
                &filter,
            )
            .is_none()
    }

    /// Set the capsule height directly, keeping the center of mass in place.
    fn set_height(&self, dynamics: &mut impl Dynamics, height: f32) {
        let current = dynamics.body(self.body).map(|b| b.shape.height());
        if current.is_some_and(|h| (h - height).abs() > HEIGHT_EPSILON) {
            dynamics.resize_capsule(self.body, height, true);
        }
    }

    /// Exponentially blend the capsule toward the target height.
    fn update_height(&self, dynamics: &mut impl Dynamics, dt: f32) -> f32 {
        let target = self.target_height();
        let Some(current) = dynamics.body(self.body).map(|b| b.shape.height()) else {
            return target;
        };
        let blended = blend_height(current, target, self.config.height_lerp_rate, dt);
        if (blended - current).abs() > 0.0 {
            dynamics.resize_capsule(self.body, blended, false);
        }
        blended
    }
}

/// One step of the exponential height blend. Snaps once within epsilon.
pub fn blend_height(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let t = 1.0 - (-rate * dt).exp();
    let next = current + (target - current) * t;
    if (target - next).abs() < HEIGHT_EPSILON {
        target
    } else {
        next
    }
}

/// Unit-ish wish direction projected onto the plane with normal `normal`,
/// scaled by stick deflection.
fn wish_direction(input: &MotorInput, normal: Vec3) -> Vec3 {
    let axis = input.clamped_axis();
    let raw = forward(input.yaw_deg) * axis.y + right(input.yaw_deg) * axis.x;
    let projected = raw - normal * raw.dot(normal);
    projected.normalize_or_zero() * axis.length()
}

/// Velocity-proportional planar friction.
fn apply_planar_friction(dynamics: &mut impl Dynamics, body: BodyId, velocity: Vec3, strength: f32) {
    let planar = Vec3::new(velocity.x, 0.0, velocity.z);
    dynamics.apply_acceleration(body, -planar * strength);
}
