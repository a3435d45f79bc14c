//! Rigid bodies driven by the locomotion core and the grab constraint.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::{ContentFlags, HitBody, TraceShape};

/// Stable identity of a body for the lifetime of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Collision shape of a body.
///
/// Both shapes are positioned by their bottom-center, so a body's `position`
/// is where its feet (or base) rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    /// Upright capsule; never rotates with the body.
    Capsule { radius: f32, height: f32 },
    /// Box rotated by the body orientation.
    Box { half_extents: Vec3 },
}

impl BodyShape {
    /// The equivalent shape for collision traces.
    pub fn trace_shape(&self) -> TraceShape {
        match *self {
            Self::Capsule { radius, height } => TraceShape::Capsule { radius, height },
            Self::Box { half_extents } => TraceShape::Box { half_extents },
        }
    }

    /// Total height of the shape.
    pub fn height(&self) -> f32 {
        self.trace_shape().height()
    }

    /// Scalar moment of inertia for a body of `mass` with this shape.
    ///
    /// Capsules are rotation-locked and report zero, which the integrator
    /// treats as infinite inertia.
    fn inertia(&self, mass: f32) -> f32 {
        match *self {
            Self::Capsule { .. } => 0.0,
            // Average of the three principal moments of a solid cuboid
            Self::Box { half_extents } => mass * (2.0 / 9.0) * half_extents.length_squared(),
        }
    }
}

/// A simulated rigid body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub shape: BodyShape,

    /// Bottom-center of the shape in world space.
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,

    /// Mass in kilograms. Zero for immovable bodies.
    pub mass: f32,

    /// Content flags of the collider that follows this body.
    pub contents: ContentFlags,

    /// Kinematic bodies ignore every force and are moved only by their velocity.
    pub kinematic: bool,

    /// Multiplier applied to world gravity.
    pub gravity_scale: f32,

    /// Fraction of linear velocity removed per second.
    pub linear_damping: f32,

    /// Fraction of angular velocity removed per second.
    pub angular_damping: f32,

    /// Planar deceleration while resting on a surface (m/s²). Players get
    /// their friction from the motor and leave this at zero.
    pub ground_friction: f32,

    #[serde(skip)]
    pub(crate) pending_acceleration: Vec3,
    #[serde(skip)]
    pub(crate) pending_angular_acceleration: Vec3,
}

impl Body {
    /// Create a body at the origin with no velocity.
    pub fn new(id: BodyId, shape: BodyShape, mass: f32, contents: ContentFlags) -> Self {
        Self {
            id,
            shape,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass,
            contents,
            kinematic: false,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.05,
            ground_friction: 0.0,
            pending_acceleration: Vec3::ZERO,
            pending_angular_acceleration: Vec3::ZERO,
        }
    }

    /// Builder: place the body.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder: mark the body kinematic.
    pub fn with_kinematic(mut self, kinematic: bool) -> Self {
        self.kinematic = kinematic;
        self
    }

    /// Builder: set resting friction.
    pub fn with_ground_friction(mut self, friction: f32) -> Self {
        self.ground_friction = friction;
        self
    }

    /// Builder: set gravity scale (0 disables gravity for this body).
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Whether forces have any effect on this body.
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        !self.kinematic && self.mass > 0.0
    }

    /// Whether the body can rotate.
    #[inline]
    pub fn can_rotate(&self) -> bool {
        self.is_dynamic() && self.shape.inertia(self.mass) > 0.0
    }

    /// Geometric center of the shape, used as the center of mass.
    pub fn center_of_mass(&self) -> Vec3 {
        let offset = self.shape.trace_shape().center_offset();
        match self.shape {
            BodyShape::Capsule { .. } => self.position + offset,
            BodyShape::Box { .. } => self.position + self.orientation * offset,
        }
    }

    /// Inverse of the scalar moment of inertia, zero when rotation is locked.
    pub fn inverse_inertia(&self) -> f32 {
        if !self.is_dynamic() {
            return 0.0;
        }
        let inertia = self.shape.inertia(self.mass);
        if inertia > 0.0 {
            1.0 / inertia
        } else {
            0.0
        }
    }

    /// Velocity of a world-space point attached to this body.
    pub fn point_velocity(&self, point: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(point - self.center_of_mass())
    }

    /// Transform a body-local point into world space (relative to the center of mass).
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.center_of_mass() + self.orientation * local
    }

    /// Transform a world-space point into body-local space (relative to the center of mass).
    pub fn world_to_local(&self, world: Vec3) -> Vec3 {
        self.orientation.inverse() * (world - self.center_of_mass())
    }

    /// Snapshot handed to collision queries.
    pub fn hit_info(&self) -> HitBody {
        HitBody {
            id: self.id,
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
            center_of_mass: self.center_of_mass(),
            mass: self.mass,
            kinematic: self.kinematic,
        }
    }
}
