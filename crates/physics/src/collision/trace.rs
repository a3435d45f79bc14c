//! Trace results and shapes for collision queries.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::dynamics::BodyId;

use super::flags::ContentFlags;

/// Outcome of one swept-shape query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceResult {
    /// Fraction of the requested motion completed, in `[0, 1]`. Anything
    /// below 1 means the sweep stopped against a surface.
    pub fraction: f32,

    /// Where the shape origin ended up.
    pub end_position: Vec3,

    /// Normal of the blocking surface, facing the mover.
    pub hit_normal: Option<Vec3>,

    /// Estimated contact point on the blocking surface.
    pub hit_point: Option<Vec3>,

    pub hit_contents: ContentFlags,

    /// The shape overlapped geometry at its start position.
    pub started_in_solid: bool,

    /// The shape overlapped geometry along the whole sweep.
    pub all_solid: bool,

    /// Owner of the blocking collider; `None` for level geometry.
    pub hit_body: Option<BodyId>,
}

impl Default for TraceResult {
    fn default() -> Self {
        Self::no_hit(Vec3::ZERO)
    }
}

impl TraceResult {
    /// A sweep that completed its full motion and ended at `end_position`.
    pub fn no_hit(end_position: Vec3) -> Self {
        Self {
            fraction: 1.0,
            end_position,
            hit_normal: None,
            hit_point: None,
            hit_contents: ContentFlags::EMPTY,
            started_in_solid: false,
            all_solid: false,
            hit_body: None,
        }
    }

    #[inline]
    pub fn hit_something(&self) -> bool {
        self.fraction < 1.0
    }

    /// Blocking normal, or world up when nothing blocked.
    #[inline]
    pub fn normal_or_up(&self) -> Vec3 {
        self.hit_normal.unwrap_or(Vec3::Y)
    }
}

/// Shapes the world can sweep.
///
/// Capsules and boxes are placed by their bottom-center; spheres and points
/// by their center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TraceShape {
    /// Upright capsule. `height` runs from the bottom of the lower cap to the
    /// top of the upper one.
    Capsule { radius: f32, height: f32 },
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Zero-size shape for ray queries.
    Point,
}

impl TraceShape {
    /// Horizontal reach from the vertical axis.
    pub fn radius(&self) -> f32 {
        match self {
            Self::Capsule { radius, .. } | Self::Sphere { radius } => *radius,
            Self::Box { half_extents } => half_extents.x.max(half_extents.z),
            Self::Point => 0.0,
        }
    }

    pub fn height(&self) -> f32 {
        match self {
            Self::Capsule { height, .. } => *height,
            Self::Box { half_extents } => half_extents.y * 2.0,
            Self::Sphere { radius } => radius * 2.0,
            Self::Point => 0.0,
        }
    }

    /// Vector from the placement origin to the geometric center.
    pub fn center_offset(&self) -> Vec3 {
        match self {
            Self::Capsule { height, .. } => Vec3::Y * (height * 0.5),
            Self::Box { half_extents } => Vec3::Y * half_extents.y,
            Self::Sphere { .. } | Self::Point => Vec3::ZERO,
        }
    }
}
