//! Collision query service consumed by the locomotion core.
//!
//! The motor, suspension, ground sensor and grab code only ever talk to the
//! world through [`CollisionQuery`], so any physics backend that can answer
//! these four questions can drive them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::dynamics::BodyId;

use super::flags::ContentFlags;

/// Filter applied to every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFilter {
    /// Content mask; colliders that don't intersect it are skipped.
    pub mask: ContentFlags,
    /// Body whose colliders are ignored (usually the querying body itself).
    pub exclude: Option<BodyId>,
}

impl QueryFilter {
    /// Filter on a mask with no exclusions.
    pub fn new(mask: ContentFlags) -> Self {
        Self { mask, exclude: None }
    }

    /// Ignore colliders owned by `body`.
    pub fn excluding(mut self, body: BodyId) -> Self {
        self.exclude = Some(body);
        self
    }
}

/// Snapshot of the dynamic body behind a hit collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitBody {
    pub id: BodyId,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub center_of_mass: Vec3,
    pub mass: f32,
    pub kinematic: bool,
}

impl HitBody {
    /// Velocity of the body at a world-space point.
    pub fn point_velocity(&self, point: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(point - self.center_of_mass)
    }

    /// Whether forces applied to this body have any effect.
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        !self.kinematic && self.mass > 0.0
    }
}

/// A single query intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryHit {
    /// Distance traveled along the query direction before contact.
    pub distance: f32,
    /// World-space contact point on the hit surface.
    pub point: Vec3,
    /// Surface normal at the contact, pointing away from the surface.
    pub normal: Vec3,
    /// Content flags of the hit collider.
    pub contents: ContentFlags,
    /// The body behind the collider, `None` for static geometry.
    pub body: Option<HitBody>,
}

impl QueryHit {
    /// Velocity of the hit surface at the contact point.
    pub fn surface_velocity(&self) -> Vec3 {
        self.body
            .map(|b| b.point_velocity(self.point))
            .unwrap_or(Vec3::ZERO)
    }
}

/// Read-only collision queries.
pub trait CollisionQuery {
    /// Sweep a sphere and return every intersection along the path, nearest first.
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Vec<QueryHit>;

    /// Cast a ray and return the nearest intersection.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<QueryHit>;

    /// Sweep a vertical capsule (origin at its bottom) and return the nearest hit.
    fn capsule_cast(
        &self,
        bottom: Vec3,
        radius: f32,
        height: f32,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<QueryHit>;

    /// Return every collider overlapping a vertical capsule placed at `bottom`.
    fn capsule_overlap(
        &self,
        bottom: Vec3,
        radius: f32,
        height: f32,
        filter: &QueryFilter,
    ) -> Vec<QueryHit>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_velocity_includes_spin() {
        let body = HitBody {
            id: BodyId(3),
            velocity: Vec3::new(1.0, 0.0, 0.0),
            angular_velocity: Vec3::new(0.0, 1.0, 0.0),
            center_of_mass: Vec3::ZERO,
            mass: 10.0,
            kinematic: false,
        };
        // w x r = (0,1,0) x (1,0,0) = (0,0,-1)
        let v = body.point_velocity(Vec3::X);
        assert!((v - Vec3::new(1.0, 0.0, -1.0)).length() < 1e-6);
        assert!(body.is_dynamic());
    }

    #[test]
    fn test_static_surface_has_no_velocity() {
        let hit = QueryHit {
            distance: 1.0,
            point: Vec3::ZERO,
            normal: Vec3::Y,
            contents: ContentFlags::SOLID,
            body: None,
        };
        assert_eq!(hit.surface_velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_filter_builder() {
        let filter = QueryFilter::new(ContentFlags::MASK_GROUND).excluding(BodyId(7));
        assert_eq!(filter.exclude, Some(BodyId(7)));
        assert_eq!(filter.mask, ContentFlags::MASK_GROUND);
    }
}
