//! Ground classification from a downward sphere probe.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{CollisionQuery, HitBody, QueryFilter};
use crate::context::SimContext;
use crate::diag::WarnOnce;
use crate::warn_once;

/// What the body is standing on this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundContact {
    pub grounded: bool,
    /// Surface normal, `Vec3::Y` when airborne.
    pub normal: Vec3,
    /// Probe travel to the surface (meters).
    pub distance: f32,
    /// Contact point on the surface.
    pub point: Vec3,
    /// Velocity of the surface at the contact point.
    pub surface_velocity: Vec3,
    /// Angle between the normal and up (degrees).
    pub slope_deg: f32,
    /// Body under the contact, `None` for static geometry.
    pub body: Option<HitBody>,
    /// Last time the sensor reported ground (seconds).
    pub last_grounded: f64,
}

impl GroundContact {
    /// Airborne contact carrying forward the last grounded time.
    pub fn airborne(last_grounded: f64) -> Self {
        Self {
            grounded: false,
            normal: Vec3::Y,
            distance: f32::INFINITY,
            point: Vec3::ZERO,
            surface_velocity: Vec3::ZERO,
            slope_deg: 0.0,
            body: None,
            last_grounded,
        }
    }
}

impl Default for GroundContact {
    fn default() -> Self {
        Self::airborne(f64::NEG_INFINITY)
    }
}

/// Probe parameters for [`GroundSensor::sense`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProbe {
    /// Probe origin, normally the body's center of mass.
    pub origin: Vec3,
    pub radius: f32,
    pub max_distance: f32,
    pub max_slope_deg: f32,
}

/// Classifies ground contact once per tick and remembers when the body was
/// last grounded for the coyote window.
#[derive(Debug, Default)]
pub struct GroundSensor {
    contact: GroundContact,
    missing_probe: WarnOnce,
}

impl GroundSensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result of the most recent [`sense`](Self::sense).
    pub fn contact(&self) -> &GroundContact {
        &self.contact
    }

    /// Last time ground was sensed.
    pub fn last_grounded(&self) -> f64 {
        self.contact.last_grounded
    }

    /// Cast the probe and classify the first surface shallow enough to stand on.
    ///
    /// Steeper surfaces are treated as walls and skipped.
    pub fn sense(
        &mut self,
        ctx: &SimContext,
        world: &impl CollisionQuery,
        probe: &GroundProbe,
        filter: &QueryFilter,
    ) -> GroundContact {
        let last_grounded = self.contact.last_grounded;

        if probe.radius <= 0.0 || probe.max_distance <= 0.0 {
            warn_once!(
                self.missing_probe,
                radius = probe.radius,
                distance = probe.max_distance,
                "ground probe has no extent; reporting airborne"
            );
            self.contact = GroundContact::airborne(last_grounded);
            return self.contact;
        }

        let hits = world.sphere_cast(probe.origin, probe.radius, Vec3::NEG_Y, probe.max_distance, filter);

        let ground = hits.iter().find_map(|hit| {
            let slope = slope_angle_deg(hit.normal);
            (slope <= probe.max_slope_deg).then_some((hit, slope))
        });

        self.contact = match ground {
            Some((hit, slope)) => GroundContact {
                grounded: true,
                normal: hit.normal,
                distance: hit.distance,
                point: hit.point,
                surface_velocity: hit.surface_velocity(),
                slope_deg: slope,
                body: hit.body,
                last_grounded: ctx.now,
            },
            None => GroundContact::airborne(last_grounded),
        };
        self.contact
    }
}

/// Angle between a surface normal and world up (degrees).
pub fn slope_angle_deg(normal: Vec3) -> f32 {
    normal.normalize_or_zero().dot(Vec3::Y).clamp(-1.0, 1.0).acos().to_degrees()
}
