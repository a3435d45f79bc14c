//! Picking up, carrying and throwing dynamic bodies.
//!
//! A grab asks the arbiter for a lease and attaches a [`CompliantJoint`]
//! straight away; the joint's forces go through the authority gate, so the
//! body only starts following once the grant arrives. If the lease ends up
//! with someone else, the grab is dropped on the next reconcile.

use glam::{Quat, Vec3};
use kinetra_authority::{AuthorityChannel, HasAuthority};
use kinetra_physics::dynamics::JointFrame;
use kinetra_physics::movement::{view_rotation, yaw_rotation};
use kinetra_physics::{BodyId, CollisionQuery, CompliantJoint, ContentFlags, Dynamics, QueryFilter};
use tracing::{debug, info};

use crate::config::InteractionConfig;

/// Where the player is looking from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    /// Eye position.
    pub origin: Vec3,
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    /// Velocity of the eye (the player body's velocity).
    pub velocity: Vec3,
}

impl Viewpoint {
    pub fn rotation(&self) -> Quat {
        view_rotation(self.yaw_deg, self.pitch_deg)
    }

    /// Unit view direction.
    pub fn direction(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    pub fn yaw_rotation(&self) -> Quat {
        yaw_rotation(self.yaw_deg)
    }

    fn frame(&self) -> JointFrame {
        JointFrame {
            origin: self.origin,
            rotation: self.rotation(),
            velocity: self.velocity,
        }
    }
}

/// A body currently carried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeldConstraint {
    pub body: BodyId,
    pub joint: CompliantJoint,
    /// The lease grant has been seen.
    pub confirmed: bool,
}

/// Grab, carry and throw for one player.
#[derive(Debug, Clone)]
pub struct GrabInteractor {
    config: InteractionConfig,
    /// The player's own body, never grabbable.
    owner: BodyId,
    held: Option<HeldConstraint>,
}

impl GrabInteractor {
    pub fn new(owner: BodyId, config: InteractionConfig) -> Self {
        Self {
            config,
            owner,
            held: None,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: InteractionConfig) {
        self.config = config;
    }

    pub fn held(&self) -> Option<&HeldConstraint> {
        self.held.as_ref()
    }

    pub fn held_body(&self) -> Option<BodyId> {
        self.held.map(|h| h.body)
    }

    /// Grab what the viewpoint is aimed at, or let go of what is held.
    ///
    /// Letting go of a grab whose grant has not arrived cancels it: the
    /// release queues behind the request, so the arbiter frees the body
    /// again or ignores it if someone else won. Returns `true` if something
    /// was grabbed or released.
    pub fn try_interact(
        &mut self,
        view: &Viewpoint,
        world: &impl CollisionQuery,
        dynamics: &impl Dynamics,
        channel: &impl AuthorityChannel,
        authority: &impl HasAuthority,
    ) -> bool {
        if let Some(held) = self.held {
            self.drop_held();
            channel.release_lease(held.body);
            if authority.has_authority(held.body, channel.participant()) {
                info!(body = %held.body, participant = %channel.participant(), "released");
            } else {
                debug!(body = %held.body, participant = %channel.participant(), "grant not seen; grab cancelled");
            }
            return true;
        }

        let filter = QueryFilter::new(ContentFlags::MASK_INTERACT).excluding(self.owner);
        let Some(hit) = world.raycast(view.origin, view.direction(), self.config.use_distance, &filter) else {
            return false;
        };
        let Some(target) = hit.body.filter(|b| b.is_dynamic()) else {
            return false;
        };
        if target.mass > self.config.max_grab_mass {
            debug!(body = %target.id, mass = target.mass, "too heavy to grab");
            return false;
        }
        if !authority.is_free(target.id) {
            debug!(body = %target.id, "body is leased; grab refused");
            return false;
        }
        let Some(body) = dynamics.body(target.id) else {
            return false;
        };

        channel.request_lease(target.id);
        let joint = CompliantJoint::attach(
            view.yaw_rotation(),
            Vec3::Z * self.config.hold_distance,
            body,
            hit.point,
            self.config.joint_limits(),
        );
        self.held = Some(HeldConstraint {
            body: target.id,
            joint,
            confirmed: false,
        });
        info!(body = %target.id, participant = %channel.participant(), "grabbed");
        true
    }

    /// Throw the held body along the view direction.
    ///
    /// The joint is removed first; the captured body then gets the velocity
    /// change. The release is sent even before the grant is seen, so a
    /// request still in flight never leaves a pinned lease behind.
    pub fn try_throw(
        &mut self,
        view: &Viewpoint,
        dynamics: &mut impl Dynamics,
        channel: &impl AuthorityChannel,
    ) -> Option<BodyId> {
        let body = self.held?.body;
        self.drop_held();

        dynamics.apply_velocity_change(body, view.direction() * self.config.throw_impulse);
        channel.release_lease(body);
        info!(%body, participant = %channel.participant(), "thrown");
        Some(body)
    }

    /// Track lease changes. Drops the grab once another participant holds the
    /// body, the lease was revoked after being granted, or the body is gone.
    pub fn reconcile(&mut self, dynamics: &impl Dynamics, channel: &impl AuthorityChannel, authority: &impl HasAuthority) {
        let Some(held) = self.held.as_mut() else {
            return;
        };
        let me = channel.participant();
        let stale = match authority.holder(held.body) {
            Some(holder) if holder == me => {
                held.confirmed = true;
                false
            }
            Some(_) => true,
            None => held.confirmed,
        } || dynamics.body(held.body).is_none();

        if stale {
            debug!(body = %held.body, participant = %me, "grab lost authority; dropping");
            self.drop_held();
        }
    }

    /// Drive the held body toward the point in front of the viewpoint.
    pub fn tick(&mut self, view: &Viewpoint, dynamics: &mut impl Dynamics) {
        let Some(held) = self.held else {
            return;
        };
        let Some(body) = dynamics.body(held.body) else {
            self.drop_held();
            return;
        };
        let drive = held.joint.solve(&view.frame(), view.yaw_rotation(), body);
        let mass = body.mass;

        dynamics.apply_force_at_point(held.body, drive.acceleration * mass, drive.anchor_world);
        dynamics.apply_angular_acceleration(held.body, drive.angular_acceleration);
    }

    /// Forget the held body. Idempotent.
    pub fn drop_held(&mut self) {
        self.held = None;
    }
}
