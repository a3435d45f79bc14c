//! Authority-gated access to bodies.

use glam::Vec3;
use kinetra_authority::{HasAuthority, ParticipantId};
use kinetra_physics::{Body, BodyId, Dynamics};
use tracing::trace;

/// [`Dynamics`] wrapper that drops writes the participant has no authority for.
///
/// A participant may drive its own player body, bodies it holds a lease on
/// and, if it is the host, every free body. Reads always pass.
pub struct AuthorityGate<'a, D, A> {
    inner: &'a mut D,
    authority: &'a A,
    participant: ParticipantId,
    own_body: BodyId,
}

impl<'a, D: Dynamics, A: HasAuthority> AuthorityGate<'a, D, A> {
    pub fn new(inner: &'a mut D, authority: &'a A, participant: ParticipantId, own_body: BodyId) -> Self {
        Self {
            inner,
            authority,
            participant,
            own_body,
        }
    }

    /// Whether writes to `body` go through.
    pub fn may_write(&self, body: BodyId) -> bool {
        if body == self.own_body {
            return true;
        }
        match self.authority.holder(body) {
            Some(holder) => holder == self.participant,
            None => self.participant == ParticipantId::HOST,
        }
    }

    fn check(&self, body: BodyId) -> bool {
        let allowed = self.may_write(body);
        if !allowed {
            trace!(participant = %self.participant, %body, "write without authority dropped");
        }
        allowed
    }
}

impl<D: Dynamics, A: HasAuthority> Dynamics for AuthorityGate<'_, D, A> {
    fn body(&self, id: BodyId) -> Option<&Body> {
        self.inner.body(id)
    }

    fn apply_velocity_change(&mut self, id: BodyId, delta_v: Vec3) {
        if self.check(id) {
            self.inner.apply_velocity_change(id, delta_v);
        }
    }

    fn apply_acceleration(&mut self, id: BodyId, acceleration: Vec3) {
        if self.check(id) {
            self.inner.apply_acceleration(id, acceleration);
        }
    }

    fn apply_force_at_point(&mut self, id: BodyId, force: Vec3, point: Vec3) {
        if self.check(id) {
            self.inner.apply_force_at_point(id, force, point);
        }
    }

    fn apply_angular_acceleration(&mut self, id: BodyId, acceleration: Vec3) {
        if self.check(id) {
            self.inner.apply_angular_acceleration(id, acceleration);
        }
    }

    fn resize_capsule(&mut self, id: BodyId, height: f32, keep_center: bool) {
        if self.check(id) {
            self.inner.resize_capsule(id, height, keep_center);
        }
    }
}
