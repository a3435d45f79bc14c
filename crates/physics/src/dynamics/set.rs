//! Body storage, the force-application service and the integrator.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use tracing::{debug, trace};

use crate::collision::{CollisionWorld, ContentFlags, QueryFilter};

use super::body::{Body, BodyId, BodyShape};
use super::slide_move::{slide_move, SlideContact};

/// Normal Y above which a contact counts as resting on ground for friction.
const GROUND_CONTACT_NORMAL_Y: f32 = 0.7;

/// Force-application service.
///
/// Every write the locomotion core and the grab constraint make to a body
/// goes through this trait, so a host can gate writes by authority or
/// forward them elsewhere. Calls naming unknown or non-dynamic bodies are
/// ignored.
pub trait Dynamics {
    /// Read access to a body.
    fn body(&self, id: BodyId) -> Option<&Body>;

    /// Instantaneous change of linear velocity, independent of mass.
    fn apply_velocity_change(&mut self, id: BodyId, delta_v: Vec3);

    /// Continuous acceleration for the next integration step.
    fn apply_acceleration(&mut self, id: BodyId, acceleration: Vec3);

    /// Continuous force applied at a world-space point for the next step.
    fn apply_force_at_point(&mut self, id: BodyId, force: Vec3, point: Vec3);

    /// Continuous angular acceleration (rad/s²) for the next step.
    fn apply_angular_acceleration(&mut self, id: BodyId, acceleration: Vec3);

    /// Resize a capsule body. With `keep_center` set, the body is moved by
    /// half the height change so its center of mass stays put.
    fn resize_capsule(&mut self, id: BodyId, height: f32, keep_center: bool);
}

/// A body touched another body during integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyContact {
    /// The body that was moving.
    pub body: BodyId,
    pub contact: SlideContact,
}

/// What happened during one integration step.
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    /// Contacts between moving bodies and other bodies.
    pub contacts: Vec<BodyContact>,
    /// Bodies that started the step inside geometry and were pushed out.
    pub depenetrated: Vec<BodyId>,
}

/// Owning store of every body in the simulation.
#[derive(Debug, Default)]
pub struct BodySet {
    bodies: BTreeMap<BodyId, Body>,
    next_id: u32,
}

impl BodySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a body with a fresh id and return it for placement.
    pub fn spawn(&mut self, shape: BodyShape, mass: f32, contents: ContentFlags) -> &mut Body {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies
            .entry(id)
            .or_insert_with(|| Body::new(id, shape, mass, contents))
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        self.bodies.remove(&id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterate bodies in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    fn dynamic_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id).filter(|b| b.is_dynamic())
    }

    /// Integrate every body by `dt` against `world`.
    ///
    /// Accumulated accelerations are consumed. The collision world should be
    /// synced with [`CollisionWorld::sync_bodies`] before the next query.
    pub fn step(&mut self, world: &CollisionWorld, gravity: Vec3, dt: f32) -> StepReport {
        let mut report = StepReport::default();

        for body in self.bodies.values_mut() {
            if body.kinematic {
                body.position += body.velocity * dt;
                continue;
            }
            if !body.is_dynamic() {
                continue;
            }

            let filter = QueryFilter::new(ContentFlags::MASK_PLAYER_SOLID).excluding(body.id);
            let shape = body.shape.trace_shape();

            let resolved = world.resolve_penetration(body.position, shape, &filter);
            if resolved != body.position {
                trace!(body = %body.id, from = ?body.position, to = ?resolved, "depenetrating");
                body.position = resolved;
                report.depenetrated.push(body.id);
            }

            // Semi-implicit Euler: velocity first, then position
            let acceleration = gravity * body.gravity_scale + body.pending_acceleration;
            body.velocity += acceleration * dt;
            body.velocity *= (1.0 - body.linear_damping * dt).max(0.0);
            body.pending_acceleration = Vec3::ZERO;

            if body.can_rotate() {
                body.angular_velocity += body.pending_angular_acceleration * dt;
                body.angular_velocity *= (1.0 - body.angular_damping * dt).max(0.0);
            } else {
                body.angular_velocity = Vec3::ZERO;
            }
            body.pending_angular_acceleration = Vec3::ZERO;

            let mut position = body.position;
            let mut velocity = body.velocity;
            let outcome = slide_move(world, &mut position, &mut velocity, shape, dt, &filter);
            body.position = position;
            body.velocity = velocity;

            if body.can_rotate() {
                let spin = body.angular_velocity * dt;
                body.orientation = (Quat::from_scaled_axis(spin) * body.orientation).normalize();
            }

            let resting = outcome
                .contacts
                .iter()
                .any(|c| c.normal.y > GROUND_CONTACT_NORMAL_Y);
            if resting && body.ground_friction > 0.0 {
                apply_ground_friction(body, dt);
            }

            report.contacts.extend(
                outcome
                    .contacts
                    .iter()
                    .filter(|c| c.other.is_some())
                    .map(|&contact| BodyContact { body: body.id, contact }),
            );
        }

        report
    }
}

/// Decelerate planar and angular motion of a body resting on a surface.
fn apply_ground_friction(body: &mut Body, dt: f32) {
    let planar = Vec3::new(body.velocity.x, 0.0, body.velocity.z);
    let speed = planar.length();
    if speed > 0.0 {
        let drop = (body.ground_friction * dt).min(speed);
        body.velocity -= planar * (drop / speed);
    }
    body.angular_velocity *= (1.0 - body.ground_friction * dt).max(0.0);
}

impl Dynamics for BodySet {
    fn body(&self, id: BodyId) -> Option<&Body> {
        self.get(id)
    }

    fn apply_velocity_change(&mut self, id: BodyId, delta_v: Vec3) {
        if let Some(body) = self.dynamic_mut(id) {
            body.velocity += delta_v;
        }
    }

    fn apply_acceleration(&mut self, id: BodyId, acceleration: Vec3) {
        if let Some(body) = self.dynamic_mut(id) {
            body.pending_acceleration += acceleration;
        }
    }

    fn apply_force_at_point(&mut self, id: BodyId, force: Vec3, point: Vec3) {
        if let Some(body) = self.dynamic_mut(id) {
            let inv_mass = 1.0 / body.mass;
            body.pending_acceleration += force * inv_mass;
            let inv_inertia = body.inverse_inertia();
            if inv_inertia > 0.0 {
                let torque = (point - body.center_of_mass()).cross(force);
                body.pending_angular_acceleration += torque * inv_inertia;
            }
        }
    }

    fn apply_angular_acceleration(&mut self, id: BodyId, acceleration: Vec3) {
        if let Some(body) = self.dynamic_mut(id) {
            if body.can_rotate() {
                body.pending_angular_acceleration += acceleration;
            }
        }
    }

    fn resize_capsule(&mut self, id: BodyId, height: f32, keep_center: bool) {
        let Some(body) = self.bodies.get_mut(&id) else {
            return;
        };
        let BodyShape::Capsule { radius, height: old } = body.shape else {
            debug!(body = %id, "resize_capsule on a non-capsule body ignored");
            return;
        };
        // A capsule can't be shorter than its two caps
        let height = height.max(radius * 2.0);
        body.shape = BodyShape::Capsule { radius, height };
        if keep_center {
            body.position.y -= (height - old) * 0.5;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;
    const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    fn floor_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            ContentFlags::SOLID,
        );
        world
    }

    fn capsule(set: &mut BodySet) -> BodyId {
        set.spawn(
            BodyShape::Capsule { radius: 0.4, height: 1.8 },
            80.0,
            ContentFlags::PLAYER_BODY,
        )
        .id
    }

    #[test]
    fn test_body_falls_and_lands() {
        let world = floor_world();
        let mut set = BodySet::new();
        let id = capsule(&mut set);
        set.get_mut(id).unwrap().position = Vec3::new(0.0, 2.0, 0.0);

        for _ in 0..120 {
            set.step(&world, GRAVITY, DT);
        }

        let body = set.get(id).unwrap();
        assert!(body.position.y >= 0.0 && body.position.y < 0.05, "y = {}", body.position.y);
        assert!(body.velocity.y.abs() < 0.5);
    }

    #[test]
    fn test_velocity_change_is_immediate_and_acceleration_is_consumed() {
        let world = CollisionWorld::new();
        let mut set = BodySet::new();
        let id = capsule(&mut set);

        set.apply_velocity_change(id, Vec3::X * 2.0);
        assert_eq!(set.get(id).unwrap().velocity, Vec3::X * 2.0);

        set.apply_acceleration(id, Vec3::Z * 60.0);
        set.step(&world, Vec3::ZERO, DT);
        let v = set.get(id).unwrap().velocity;
        assert!((v.z - 1.0).abs() < 1e-4);

        set.step(&world, Vec3::ZERO, DT);
        let v2 = set.get(id).unwrap().velocity;
        assert!((v2.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_forces_skip_kinematic_bodies() {
        let mut set = BodySet::new();
        let body = set.spawn(BodyShape::Box { half_extents: Vec3::ONE }, 10.0, ContentFlags::DYNAMIC);
        body.kinematic = true;
        let id = body.id;

        set.apply_velocity_change(id, Vec3::Y * 5.0);
        set.apply_force_at_point(id, Vec3::X * 100.0, Vec3::ZERO);
        let body = set.get(id).unwrap();
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.pending_acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_off_center_force_spins_box() {
        let mut set = BodySet::new();
        let id = set
            .spawn(BodyShape::Box { half_extents: Vec3::splat(0.5) }, 10.0, ContentFlags::DYNAMIC)
            .id;

        let com = set.get(id).unwrap().center_of_mass();
        set.apply_force_at_point(id, Vec3::X * 10.0, com + Vec3::Y * 0.5);
        let body = set.get(id).unwrap();
        // r x F = (0,0.5,0) x (10,0,0) = (0,0,-5)
        assert!(body.pending_angular_acceleration.z < 0.0);
        assert!((body.pending_acceleration.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_resize_capsule_keeps_center_of_mass() {
        let mut set = BodySet::new();
        let id = capsule(&mut set);
        set.get_mut(id).unwrap().position = Vec3::new(0.0, 1.0, 0.0);
        let com_before = set.get(id).unwrap().center_of_mass();

        set.resize_capsule(id, 1.0, true);
        let body = set.get(id).unwrap();
        assert_eq!(body.shape, BodyShape::Capsule { radius: 0.4, height: 1.0 });
        assert!((body.center_of_mass() - com_before).length() < 1e-6);
        assert!((body.position.y - 1.4).abs() < 1e-6);

        // Blended resizes leave the origin alone
        set.resize_capsule(id, 1.2, false);
        assert!((set.get(id).unwrap().position.y - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_push_reports_body_contact() {
        let world_static = floor_world();
        let mut set = BodySet::new();
        let player = capsule(&mut set);
        let crate_id = set
            .spawn(BodyShape::Box { half_extents: Vec3::splat(0.5) }, 10.0, ContentFlags::DYNAMIC)
            .id;

        {
            let p = set.get_mut(player).unwrap();
            p.position = Vec3::new(0.0, 0.01, 0.0);
            p.velocity = Vec3::X * 3.0;
        }
        set.get_mut(crate_id).unwrap().position = Vec3::new(1.2, 0.01, 0.0);

        let mut world = world_static;
        world.attach_body(set.get(player).unwrap());
        world.attach_body(set.get(crate_id).unwrap());

        let mut touched = false;
        for _ in 0..30 {
            let report = set.step(&world, Vec3::ZERO, DT);
            world.sync_bodies(&set);
            touched |= report
                .contacts
                .iter()
                .any(|c| c.body == player && c.contact.other == Some(crate_id));
        }
        assert!(touched);
    }
}
