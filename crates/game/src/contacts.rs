//! Contact detection and pushing.
//!
//! [`ContactTracker`] turns a per-tick overlap test of a slightly inflated
//! capsule into contact-begin and contact-end events for dynamic bodies.
//! [`push_impulse`] turns an integration contact into the shove a player
//! gives a dynamic body it runs into.

use std::collections::BTreeSet;

use glam::Vec3;
use kinetra_physics::dynamics::SlideContact;
use kinetra_physics::{Body, BodyId, BodyShape, CollisionQuery, ContentFlags, QueryFilter};

use crate::config::InteractionConfig;

/// Contacts that started or stopped this tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactChanges {
    pub began: Vec<BodyId>,
    pub ended: Vec<BodyId>,
}

impl ContactChanges {
    pub fn is_empty(&self) -> bool {
        self.began.is_empty() && self.ended.is_empty()
    }
}

/// Remembers which dynamic bodies a player's contact proxy touched last tick.
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    touching: BTreeSet<BodyId>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touching(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.touching.iter().copied()
    }

    pub fn is_touching(&self, body: BodyId) -> bool {
        self.touching.contains(&body)
    }

    /// Overlap the inflated capsule of `body` and diff against last tick.
    pub fn update(&mut self, world: &impl CollisionQuery, body: &Body, margin: f32) -> ContactChanges {
        let BodyShape::Capsule { radius, height } = body.shape else {
            return ContactChanges::default();
        };
        let filter = QueryFilter::new(ContentFlags::MASK_INTERACT).excluding(body.id);
        let now: BTreeSet<BodyId> = world
            .capsule_overlap(
                body.position - Vec3::Y * margin,
                radius + margin,
                height + margin * 2.0,
                &filter,
            )
            .into_iter()
            .filter_map(|hit| hit.body)
            .filter(|hit| hit.is_dynamic())
            .map(|hit| hit.id)
            .collect();

        let changes = ContactChanges {
            began: now.difference(&self.touching).copied().collect(),
            ended: self.touching.difference(&now).copied().collect(),
        };
        self.touching = now;
        changes
    }

    /// Forget everything, reporting every current contact as ended.
    pub fn clear(&mut self) -> ContactChanges {
        ContactChanges {
            began: Vec::new(),
            ended: std::mem::take(&mut self.touching).into_iter().collect(),
        }
    }
}

/// Impulse (kg·m/s, world space) a pusher gives the body it ran into, if any.
///
/// Floor-like contacts and slow contacts don't push. The impulse is
/// horizontal, into the contacted surface.
pub fn push_impulse(contact: &SlideContact, target_mass: f32, config: &InteractionConfig) -> Option<Vec3> {
    if contact.normal.y > 0.5 || contact.closing_speed < config.min_push_speed {
        return None;
    }
    let direction = Vec3::new(-contact.normal.x, 0.0, -contact.normal.z).normalize_or_zero();
    if direction == Vec3::ZERO || target_mass <= 0.0 {
        return None;
    }
    let mass_scale = if config.max_push_mass <= 0.0 {
        1.0
    } else {
        (config.max_push_mass / target_mass).clamp(0.0, 1.0)
    };
    Some(direction * config.push_power * contact.closing_speed * mass_scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetra_physics::{BodySet, CollisionWorld};

    fn scene() -> (CollisionWorld, BodySet, BodyId, BodyId) {
        let mut world = CollisionWorld::new();
        let mut set = BodySet::new();
        let player = set
            .spawn(BodyShape::Capsule { radius: 0.4, height: 1.8 }, 80.0, ContentFlags::PLAYER_BODY)
            .id;
        let crate_body = set.spawn(
            BodyShape::Box { half_extents: Vec3::splat(0.25) },
            10.0,
            ContentFlags::DYNAMIC,
        );
        crate_body.position = Vec3::new(0.7, 0.0, 0.0);
        let crate_id = crate_body.id;
        world.attach_body(set.get(player).unwrap());
        world.attach_body(set.get(crate_id).unwrap());
        (world, set, player, crate_id)
    }

    #[test]
    fn test_begin_and_end_are_edges() {
        let (mut world, mut set, player, crate_id) = scene();
        let mut tracker = ContactTracker::new();

        // Capsule edge at 0.4, crate face at 0.45, margin 0.1 reaches it
        let changes = tracker.update(&world, set.get(player).unwrap(), 0.1);
        assert_eq!(changes.began, vec![crate_id]);
        assert!(changes.ended.is_empty());

        // Still touching: no new events
        assert!(tracker.update(&world, set.get(player).unwrap(), 0.1).is_empty());

        set.get_mut(crate_id).unwrap().position.x = 3.0;
        world.sync_bodies(&set);
        let changes = tracker.update(&world, set.get(player).unwrap(), 0.1);
        assert_eq!(changes.ended, vec![crate_id]);
        assert!(!tracker.is_touching(crate_id));
    }

    #[test]
    fn test_margin_controls_reach() {
        let (world, set, player, _) = scene();
        let mut tracker = ContactTracker::new();
        assert!(tracker.update(&world, set.get(player).unwrap(), 0.0).is_empty());
    }

    #[test]
    fn test_clear_ends_everything() {
        let (world, set, player, crate_id) = scene();
        let mut tracker = ContactTracker::new();
        tracker.update(&world, set.get(player).unwrap(), 0.1);
        assert_eq!(tracker.clear().ended, vec![crate_id]);
        assert_eq!(tracker.touching().count(), 0);
    }

    fn wall_contact(closing_speed: f32) -> SlideContact {
        SlideContact {
            normal: Vec3::NEG_X,
            point: Vec3::new(0.45, 0.5, 0.0),
            other: Some(BodyId(2)),
            closing_speed,
        }
    }

    #[test]
    fn test_push_scales_with_speed_and_mass() {
        let config = InteractionConfig::default();
        let light = push_impulse(&wall_contact(2.0), 10.0, &config).unwrap();
        assert!((light - Vec3::X * 3.0).length() < 1e-5);

        // 400 kg is twice the push mass: half the impulse
        let heavy = push_impulse(&wall_contact(2.0), 400.0, &config).unwrap();
        assert!((heavy.x - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_no_push_on_floor_or_when_slow() {
        let config = InteractionConfig::default();
        assert_eq!(push_impulse(&wall_contact(0.1), 10.0, &config), None);

        let floor = SlideContact {
            normal: Vec3::Y,
            ..wall_contact(3.0)
        };
        assert_eq!(push_impulse(&floor, 10.0, &config), None);
    }
}
