//! Collide-and-slide movement for integrated bodies.
//!
//! A body moving into geometry keeps the part of its velocity that runs
//! along the surface, so walls and ramps redirect motion instead of
//! stopping it dead.

use glam::Vec3;

use crate::collision::{CollisionWorld, QueryFilter, TraceShape};

use super::body::BodyId;

/// Surfaces remembered per move; also the bump iteration limit.
const MAX_CLIP_PLANES: usize = 5;

/// Distance kept between a body and the surface it stopped against (meters).
const SURFACE_EPSILON: f32 = 0.001;

/// Push slightly past the plane when clipping so the next sweep starts clear.
pub const OVERBOUNCE: f32 = 1.001;

/// A surface touched during a slide move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideContact {
    pub normal: Vec3,
    pub point: Vec3,
    /// Body behind the surface, `None` for static geometry.
    pub other: Option<BodyId>,
    /// Speed into the surface at the moment of contact.
    pub closing_speed: f32,
}

/// What a slide move ran into.
#[derive(Debug, Clone, Default)]
pub struct SlideOutcome {
    /// Nothing was touched.
    pub clear: bool,
    /// Wedged between surfaces; velocity was zeroed.
    pub stuck: bool,
    pub contacts: Vec<SlideContact>,
}

/// Remove the part of `velocity` that points into a surface with `normal`,
/// scaled by `overbounce`.
pub fn clip_velocity(velocity: Vec3, normal: Vec3, overbounce: f32) -> Vec3 {
    let backoff = velocity.dot(normal);

    let adjusted_backoff = if backoff < 0.0 {
        backoff * overbounce
    } else {
        backoff / overbounce
    };

    velocity - normal * adjusted_backoff
}

/// Move a shape through the world for `delta_time`, sliding along whatever it hits.
///
/// `position` and `velocity` are updated in place.
pub fn slide_move(
    world: &CollisionWorld,
    position: &mut Vec3,
    velocity: &mut Vec3,
    shape: TraceShape,
    delta_time: f32,
    filter: &QueryFilter,
) -> SlideOutcome {
    let mut outcome = SlideOutcome::default();
    let mut time_remaining = delta_time;
    let original_velocity = *velocity;
    let mut planes: [Vec3; MAX_CLIP_PLANES] = [Vec3::ZERO; MAX_CLIP_PLANES];
    let mut num_planes = 0;

    for _ in 0..MAX_CLIP_PLANES {
        if velocity.length_squared() < 0.0001 || time_remaining <= 0.0 {
            break;
        }

        let target_pos = *position + *velocity * time_remaining;
        let trace = world.trace(*position, target_pos, shape, filter);

        if trace.fraction >= 1.0 {
            *position = trace.end_position;
            outcome.clear = num_planes == 0;
            return outcome;
        }

        let Some(normal) = trace.hit_normal else {
            break;
        };

        if trace.all_solid {
            *velocity = Vec3::ZERO;
            outcome.stuck = true;
            return outcome;
        }

        // Move to the collision point and back off the surface a touch
        if trace.fraction > 0.0 {
            *position = trace.end_position;
        }
        *position += normal * SURFACE_EPSILON;

        time_remaining *= 1.0 - trace.fraction;

        outcome.contacts.push(SlideContact {
            normal,
            point: trace.hit_point.unwrap_or(*position),
            other: trace.hit_body,
            closing_speed: (-velocity.dot(normal)).max(0.0),
        });

        if num_planes < MAX_CLIP_PLANES {
            planes[num_planes] = normal;
            num_planes += 1;
        }

        // First clip that doesn't send us back into another plane wins
        let mut found_valid = false;
        for i in 0..num_planes {
            let clipped = clip_velocity(*velocity, planes[i], OVERBOUNCE);

            let valid = (0..num_planes)
                .filter(|&j| j != i)
                .all(|j| clipped.dot(planes[j]) >= -0.01);

            if valid {
                *velocity = clipped;
                found_valid = true;
                break;
            }
        }

        if !found_valid {
            if num_planes >= 2 {
                // Slide along the crease between the first two planes
                let crease = planes[0].cross(planes[1]).normalize_or_zero();
                *velocity = crease * original_velocity.dot(crease);

                if velocity.dot(planes[0]) < -0.01 || velocity.dot(planes[1]) < -0.01 {
                    *velocity = Vec3::ZERO;
                    outcome.stuck = true;
                    return outcome;
                }
            } else {
                *velocity = Vec3::ZERO;
                outcome.stuck = true;
                return outcome;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::ContentFlags;

    const PLAYER: TraceShape = TraceShape::Capsule { radius: 0.4, height: 1.8 };

    fn solid() -> QueryFilter {
        QueryFilter::new(ContentFlags::MASK_PLAYER_SOLID)
    }

    #[test]
    fn test_clip_velocity_wall() {
        let velocity = Vec3::new(10.0, 0.0, 5.0);
        let wall_normal = Vec3::new(-1.0, 0.0, 0.0);

        let clipped = clip_velocity(velocity, wall_normal, 1.0);

        assert!(clipped.x.abs() < 0.01);
        assert!((clipped.z - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_clip_velocity_overbounce_lifts_off_floor() {
        let velocity = Vec3::new(2.0, -10.0, 0.0);
        let clipped = clip_velocity(velocity, Vec3::Y, OVERBOUNCE);
        assert!((clipped.x - 2.0).abs() < 1e-6);
        assert!(clipped.y > 0.0 && clipped.y < 0.02);
    }

    #[test]
    fn test_slide_move_no_collision() {
        let world = CollisionWorld::new();

        let mut position = Vec3::ZERO;
        let mut velocity = Vec3::new(5.0, 0.0, 0.0);

        let outcome = slide_move(&world, &mut position, &mut velocity, PLAYER, 1.0, &solid());

        assert!(outcome.clear);
        assert!(outcome.contacts.is_empty());
        assert!((position.x - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_slide_move_along_wall() {
        let mut world = CollisionWorld::new();

        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            ContentFlags::SOLID,
        );
        world.add_box(
            Vec3::new(5.5, 2.0, 0.0),
            Vec3::new(0.5, 2.0, 10.0),
            ContentFlags::SOLID,
        );

        let mut position = Vec3::new(0.0, 0.05, 0.0);
        let mut velocity = Vec3::new(10.0, 0.0, 5.0);

        let outcome = slide_move(&world, &mut position, &mut velocity, PLAYER, 1.0, &solid());

        assert!(!outcome.clear);
        assert!(position.x < 5.0, "position x={} should stop before the wall", position.x);
        // Kept sliding along the wall
        assert!(position.z > 4.0);
        assert!(velocity.x.abs() < 0.1);
        assert!(outcome.contacts.iter().any(|c| c.normal.x < -0.9 && c.other.is_none()));
    }

    #[test]
    fn test_landing_reports_floor_contact() {
        let mut world = CollisionWorld::new();
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            ContentFlags::SOLID,
        );

        let mut position = Vec3::new(0.0, 0.5, 0.0);
        let mut velocity = Vec3::new(0.0, -6.0, 0.0);

        let outcome = slide_move(&world, &mut position, &mut velocity, PLAYER, 0.25, &solid());

        assert!(position.y >= 0.0 && position.y < 0.01);
        assert!(velocity.y.abs() < 0.01);
        assert_eq!(outcome.contacts.len(), 1);
        assert!((outcome.contacts[0].closing_speed - 6.0).abs() < 0.01);
    }
}
