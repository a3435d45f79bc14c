//! Collision world containing static geometry and dynamic body colliders.
//!
//! Static brushes are added once; colliders attached to bodies are re-posed
//! every tick with [`CollisionWorld::sync_bodies`] so queries see the bodies
//! where the last step left them.

use std::fmt;

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::na::{Quaternion, Translation3, UnitQuaternion};
use parry3d::query::{self, Ray, RayCast};
use parry3d::shape::SharedShape;

use crate::dynamics::{Body, BodyId, BodySet};

use super::flags::ContentFlags;
use super::query::{CollisionQuery, HitBody, QueryFilter, QueryHit};
use super::trace::{TraceResult, TraceShape};

/// Shortest march step when sweeping thin shapes.
const MIN_SWEEP_STEP: f32 = 0.05;

/// Upper bound on march samples per collider per sweep.
const MAX_SWEEP_SAMPLES: usize = 64;

/// Bisection iterations after the march brackets the impact (~0.025% precision).
const BISECT_ITERATIONS: usize = 12;

/// Overlap depth at the start of a sweep that still counts as merely touching.
const PENETRATION_SLOP: f32 = 0.01;

/// A piece of collision geometry in the world.
#[derive(Clone)]
pub struct Collider {
    /// Unique identifier for this collider.
    pub id: u32,
    /// The parry shape used for queries.
    pub shape: SharedShape,
    /// Shape description the parry shape was built from.
    pub kind: TraceShape,
    /// Position and orientation of the shape center in world space.
    pub transform: Isometry<Real>,
    /// Content flags (solid, dynamic, trigger, etc.).
    pub contents: ContentFlags,
    /// Owning body snapshot, `None` for static geometry.
    pub body: Option<HitBody>,
}

impl fmt::Debug for Collider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collider")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("contents", &self.contents)
            .field("body", &self.body.map(|b| b.id))
            .finish()
    }
}

impl Collider {
    fn passes(&self, filter: &QueryFilter) -> bool {
        if !filter.mask.intersects(self.contents) {
            return false;
        }
        match (filter.exclude, self.body) {
            (Some(excluded), Some(body)) => excluded != body.id,
            _ => true,
        }
    }
}

/// Where a sweep first touched a collider.
#[derive(Debug, Clone, Copy)]
struct SweepContact {
    fraction: f32,
    normal: Vec3,
    point: Vec3,
    /// Overlap depth when the sweep started inside the collider.
    depth: f32,
}

/// The collision world.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    colliders: Vec<Collider>,
    next_id: u32,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            colliders: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a static axis-aligned box, centered on `center`.
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, contents: ContentFlags) -> u32 {
        self.add_oriented_box(center, half_extents, Quat::IDENTITY, contents)
    }

    /// Add a static box with an arbitrary orientation (ramps, tilted slabs).
    pub fn add_oriented_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        contents: ContentFlags,
    ) -> u32 {
        let kind = TraceShape::Box { half_extents };
        let id = self.allocate_id();
        self.colliders.push(Collider {
            id,
            shape: create_parry_shape(kind),
            kind,
            transform: to_isometry(center, rotation),
            contents,
            body: None,
        });
        id
    }

    /// Attach a collider that follows `body`.
    pub fn attach_body(&mut self, body: &Body) -> u32 {
        let kind = body.shape.trace_shape();
        let id = self.allocate_id();
        self.colliders.push(Collider {
            id,
            shape: create_parry_shape(kind),
            kind,
            transform: body_transform(body, kind),
            contents: body.contents,
            body: Some(body.hit_info()),
        });
        id
    }

    /// Remove every collider owned by `body`.
    pub fn detach_body(&mut self, body: BodyId) {
        self.colliders
            .retain(|c| c.body.map_or(true, |b| b.id != body));
    }

    /// Re-pose the colliders owned by `body`, rebuilding the shape if it was resized.
    pub fn sync_body(&mut self, body: &Body) {
        let kind = body.shape.trace_shape();
        for collider in self
            .colliders
            .iter_mut()
            .filter(|c| c.body.map_or(false, |b| b.id == body.id))
        {
            if collider.kind != kind {
                collider.shape = create_parry_shape(kind);
                collider.kind = kind;
            }
            collider.transform = body_transform(body, kind);
            collider.contents = body.contents;
            collider.body = Some(body.hit_info());
        }
    }

    /// Re-pose the colliders of every body in the set.
    pub fn sync_bodies(&mut self, bodies: &BodySet) {
        for body in bodies.iter() {
            self.sync_body(body);
        }
    }

    /// Remove all collision geometry.
    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    /// Get the number of colliders.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Sweep a shape from `start` to `end` and report the first impact.
    pub fn trace(
        &self,
        start: Vec3,
        end: Vec3,
        shape: TraceShape,
        filter: &QueryFilter,
    ) -> TraceResult {
        let delta = end - start;
        let distance = delta.length();

        // No movement - just check if position is valid
        if distance < 0.0001 {
            return if self.point_in_solid(start, shape, filter) {
                TraceResult {
                    fraction: 0.0,
                    end_position: start,
                    hit_normal: Some(Vec3::Y),
                    hit_point: Some(start),
                    hit_contents: ContentFlags::SOLID,
                    started_in_solid: true,
                    all_solid: true,
                    hit_body: None,
                }
            } else {
                TraceResult::no_hit(start)
            };
        }

        let test_shape = create_parry_shape(shape);
        let mut best: Option<(SweepContact, &Collider)> = None;

        for collider in self.colliders.iter().filter(|c| c.passes(filter)) {
            if let Some(contact) = sweep_collider(collider, &test_shape, shape, start, end) {
                let closer = best
                    .as_ref()
                    .map_or(true, |(b, _)| contact.fraction < b.fraction);
                if closer {
                    best = Some((contact, collider));
                }
            }
        }

        match best {
            Some((contact, collider)) => {
                let started_in_solid = contact.depth > PENETRATION_SLOP;
                TraceResult {
                    fraction: contact.fraction,
                    end_position: start + delta * contact.fraction,
                    hit_normal: Some(contact.normal),
                    hit_point: Some(contact.point),
                    hit_contents: collider.contents,
                    started_in_solid,
                    all_solid: started_in_solid && contact.fraction < 0.001,
                    hit_body: collider.body.map(|b| b.id),
                }
            }
            None => TraceResult::no_hit(end),
        }
    }

    /// Check if a shape placed at `position` overlaps anything passing the filter.
    pub fn point_in_solid(&self, position: Vec3, shape: TraceShape, filter: &QueryFilter) -> bool {
        let test_shape = create_parry_shape(shape);
        let test_transform = shape_transform(position, shape);

        self.colliders
            .iter()
            .filter(|c| c.passes(filter))
            .any(|c| overlaps(&test_transform, &test_shape, c))
    }

    /// Resolve collision by pushing a shape out of solid geometry.
    ///
    /// Returns the corrected position.
    pub fn resolve_penetration(&self, position: Vec3, shape: TraceShape, filter: &QueryFilter) -> Vec3 {
        let test_shape = create_parry_shape(shape);
        let test_transform = shape_transform(position, shape);

        let mut correction = Vec3::ZERO;

        for collider in self.colliders.iter().filter(|c| c.passes(filter)) {
            if let Ok(Some(contact)) = query::contact(
                &test_transform,
                test_shape.as_ref(),
                &collider.transform,
                collider.shape.as_ref(),
                0.0,
            ) {
                let depth = -contact.dist;
                if depth > PENETRATION_SLOP * 0.5 {
                    // normal2 points out of the collider, toward us
                    let normal = Vec3::new(contact.normal2.x, contact.normal2.y, contact.normal2.z);
                    correction += normal * (depth + 0.001);
                }
            }
        }

        position + correction
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn hit_from_contact(collider: &Collider, distance: f32, normal: Vec3, point: Vec3) -> QueryHit {
        QueryHit {
            distance,
            point,
            normal,
            contents: collider.contents,
            body: collider.body,
        }
    }
}

impl CollisionQuery for CollisionWorld {
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Vec<QueryHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return Vec::new();
        }

        let shape = TraceShape::Sphere { radius };
        let test_shape = create_parry_shape(shape);
        let end = origin + dir * max_distance;

        let mut hits: Vec<QueryHit> = self
            .colliders
            .iter()
            .filter(|c| c.passes(filter))
            .filter_map(|c| {
                sweep_collider(c, &test_shape, shape, origin, end).map(|contact| {
                    Self::hit_from_contact(c, contact.fraction * max_distance, contact.normal, contact.point)
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<QueryHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        let ray = Ray::new(
            Point::new(origin.x, origin.y, origin.z),
            Vector::new(dir.x, dir.y, dir.z),
        );

        let mut closest: Option<(f32, &Collider)> = None;

        for collider in self.colliders.iter().filter(|c| c.passes(filter)) {
            if let Some(toi) = collider.shape.cast_ray(&collider.transform, &ray, max_distance, true) {
                if toi < max_distance && closest.map_or(true, |(best, _)| toi < best) {
                    closest = Some((toi, collider));
                }
            }
        }

        closest.map(|(toi, collider)| {
            let normal = compute_hit_normal(&ray, toi, collider);
            Self::hit_from_contact(collider, toi, normal, origin + dir * toi)
        })
    }

    fn capsule_cast(
        &self,
        bottom: Vec3,
        radius: f32,
        height: f32,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<QueryHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let shape = TraceShape::Capsule { radius, height };
        let test_shape = create_parry_shape(shape);
        let end = bottom + dir * max_distance;

        self.colliders
            .iter()
            .filter(|c| c.passes(filter))
            .filter_map(|c| {
                sweep_collider(c, &test_shape, shape, bottom, end).map(|contact| {
                    Self::hit_from_contact(c, contact.fraction * max_distance, contact.normal, contact.point)
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn capsule_overlap(
        &self,
        bottom: Vec3,
        radius: f32,
        height: f32,
        filter: &QueryFilter,
    ) -> Vec<QueryHit> {
        let shape = TraceShape::Capsule { radius, height };
        let test_shape = create_parry_shape(shape);
        let test_transform = shape_transform(bottom, shape);

        self.colliders
            .iter()
            .filter(|c| c.passes(filter))
            .filter(|c| overlaps(&test_transform, &test_shape, c))
            .map(|c| {
                let center = bottom + shape.center_offset();
                let (normal, point) = contact_at(c, &test_shape, shape, bottom, 0.0)
                    .unwrap_or((Vec3::Y, center));
                Self::hit_from_contact(c, 0.0, normal, point)
            })
            .collect()
    }
}

// ============================================================================
// Private helpers
// ============================================================================

fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    let translation = Translation3::new(position.x, position.y, position.z);
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(
        rotation.w, rotation.x, rotation.y, rotation.z,
    ));
    Isometry::from_parts(translation, rotation)
}

/// Collider pose for a body; capsules always stay upright.
fn body_transform(body: &Body, kind: TraceShape) -> Isometry<Real> {
    match kind {
        TraceShape::Capsule { .. } => shape_transform(body.position, kind),
        _ => to_isometry(
            body.position + body.orientation * kind.center_offset(),
            body.orientation,
        ),
    }
}

/// Create a parry3d shape from a trace shape.
fn create_parry_shape(shape: TraceShape) -> SharedShape {
    match shape {
        TraceShape::Capsule { radius, height } => {
            // Parry capsule is defined by half-height of the cylinder part
            let cylinder_half_height = (height - 2.0 * radius).max(0.0) / 2.0;
            SharedShape::capsule_y(cylinder_half_height, radius)
        }
        TraceShape::Box { half_extents } => {
            SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        TraceShape::Sphere { radius } => SharedShape::ball(radius),
        // A tiny sphere stands in for point traces
        TraceShape::Point => SharedShape::ball(0.001),
    }
}

/// Transform for an upright query shape whose origin sits at `position`.
fn shape_transform(position: Vec3, shape: TraceShape) -> Isometry<Real> {
    let center = position + shape.center_offset();
    Isometry::translation(center.x, center.y, center.z)
}

fn overlaps(test_transform: &Isometry<Real>, test_shape: &SharedShape, collider: &Collider) -> bool {
    query::intersection_test(
        test_transform,
        test_shape.as_ref(),
        &collider.transform,
        collider.shape.as_ref(),
    )
    .unwrap_or(false)
}

/// Surface normal and contact point between a query shape at `position` and a collider.
fn contact_at(
    collider: &Collider,
    test_shape: &SharedShape,
    shape: TraceShape,
    position: Vec3,
    prediction: f32,
) -> Option<(Vec3, Vec3)> {
    let transform = shape_transform(position, shape);
    let contact = query::contact(
        &transform,
        test_shape.as_ref(),
        &collider.transform,
        collider.shape.as_ref(),
        prediction,
    )
    .ok()
    .flatten()?;

    let normal = Vec3::new(contact.normal2.x, contact.normal2.y, contact.normal2.z);
    let point = Vec3::new(contact.point2.x, contact.point2.y, contact.point2.z);
    Some((normal, point))
}

/// March then bisect a shape along `start..end` against a single collider.
fn sweep_collider(
    collider: &Collider,
    test_shape: &SharedShape,
    shape: TraceShape,
    start: Vec3,
    end: Vec3,
) -> Option<SweepContact> {
    let delta = end - start;
    let distance = delta.length();
    if distance < 0.0001 {
        return None;
    }
    let direction = delta / distance;

    let solid_at = |t: f32| overlaps(&shape_transform(start + delta * t, shape), test_shape, collider);

    if solid_at(0.0) {
        let transform = shape_transform(start, shape);
        let contact = query::contact(
            &transform,
            test_shape.as_ref(),
            &collider.transform,
            collider.shape.as_ref(),
            0.0,
        )
        .ok()
        .flatten();
        let (normal, point, depth) = match contact {
            Some(c) => (
                Vec3::new(c.normal2.x, c.normal2.y, c.normal2.z),
                Vec3::new(c.point2.x, c.point2.y, c.point2.z),
                (-c.dist).max(0.0),
            ),
            None => (-direction, start, 0.0),
        };
        // Already touching but moving away: this collider doesn't block
        if direction.dot(normal) >= 0.0 {
            return None;
        }
        return Some(SweepContact { fraction: 0.0, normal, point, depth });
    }

    let step = shape.radius().max(MIN_SWEEP_STEP);
    let samples = ((distance / step).ceil() as usize).clamp(1, MAX_SWEEP_SAMPLES);

    let mut lo = 0.0_f32;
    let mut hi = None;
    for i in 1..=samples {
        let t = i as f32 / samples as f32;
        if solid_at(t) {
            hi = Some(t);
            break;
        }
        lo = t;
    }
    let mut hi = hi?;

    for _ in 0..BISECT_ITERATIONS {
        let mid = (lo + hi) * 0.5;
        if solid_at(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    let (normal, point) = contact_at(collider, test_shape, shape, start + delta * hi, 0.0)
        .or_else(|| contact_at(collider, test_shape, shape, start + delta * lo, MIN_SWEEP_STEP))
        .unwrap_or((-direction, start + delta * hi));

    Some(SweepContact { fraction: lo, normal, point, depth: 0.0 })
}

/// Compute hit normal from a ray intersection.
fn compute_hit_normal(ray: &Ray, toi: f32, collider: &Collider) -> Vec3 {
    if let Some(intersection) =
        collider
            .shape
            .cast_ray_and_get_normal(&collider.transform, ray, toi + 0.01, true)
    {
        Vec3::new(intersection.normal.x, intersection.normal.y, intersection.normal.z)
    } else {
        // Fallback: compute from ray direction
        let dir = Vec3::new(ray.dir.x, ray.dir.y, ray.dir.z);
        -dir.normalize()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::BodyShape;

    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();

        // Floor at y=0
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            ContentFlags::SOLID,
        );

        // Wall at x=10
        world.add_box(
            Vec3::new(10.0, 2.5, 0.0),
            Vec3::new(0.5, 2.5, 10.0),
            ContentFlags::SOLID,
        );

        world
    }

    fn solid() -> QueryFilter {
        QueryFilter::new(ContentFlags::SOLID)
    }

    #[test]
    fn test_raycast_hit() {
        let world = create_test_world();

        let hit = world
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 100.0, &solid())
            .expect("should hit the wall");

        // Wall face at x=9.5
        assert!((hit.distance - 9.5).abs() < 0.05);
        assert!((hit.normal - (-Vec3::X)).length() < 0.05);
        assert!(hit.body.is_none());
    }

    #[test]
    fn test_raycast_miss() {
        let world = create_test_world();
        assert!(world
            .raycast(Vec3::new(0.0, 1.0, 0.0), -Vec3::X, 100.0, &solid())
            .is_none());
    }

    #[test]
    fn test_trace_capsule_stops_at_wall() {
        let world = create_test_world();
        let shape = TraceShape::Capsule { radius: 0.4, height: 1.8 };

        // Start slightly above the floor so only the wall blocks
        let result = world.trace(
            Vec3::new(0.0, 0.05, 0.0),
            Vec3::new(15.0, 0.05, 0.0),
            shape,
            &solid(),
        );

        assert!(result.hit_something());
        assert!(result.end_position.x < 9.2);
        assert!(result.end_position.x > 8.9);
        assert!(result.normal_or_up().x < -0.9);
    }

    #[test]
    fn test_sphere_cast_reports_floor_distance() {
        let world = create_test_world();
        let hits = world.sphere_cast(Vec3::new(0.0, 1.0, 0.0), 0.25, -Vec3::Y, 2.0, &solid());

        assert_eq!(hits.len(), 1);
        // Sphere bottom reaches y=0 after traveling 0.75
        assert!((hits[0].distance - 0.75).abs() < 0.01);
        assert!(hits[0].normal.y > 0.99);
    }

    #[test]
    fn test_sphere_cast_sorts_hits() {
        let mut world = create_test_world();
        // Thin shelf above the floor
        world.add_box(
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(1.0, 0.05, 1.0),
            ContentFlags::SOLID,
        );

        let hits = world.sphere_cast(Vec3::new(0.0, 2.0, 0.0), 0.25, -Vec3::Y, 3.0, &solid());
        assert_eq!(hits.len(), 2);
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn test_point_in_solid() {
        let world = create_test_world();

        assert!(world.point_in_solid(Vec3::new(0.0, -0.25, 0.0), TraceShape::Point, &solid()));
        assert!(!world.point_in_solid(Vec3::new(0.0, 1.0, 0.0), TraceShape::Point, &solid()));
    }

    #[test]
    fn test_content_mask_filtering() {
        let mut world = CollisionWorld::new();

        world.add_box(
            Vec3::new(5.0, 1.0, 0.0),
            Vec3::new(0.5, 1.0, 5.0),
            ContentFlags::SOLID,
        );
        world.add_box(
            Vec3::new(3.0, 1.0, 0.0),
            Vec3::new(0.5, 1.0, 5.0),
            ContentFlags::TRIGGER,
        );

        let hit = world
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 100.0, &solid())
            .expect("should hit the solid wall");
        // Should hit wall at x=4.5, not trigger at x=2.5
        assert!((hit.distance - 4.5).abs() < 0.1);
    }

    #[test]
    fn test_body_collider_follows_body_and_can_be_excluded() {
        let mut world = CollisionWorld::new();
        let mut body = Body::new(
            BodyId(1),
            BodyShape::Box { half_extents: Vec3::splat(0.5) },
            5.0,
            ContentFlags::DYNAMIC,
        );
        body.position = Vec3::new(0.0, 0.0, 3.0);
        world.attach_body(&body);

        let filter = QueryFilter::new(ContentFlags::DYNAMIC);
        let hit = world
            .raycast(Vec3::new(0.0, 0.5, 0.0), Vec3::Z, 10.0, &filter)
            .expect("should hit the box");
        assert_eq!(hit.body.map(|b| b.id), Some(BodyId(1)));
        assert!((hit.distance - 2.5).abs() < 0.05);

        body.position = Vec3::new(0.0, 0.0, 6.0);
        world.sync_body(&body);
        let hit = world
            .raycast(Vec3::new(0.0, 0.5, 0.0), Vec3::Z, 10.0, &filter)
            .expect("should hit the moved box");
        assert!((hit.distance - 5.5).abs() < 0.05);

        let excluded = filter.excluding(BodyId(1));
        assert!(world
            .raycast(Vec3::new(0.0, 0.5, 0.0), Vec3::Z, 10.0, &excluded)
            .is_none());

        world.detach_body(BodyId(1));
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn test_capsule_overlap_finds_touching_body() {
        let mut world = CollisionWorld::new();
        let mut body = Body::new(
            BodyId(2),
            BodyShape::Box { half_extents: Vec3::splat(0.5) },
            5.0,
            ContentFlags::DYNAMIC,
        );
        body.position = Vec3::new(0.8, 0.0, 0.0);
        world.attach_body(&body);

        let filter = QueryFilter::new(ContentFlags::DYNAMIC);
        let hits = world.capsule_overlap(Vec3::ZERO, 0.4, 1.8, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].body.map(|b| b.id), Some(BodyId(2)));

        let hits = world.capsule_overlap(Vec3::new(-3.0, 0.0, 0.0), 0.4, 1.8, &filter);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_capsule_cast_upward_finds_ceiling() {
        let mut world = create_test_world();
        world.add_box(
            Vec3::new(0.0, 1.6, 0.0),
            Vec3::new(2.0, 0.1, 2.0),
            ContentFlags::SOLID,
        );

        // 1.0 tall capsule at the floor; ceiling underside at 1.5
        let hit = world
            .capsule_cast(Vec3::new(0.0, 0.01, 0.0), 0.38, 1.0, Vec3::Y, 0.85, &solid())
            .expect("ceiling should block standing up");
        assert!(hit.distance < 0.6);

        let clear = world.capsule_cast(Vec3::new(5.0, 0.01, 5.0), 0.38, 1.0, Vec3::Y, 0.85, &solid());
        assert!(clear.is_none());
    }

    #[test]
    fn test_resolve_penetration_pushes_up() {
        let world = create_test_world();
        let shape = TraceShape::Capsule { radius: 0.4, height: 1.8 };
        let resolved = world.resolve_penetration(Vec3::new(0.0, -0.1, 0.0), shape, &solid());
        assert!(resolved.y > -0.01);
    }
}
