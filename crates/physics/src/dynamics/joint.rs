//! Compliant six-degree-of-freedom joint used to carry bodies.
//!
//! The joint lets the anchors drift apart by a small linear slack and the
//! orientation twist by a small angular slack; beyond that, a spring/damper
//! pulls them back together. The angular spring runs at half the linear
//! strength so carried objects wobble rather than snap.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::body::Body;

/// Stiffness and slack of a compliant joint.
///
/// Spring and damper are expressed as accelerations (per meter of stretch and
/// per meter/second of relative velocity) so behavior does not depend on the
/// carried mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    /// Linear slack before the spring engages (meters).
    pub linear_slack: f32,
    /// Angular slack before the angular spring engages (degrees).
    pub angular_slack_deg: f32,
    /// Linear spring (1/s²).
    pub spring: f32,
    /// Linear and angular damper (1/s).
    pub damper: f32,
    /// Cap on the linear acceleration the joint may request (m/s²).
    pub max_acceleration: f32,
}

impl Default for JointLimits {
    fn default() -> Self {
        Self {
            linear_slack: 0.01,
            angular_slack_deg: 10.0,
            spring: 400.0,
            damper: 40.0,
            max_acceleration: 250.0,
        }
    }
}

/// World-space frame the holder side of the joint is expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointFrame {
    /// Frame origin (the holder's viewpoint).
    pub origin: Vec3,
    /// Frame rotation (the holder's view rotation).
    pub rotation: Quat,
    /// Velocity of the frame origin.
    pub velocity: Vec3,
}

/// Accelerations the joint wants applied to the held body this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointDrive {
    /// Linear acceleration at the body anchor.
    pub acceleration: Vec3,
    /// World-space point the linear acceleration acts at.
    pub anchor_world: Vec3,
    /// Angular acceleration (rad/s²).
    pub angular_acceleration: Vec3,
    /// Current distance between the two anchors.
    pub stretch: f32,
}

/// A soft link between a holder frame and a held body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompliantJoint {
    /// Anchor in holder-local space, relative to the frame origin.
    pub holder_anchor: Vec3,
    /// Anchor in held-body-local space, relative to its center of mass.
    pub body_anchor: Vec3,
    /// Held body orientation relative to the holder's yaw, captured at attach time.
    pub rest_rotation: Quat,
    pub limits: JointLimits,
}

impl CompliantJoint {
    /// Attach a joint to `body` at the world-space point `grab_point`.
    ///
    /// `holder_anchor` is where the body anchor should ride, in holder-local space.
    pub fn attach(
        holder_yaw: Quat,
        holder_anchor: Vec3,
        body: &Body,
        grab_point: Vec3,
        limits: JointLimits,
    ) -> Self {
        Self {
            holder_anchor,
            body_anchor: body.world_to_local(grab_point),
            rest_rotation: holder_yaw.inverse() * body.orientation,
            limits,
        }
    }

    /// World-space target of the holder anchor.
    pub fn target(&self, frame: &JointFrame) -> Vec3 {
        frame.origin + frame.rotation * self.holder_anchor
    }

    /// Compute the drive that pulls `body` toward the holder frame.
    pub fn solve(&self, frame: &JointFrame, holder_yaw: Quat, body: &Body) -> JointDrive {
        let limits = &self.limits;
        let anchor_world = body.local_to_world(self.body_anchor);
        let target = self.target(frame);

        // Linear: spring only on the stretch beyond the slack
        let offset = target - anchor_world;
        let stretch = offset.length();
        let excess = if stretch > limits.linear_slack {
            offset * ((stretch - limits.linear_slack) / stretch)
        } else {
            Vec3::ZERO
        };
        let relative_velocity = frame.velocity - body.point_velocity(anchor_world);
        let acceleration = (excess * limits.spring + relative_velocity * limits.damper)
            .clamp_length_max(limits.max_acceleration);

        // Angular: half-strength spring toward the captured relative rotation
        let angular_acceleration = if body.can_rotate() {
            let desired = holder_yaw * self.rest_rotation;
            let (axis, angle) = shortest_arc(desired * body.orientation.inverse());
            let slack = limits.angular_slack_deg.to_radians();
            let excess_angle = (angle - slack).max(0.0);
            axis * excess_angle * (limits.spring * 0.5) - body.angular_velocity * limits.damper
        } else {
            Vec3::ZERO
        };

        JointDrive {
            acceleration,
            anchor_world,
            angular_acceleration,
            stretch,
        }
    }
}

/// Axis and angle (radians, in `[0, π]`) of the shortest rotation equal to `q`.
fn shortest_arc(q: Quat) -> (Vec3, f32) {
    let q = if q.w < 0.0 { -q } else { q };
    let (axis, angle) = q.normalize().to_axis_angle();
    if angle.is_finite() && angle > 1e-6 {
        (axis, angle)
    } else {
        (Vec3::ZERO, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::ContentFlags;
    use crate::dynamics::{BodyId, BodyShape};

    fn crate_body() -> Body {
        Body::new(
            BodyId(9),
            BodyShape::Box { half_extents: Vec3::splat(0.25) },
            10.0,
            ContentFlags::DYNAMIC,
        )
    }

    fn frame_at(origin: Vec3) -> JointFrame {
        JointFrame {
            origin,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
        }
    }

    #[test]
    fn test_no_drive_inside_slack() {
        let body = crate_body();
        let grab = body.center_of_mass();
        let frame = frame_at(grab - Vec3::Z * 1.5);
        let joint = CompliantJoint::attach(
            Quat::IDENTITY,
            Vec3::Z * 1.5,
            &body,
            grab,
            JointLimits::default(),
        );

        let drive = joint.solve(&frame, Quat::IDENTITY, &body);
        assert!(drive.stretch < 1e-4);
        assert_eq!(drive.acceleration, Vec3::ZERO);
        assert_eq!(drive.angular_acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_pulls_toward_moved_target() {
        let body = crate_body();
        let grab = body.center_of_mass();
        let frame = frame_at(grab - Vec3::Z * 1.5);
        let joint = CompliantJoint::attach(
            Quat::IDENTITY,
            Vec3::Z * 1.5,
            &body,
            grab,
            JointLimits::default(),
        );

        let moved = frame_at(frame.origin + Vec3::X * 0.5);
        let drive = joint.solve(&moved, Quat::IDENTITY, &body);
        assert!(drive.acceleration.x > 0.0);
        assert!(drive.acceleration.y.abs() < 1e-4);
        // (0.5 - slack) * spring
        assert!((drive.acceleration.x - 0.49 * 400.0).abs() < 0.5);
    }

    #[test]
    fn test_angular_spring_is_half_strength_beyond_slack() {
        let body = crate_body();
        let grab = body.center_of_mass();
        let frame = frame_at(grab - Vec3::Z * 1.5);
        let joint = CompliantJoint::attach(
            Quat::IDENTITY,
            Vec3::Z * 1.5,
            &body,
            grab,
            JointLimits::default(),
        );

        // Holder turns 40 degrees; body should be driven 30 degrees worth
        let yaw = Quat::from_rotation_y(40f32.to_radians());
        let drive = joint.solve(&frame, yaw, &body);
        let expected = 30f32.to_radians() * 200.0;
        assert!((drive.angular_acceleration.y - expected).abs() < 0.5);
    }

    #[test]
    fn test_acceleration_is_capped() {
        let body = crate_body();
        let grab = body.center_of_mass();
        let frame = frame_at(grab);
        let joint = CompliantJoint::attach(Quat::IDENTITY, Vec3::ZERO, &body, grab, JointLimits::default());

        let far = frame_at(grab + Vec3::Y * 10.0);
        let drive = joint.solve(&far, Quat::IDENTITY, &body);
        assert!(drive.acceleration.length() <= 250.0 + 1e-3);
    }
}
