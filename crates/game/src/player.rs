//! A participant's player: body, locomotion, look, grab and contacts.

use std::collections::VecDeque;

use glam::Vec3;
use kinetra_authority::{ArbiterLink, AuthorityChannel, LeaseNotice, ParticipantId};
use kinetra_physics::movement::{GroundSensor, LookSnapshot, MotorReport, SnapshotFeed, SuspensionController};
use kinetra_physics::{
    warn_once, BodyId, BodySet, CollisionWorld, ConfigHandle, Dynamics, LocomotionMotor, LookConfig, LookIntegrator,
    MotorInput, MotorState, MotorTransition, SimContext, WarnOnce,
};
use tracing::debug;

use crate::config::InteractionConfig;
use crate::contacts::{ContactChanges, ContactTracker};
use crate::gate::AuthorityGate;
use crate::grab::{GrabInteractor, Viewpoint};
use crate::input::{InputEvent, InputQueue};

/// State changes kept for inspection.
const TRANSITION_LOG_LEN: usize = 64;

/// What one player did during a tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerTickReport {
    pub motor: MotorReport,
    pub grabbed: Option<BodyId>,
    pub released: Option<BodyId>,
    pub thrown: Option<BodyId>,
}

/// Everything one participant simulates for itself.
#[derive(Debug)]
pub struct Player {
    participant: ParticipantId,
    body: BodyId,
    motor: LocomotionMotor,
    sensor: GroundSensor,
    suspension: SuspensionController,
    look: LookIntegrator,
    feed: SnapshotFeed,
    grab: GrabInteractor,
    contacts: ContactTracker,
    link: ArbiterLink,
    input: InputQueue,
    transitions: VecDeque<(f64, MotorTransition)>,
    missing_body: WarnOnce,
}

impl Player {
    pub fn new(
        body: BodyId,
        movement: ConfigHandle,
        look: LookConfig,
        interaction: InteractionConfig,
        link: ArbiterLink,
    ) -> Self {
        Self {
            participant: link.participant(),
            body,
            motor: LocomotionMotor::new(body, movement),
            sensor: GroundSensor::new(),
            suspension: SuspensionController::new(),
            look: LookIntegrator::new(look),
            feed: SnapshotFeed::new(),
            grab: GrabInteractor::new(body, interaction),
            contacts: ContactTracker::new(),
            link,
            input: InputQueue::new(),
            transitions: VecDeque::with_capacity(TRANSITION_LOG_LEN),
            missing_body: WarnOnce::new(),
        }
    }

    /// Face `yaw_deg` before the first tick.
    pub fn with_yaw(mut self, yaw_deg: f32) -> Self {
        self.look = self.look.with_yaw(yaw_deg);
        self.feed.publish(*self.look.snapshot());
        self
    }

    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn state(&self) -> MotorState {
        self.motor.state()
    }

    pub fn motor(&self) -> &LocomotionMotor {
        &self.motor
    }

    pub(crate) fn motor_mut(&mut self) -> &mut LocomotionMotor {
        &mut self.motor
    }

    pub fn look(&self) -> &LookIntegrator {
        &self.look
    }

    /// Presentation-side reader of this player's look snapshots.
    pub fn snapshot_feed(&self) -> SnapshotFeed {
        self.feed.clone()
    }

    pub fn grab(&self) -> &GrabInteractor {
        &self.grab
    }

    pub fn contacts(&self) -> &ContactTracker {
        &self.contacts
    }

    pub fn link(&self) -> &ArbiterLink {
        &self.link
    }

    pub fn input_mut(&mut self) -> &mut InputQueue {
        &mut self.input
    }

    /// Recent state changes with the time they happened, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &(f64, MotorTransition)> {
        self.transitions.iter()
    }

    /// Eye position and view angles for the body as it is now.
    pub fn viewpoint(&self, dynamics: &impl Dynamics) -> Option<Viewpoint> {
        let body = dynamics.body(self.body)?;
        Some(Viewpoint {
            origin: body.position + Vec3::Y * self.motor.eye_height(),
            yaw_deg: self.look.yaw(),
            pitch_deg: self.look.pitch(),
            velocity: body.velocity,
        })
    }

    /// Interpolated look angles for presentation at wall time `now`.
    pub fn presentation_angles(&self, now: f64, tick_duration: f32) -> (f32, f32) {
        let snapshot: LookSnapshot = self.feed.latest();
        snapshot.interpolate(now, tick_duration)
    }

    /// Apply lease notices from the arbiter and let the grab react to them.
    pub fn sync_authority(&mut self, bodies: &BodySet) -> Vec<LeaseNotice> {
        let notices = self.link.poll();
        self.grab.reconcile(bodies, &self.link, self.link.view());

        // A body freed while we were already touching it gets claimed again
        for notice in &notices {
            if let LeaseNotice::Revoked { body, previous } = *notice {
                if previous != self.participant && self.contacts.is_touching(body) {
                    self.link.contact_begin(body);
                }
            }
        }
        notices
    }

    /// Run ground sensing, suspension, the motor, interaction and look for one tick.
    pub fn tick(&mut self, ctx: &SimContext, world: &CollisionWorld, bodies: &mut BodySet) -> PlayerTickReport {
        let input = self.input.drain();
        let mut report = PlayerTickReport::default();

        let Some(body) = bodies.get(self.body) else {
            warn_once!(self.missing_body, participant = %self.participant, body = %self.body, "player body missing");
            return report;
        };
        let probe = self.motor.ground_probe(body);
        let center = body.center_of_mass();
        let filter = self.motor.ground_filter();

        let mut gate = AuthorityGate::new(bodies, self.link.view(), self.participant, self.body);

        let contact = self.sensor.sense(ctx, world, &probe, &filter);
        let spring = self.motor.spring_params();
        self.suspension
            .apply(ctx, world, &mut gate, self.body, center, &spring, &filter);

        let motor_input = MotorInput {
            move_axis: input.analog.move_axis,
            crouch_held: input.analog.crouch_held,
            jump_pressed: input.pressed(InputEvent::Jump),
            yaw_deg: self.look.yaw(),
        };
        report.motor = self
            .motor
            .tick(ctx, world, &mut gate, &contact, &mut self.suspension, &motor_input);
        if let Some(transition) = report.motor.transition {
            if self.transitions.len() == TRANSITION_LOG_LEN {
                self.transitions.pop_front();
            }
            self.transitions.push_back((ctx.now, transition));
        }

        if let Some(view) = self.viewpoint(&gate) {
            for event in &input.events {
                match event {
                    InputEvent::Interact => {
                        let before = self.grab.held_body();
                        if self
                            .grab
                            .try_interact(&view, world, &gate, &self.link, self.link.view())
                        {
                            report.released = before;
                            report.grabbed = self.grab.held_body();
                        }
                    }
                    InputEvent::Throw => {
                        report.thrown = self.grab.try_throw(&view, &mut gate, &self.link);
                    }
                    InputEvent::Jump => {}
                }
            }
            self.grab.tick(&view, &mut gate);
        }

        self.look.accumulate(input.look_delta);
        self.feed.publish(self.look.tick(ctx.now));

        report
    }

    /// Push a body this player ran into, if the gate lets it.
    pub fn push(&self, bodies: &mut BodySet, target: BodyId, impulse: Vec3, point: Vec3, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let mut gate = AuthorityGate::new(bodies, self.link.view(), self.participant, self.body);
        if gate.may_write(target) {
            debug!(participant = %self.participant, body = %target, ?impulse, "push");
        }
        gate.apply_force_at_point(target, impulse / dt, point);
    }

    /// Refresh the contact proxy and report changes to the arbiter.
    pub fn update_contacts(&mut self, world: &CollisionWorld, bodies: &BodySet) -> ContactChanges {
        let changes = match bodies.get(self.body) {
            Some(body) => self.contacts.update(world, body, self.grab.config().contact_margin),
            None => self.contacts.clear(),
        };
        for &body in &changes.began {
            self.link.contact_begin(body);
        }
        for &body in &changes.ended {
            self.link.contact_end(body);
        }
        changes
    }
}
