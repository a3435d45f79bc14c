//! Fixed-tick simulation driver.
//!
//! One [`Simulation`] owns the collision world, every body, the lease
//! arbiter and each participant's [`Player`]. [`Simulation::tick`] advances
//! everything by one fixed step in a stable order:
//!
//! ```text
//! arbiter pump ─► notices to every link ─► per player:
//!     ground sense ─► suspension ─► motor ─► grab ─► look
//! ─► integrate bodies ─► sync colliders ─► contact pushes
//! ─► contact proxies (lease traffic for the next pump)
//! ```
//!
//! Every write a player makes goes through its authority gate, so a body
//! only moves under forces from whoever holds its lease.

use glam::Vec3;
use kinetra_authority::{LeaseArbiter, LeaseNotice, ParticipantId};
use kinetra_physics::{
    BodyId, BodySet, BodyShape, CollisionQuery, CollisionWorld, ConfigHandle, ContentFlags, MotorTransition,
    MovementConfig, QueryFilter, SimContext,
};
use tracing::{debug, info};

use crate::config::{ConfigError, SimulationConfig};
use crate::contacts::{push_impulse, ContactChanges};
use crate::input::InputQueue;
use crate::player::Player;

/// Planar deceleration of props resting on a surface (m/s²).
const PROP_GROUND_FRICTION: f32 = 3.0;

/// How far below a spawn point to look for ground (m).
const SPAWN_PROBE_DEPTH: f32 = 50.0;

/// What happened during one tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Index of the tick that just ran.
    pub tick: u64,
    /// Simulation time at the start of the tick.
    pub now: f64,
    pub notices: Vec<LeaseNotice>,
    pub transitions: Vec<(ParticipantId, MotorTransition)>,
    pub contacts: Vec<(ParticipantId, ContactChanges)>,
    /// Pushes that reached a body (the gate allowed them).
    pub pushes: Vec<(ParticipantId, BodyId)>,
    pub depenetrated: Vec<BodyId>,
}

/// The whole simulated world.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    movement: ConfigHandle,
    ctx: SimContext,
    tick: u64,
    world: CollisionWorld,
    bodies: BodySet,
    arbiter: LeaseArbiter,
    players: Vec<Player>,
    props: Vec<BodyId>,
    next_participant: u32,
}

impl Simulation {
    /// Create an empty world.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let ctx = SimContext::new(0.0, config.delta_time(), config.gravity);
        Ok(Self {
            movement: ConfigHandle::new(config.movement.clone()),
            arbiter: LeaseArbiter::new(&config.lease),
            config,
            ctx,
            tick: 0,
            world: CollisionWorld::new(),
            bodies: BodySet::new(),
            players: Vec::new(),
            props: Vec::new(),
            next_participant: ParticipantId::HOST.0 + 1,
        })
    }

    /// A walled 40 m square floor with its surface at y = 0.
    pub fn arena(config: SimulationConfig) -> Result<Self, ConfigError> {
        let mut sim = Self::new(config)?;
        sim.add_static_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 0.5, 20.0));
        for (center, half) in [
            (Vec3::new(0.0, 2.0, 20.5), Vec3::new(20.0, 2.0, 0.5)),
            (Vec3::new(0.0, 2.0, -20.5), Vec3::new(20.0, 2.0, 0.5)),
            (Vec3::new(20.5, 2.0, 0.0), Vec3::new(0.5, 2.0, 20.0)),
            (Vec3::new(-20.5, 2.0, 0.0), Vec3::new(0.5, 2.0, 20.0)),
        ] {
            sim.add_static_box(center, half);
        }
        Ok(sim)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    /// Simulation time of the next tick.
    pub fn now(&self) -> f64 {
        self.ctx.now
    }

    /// Number of ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    pub fn arbiter(&self) -> &LeaseArbiter {
        &self.arbiter
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn props(&self) -> &[BodyId] {
        &self.props
    }

    /// Shared movement configuration every player reads from.
    pub fn movement(&self) -> &ConfigHandle {
        &self.movement
    }

    /// Add immovable level geometry.
    pub fn add_static_box(&mut self, center: Vec3, half_extents: Vec3) -> u32 {
        self.world.add_box(center, half_extents, ContentFlags::SOLID)
    }

    /// Spawn a player for a new participant with its feet near `spawn`.
    ///
    /// The body is dropped onto whatever ground lies below `spawn` so its
    /// center of mass starts at ride height.
    pub fn spawn_participant(&mut self, spawn: Vec3, yaw_deg: f32) -> ParticipantId {
        let participant = ParticipantId(self.next_participant);
        self.next_participant += 1;

        let movement = self.movement.snapshot();
        let radius = movement.capsule_radius;
        let height = movement.stand_height;

        let feet = self.spawn_feet(spawn, movement.ride_height - height * 0.5);
        let body = self.bodies.spawn(
            BodyShape::Capsule { radius, height },
            self.config.player_mass,
            ContentFlags::PLAYER_BODY,
        );
        body.position = feet;
        let body_id = body.id;
        self.world.attach_body(body);

        let link = self.arbiter.connect(participant);
        let mut player = Player::new(
            body_id,
            self.movement.clone(),
            self.config.look.clone(),
            self.config.interaction.clone(),
            link,
        )
        .with_yaw(yaw_deg);
        player.motor_mut().initialize(&mut self.bodies);
        if let Some(body) = self.bodies.get(body_id) {
            self.world.sync_body(body);
        }

        info!(%participant, body = %body_id, ?feet, "participant spawned");
        self.players.push(player);
        participant
    }

    /// Feet position for a spawn: ground below `spawn`, raised by `lift`.
    fn spawn_feet(&self, spawn: Vec3, lift: f32) -> Vec3 {
        let filter = QueryFilter::new(ContentFlags::MASK_GROUND);
        match self
            .world
            .raycast(spawn + Vec3::Y * 0.01, Vec3::NEG_Y, SPAWN_PROBE_DEPTH, &filter)
        {
            Some(hit) => Vec3::new(spawn.x, hit.point.y + lift.max(0.0), spawn.z),
            None => spawn,
        }
    }

    /// Spawn a dynamic box prop resting with its base at `base`.
    pub fn spawn_prop(&mut self, base: Vec3, half_extents: Vec3, mass: f32) -> BodyId {
        let body = self
            .bodies
            .spawn(BodyShape::Box { half_extents }, mass, ContentFlags::DYNAMIC);
        body.position = base;
        body.ground_friction = PROP_GROUND_FRICTION;
        let id = body.id;
        self.world.attach_body(body);
        self.props.push(id);
        debug!(body = %id, mass, "prop spawned");
        id
    }

    /// Remove a prop and release any lease on it.
    pub fn remove_prop(&mut self, body: BodyId) -> bool {
        let Some(index) = self.props.iter().position(|&p| p == body) else {
            return false;
        };
        self.props.remove(index);
        self.bodies.remove(body);
        self.world.detach_body(body);
        self.arbiter.forget(body);
        true
    }

    pub fn player(&self, participant: ParticipantId) -> Option<&Player> {
        self.players.iter().find(|p| p.participant() == participant)
    }

    /// Input queue of a participant's player.
    pub fn input_mut(&mut self, participant: ParticipantId) -> Option<&mut InputQueue> {
        self.players
            .iter_mut()
            .find(|p| p.participant() == participant)
            .map(Player::input_mut)
    }

    /// Replace the shared movement configuration and apply it to every player now.
    pub fn set_movement_config(&mut self, config: MovementConfig) -> u64 {
        let version = self.movement.set(config.clone());
        self.config.movement = config;
        for player in &mut self.players {
            player.motor_mut().refresh_config(&mut self.bodies);
        }
        self.world.sync_bodies(&self.bodies);
        info!(version, "movement config replaced");
        version
    }

    /// Advance the world by one fixed tick.
    pub fn tick(&mut self) -> TickReport {
        let ctx = self.ctx;
        let mut report = TickReport {
            tick: self.tick,
            now: ctx.now,
            ..TickReport::default()
        };

        report.notices = self.arbiter.pump(ctx.now);
        for player in &mut self.players {
            player.sync_authority(&self.bodies);
        }

        for player in &mut self.players {
            let outcome = player.tick(&ctx, &self.world, &mut self.bodies);
            if let Some(transition) = outcome.motor.transition {
                report.transitions.push((player.participant(), transition));
            }
        }

        let step = self.bodies.step(&self.world, ctx.gravity, ctx.dt);
        self.world.sync_bodies(&self.bodies);
        report.depenetrated = step.depenetrated;

        for contact in &step.contacts {
            let Some(other) = contact.contact.other else {
                continue;
            };
            let Some(player) = self.players.iter().find(|p| p.body() == contact.body) else {
                continue;
            };
            let Some(target) = self.bodies.get(other).filter(|b| b.is_dynamic()) else {
                continue;
            };
            let Some(impulse) = push_impulse(&contact.contact, target.mass, &self.config.interaction) else {
                continue;
            };
            if player.link().holds(other) {
                report.pushes.push((player.participant(), other));
            }
            player.push(&mut self.bodies, other, impulse, contact.contact.point, ctx.dt);
        }

        for player in &mut self.players {
            let changes = player.update_contacts(&self.world, &self.bodies);
            if !changes.is_empty() {
                report.contacts.push((player.participant(), changes));
            }
        }

        self.ctx = ctx.next();
        self.tick += 1;
        report
    }

    /// Run `ticks` ticks, discarding the reports.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }
}
