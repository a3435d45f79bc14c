//! Kinetra - headless driver
//!
//! Runs a scripted session in the test arena: participants converge on a
//! shared prop, contest its lease, back off, jump and slide. Motor
//! transitions and lease hand-offs are logged through `tracing`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::{Vec2, Vec3};
use kinetra_authority::LeaseNotice;
use kinetra_game::{InputEvent, ParticipantId, Simulation, SimulationConfig};
use kinetra_physics::MovementConfig;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Radius of the spawn circle around the contested prop (m).
const SPAWN_RADIUS: f32 = 4.0;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Default,
    Arcade,
    Tactical,
}

impl Preset {
    fn movement(self) -> MovementConfig {
        match self {
            Self::Default => MovementConfig::default(),
            Self::Arcade => MovementConfig::arcade(),
            Self::Tactical => MovementConfig::tactical(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "kinetra", version, about = "Run a scripted headless locomotion and lease session")]
struct Opts {
    /// TOML simulation config (defaults apply to anything left out)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Movement preset, applied unless a config file is given
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Number of participants
    #[arg(long, default_value_t = 2)]
    participants: u32,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("kinetra=info".parse()?))
        .init();

    let config = match &opts.config {
        Some(path) => SimulationConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig {
            movement: opts.preset.movement(),
            ..SimulationConfig::default()
        },
    };

    let mut sim = Simulation::arena(config).context("building arena")?;
    let prop = sim.spawn_prop(Vec3::ZERO, Vec3::splat(0.3), 20.0);

    let count = opts.participants.max(1);
    let participants: Vec<ParticipantId> = (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            let spawn = Vec3::new(angle.sin(), 0.0, angle.cos()) * SPAWN_RADIUS;
            // Face the prop at the center
            let yaw = (-spawn.x).atan2(-spawn.z).to_degrees();
            sim.spawn_participant(spawn, yaw)
        })
        .collect();

    info!(ticks = opts.ticks, participants = count, %prop, "session started");

    for tick in 0..opts.ticks {
        script(&mut sim, &participants, tick);

        let report = sim.tick();
        for (participant, transition) in &report.transitions {
            info!(%participant, from = %transition.from, to = %transition.to, t = report.now, "state change");
        }
        for notice in &report.notices {
            match notice {
                LeaseNotice::Granted { body, holder } => info!(%body, %holder, t = report.now, "lease granted"),
                LeaseNotice::Revoked { body, previous } => info!(%body, %previous, t = report.now, "lease returned to host"),
            }
        }
    }

    for player in sim.players() {
        if let Some(body) = sim.bodies().get(player.body()) {
            info!(
                participant = %player.participant(),
                state = %player.state(),
                position = ?body.position,
                transitions = player.transitions().count(),
                "final state"
            );
        }
    }
    let holder = sim.arbiter().table().record(prop).map(|r| r.holder);
    info!(%prop, ?holder, "final lease");

    Ok(())
}

/// Scripted input for every participant at `tick`.
fn script(sim: &mut Simulation, participants: &[ParticipantId], tick: u64) {
    for (index, &participant) in participants.iter().enumerate() {
        let Some(input) = sim.input_mut(participant) else {
            continue;
        };
        // Stagger arrivals so the first one to touch the prop wins it
        let start = index as u64 * 20;
        match tick {
            t if t == start => input.set_move(Vec2::new(0.0, 1.0)),
            t if t == start + 60 => input.set_move(Vec2::ZERO),
            150 if index == 0 => input.set_move(Vec2::new(0.0, -1.0)),
            190 if index == 0 => input.set_move(Vec2::ZERO),
            240 => input.press(InputEvent::Jump),
            300 => input.set_move(Vec2::new(0.0, -1.0)),
            340 => input.set_crouch(true),
            400 => {
                input.set_crouch(false);
                input.set_move(Vec2::ZERO);
            }
            _ => {}
        }
    }
}
