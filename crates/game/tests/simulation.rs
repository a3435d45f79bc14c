//! End-to-end runs of the full simulation: contact leases, pushing, grabbing
//! and throwing.

use glam::{Vec2, Vec3};
use kinetra_authority::HasAuthority;
use kinetra_game::{BodyId, InputEvent, MotorState, ParticipantId, Simulation, SimulationConfig};

fn arena() -> Simulation {
    Simulation::arena(SimulationConfig::default()).unwrap()
}

fn holder(sim: &Simulation, body: BodyId) -> Option<ParticipantId> {
    sim.arbiter().table().record(body).map(|r| r.holder)
}

fn position(sim: &Simulation, body: BodyId) -> Vec3 {
    sim.bodies().get(body).unwrap().position
}

/// Tilt a participant's view by `pitch_deg` over one tick.
fn pitch_view(sim: &mut Simulation, p: ParticipantId, pitch_deg: f32) {
    let sensitivity = sim.config().look.sensitivity;
    sim.input_mut(p).unwrap().look(Vec2::new(0.0, pitch_deg / sensitivity));
    sim.tick();
}

#[test]
fn test_first_contact_wins_then_lease_moves_on_after_grace() {
    let mut sim = arena();
    let prop = sim.spawn_prop(Vec3::ZERO, Vec3::splat(0.25), 30.0);

    // Both players start just inside the contact margin of opposite faces
    let a = sim.spawn_participant(Vec3::new(0.0, 0.0, -0.7), 0.0);
    sim.run(3);
    assert_eq!(holder(&sim, prop), Some(a));

    let b = sim.spawn_participant(Vec3::new(0.0, 0.0, 0.7), 180.0);
    sim.run(3);
    assert!(sim.player(b).unwrap().contacts().is_touching(prop));
    assert_eq!(holder(&sim, prop), Some(a));
    assert_eq!(sim.player(b).unwrap().link().view().holder(prop), Some(a));
    assert!(!sim.player(b).unwrap().link().holds(prop));

    // A backs off; the lease survives the grace period, then B claims it
    sim.input_mut(a).unwrap().set_move(Vec2::new(0.0, -1.0));
    sim.run(30);
    sim.input_mut(a).unwrap().set_move(Vec2::ZERO);
    assert!(!sim.player(a).unwrap().contacts().is_touching(prop));

    sim.run(60);
    assert_eq!(holder(&sim, prop), Some(b));
    assert!(sim.player(b).unwrap().link().holds(prop));
    assert!(!sim.player(a).unwrap().link().holds(prop));
}

#[test]
fn test_walking_into_a_prop_pushes_it() {
    let mut sim = arena();
    let prop = sim.spawn_prop(Vec3::new(0.0, 0.0, 2.0), Vec3::splat(0.25), 10.0);
    let p = sim.spawn_participant(Vec3::ZERO, 0.0);
    sim.run(10);

    sim.input_mut(p).unwrap().set_move(Vec2::new(0.0, 1.0));
    let mut pushes = 0;
    for _ in 0..60 {
        pushes += sim.tick().pushes.iter().filter(|(who, body)| *who == p && *body == prop).count();
    }

    assert!(pushes > 0);
    assert_eq!(holder(&sim, prop), Some(p));
    assert!(position(&sim, prop).z > 2.2, "prop at {}", position(&sim, prop));
}

#[test]
fn test_grab_carry_and_throw() {
    let mut sim = arena();
    let prop = sim.spawn_prop(Vec3::new(0.0, 0.0, 1.5), Vec3::splat(0.25), 10.0);
    let p = sim.spawn_participant(Vec3::ZERO, 0.0);
    sim.run(10);
    assert_eq!(sim.player(p).unwrap().state(), MotorState::Grounded);

    // Look down at the prop and grab it
    pitch_view(&mut sim, p, -42.0);
    sim.input_mut(p).unwrap().press(InputEvent::Interact);
    sim.tick();
    assert_eq!(sim.player(p).unwrap().grab().held_body(), Some(prop));

    sim.run(3);
    assert_eq!(holder(&sim, prop), Some(p));
    assert!(sim.arbiter().table().record(prop).unwrap().pinned);
    assert!(sim.player(p).unwrap().grab().held().unwrap().confirmed);

    // Level the view; the prop is lifted in front of the eyes
    pitch_view(&mut sim, p, 42.0);
    sim.run(120);
    let carried = position(&sim, prop);
    assert!(carried.y > 0.6, "prop at {carried}");
    assert!(carried.z > 0.8 && carried.z < 2.2, "prop at {carried}");

    sim.input_mut(p).unwrap().press(InputEvent::Throw);
    sim.tick();
    assert!(sim.player(p).unwrap().grab().held().is_none());
    assert!(sim.bodies().get(prop).unwrap().velocity.z > 5.0);

    sim.run(2);
    assert_eq!(holder(&sim, prop), None);

    sim.run(20);
    assert!(position(&sim, prop).z > 3.0);
}

#[test]
fn test_heavy_prop_is_not_grabbed() {
    let mut sim = arena();
    let prop = sim.spawn_prop(Vec3::new(0.0, 0.0, 1.5), Vec3::splat(0.25), 60.0);
    let p = sim.spawn_participant(Vec3::ZERO, 0.0);
    sim.run(10);

    pitch_view(&mut sim, p, -42.0);
    sim.input_mut(p).unwrap().press(InputEvent::Interact);
    sim.run(3);

    assert!(sim.player(p).unwrap().grab().held().is_none());
    assert_eq!(holder(&sim, prop), None);
}

#[test]
fn test_removed_prop_drops_the_grab() {
    let mut sim = arena();
    let prop = sim.spawn_prop(Vec3::new(0.0, 0.0, 1.5), Vec3::splat(0.25), 10.0);
    let p = sim.spawn_participant(Vec3::ZERO, 0.0);
    sim.run(10);

    pitch_view(&mut sim, p, -42.0);
    sim.input_mut(p).unwrap().press(InputEvent::Interact);
    sim.run(3);
    assert_eq!(holder(&sim, prop), Some(p));

    assert!(sim.remove_prop(prop));
    sim.run(2);
    assert!(sim.player(p).unwrap().grab().held().is_none());
    assert!(!sim.player(p).unwrap().link().holds(prop));
}

#[test]
fn test_throw_in_the_grab_tick_leaves_no_lease() {
    let mut sim = arena();
    let prop = sim.spawn_prop(Vec3::new(0.0, 0.0, 1.5), Vec3::splat(0.25), 10.0);
    let p = sim.spawn_participant(Vec3::ZERO, 0.0);
    sim.run(10);

    pitch_view(&mut sim, p, -42.0);
    let input = sim.input_mut(p).unwrap();
    input.press(InputEvent::Interact);
    input.press(InputEvent::Throw);
    sim.tick();
    assert!(sim.player(p).unwrap().grab().held().is_none());

    sim.run(600);
    assert_eq!(holder(&sim, prop), None);
    assert!(sim.player(p).unwrap().link().view().is_free(prop));
}

#[test]
fn test_late_joiner_cannot_grab_a_leased_prop() {
    let mut sim = arena();
    let prop = sim.spawn_prop(Vec3::ZERO, Vec3::splat(0.25), 10.0);
    let b = sim.spawn_participant(Vec3::new(0.0, 0.0, 0.7), 180.0);
    sim.run(3);
    assert_eq!(holder(&sim, prop), Some(b));

    let c = sim.spawn_participant(Vec3::new(0.0, 0.0, -1.5), 0.0);
    sim.run(10);
    assert_eq!(sim.player(c).unwrap().link().view().holder(prop), Some(b));

    pitch_view(&mut sim, c, -42.0);
    sim.input_mut(c).unwrap().press(InputEvent::Interact);
    sim.run(30);
    assert!(sim.player(c).unwrap().grab().held().is_none());
    assert_eq!(holder(&sim, prop), Some(b));
}
