// Host-side tests for particle walls, elastic collisions and the particle module.

use glam::Vec2;
use physics_core::constants::{FRAME_DT, PARTICLE_DEFAULT_CCS, PARTICLE_RADIUS};
use physics_core::*;

fn area() -> Bounds {
    Bounds::from_size(Vec2::new(400.0, 400.0))
}

fn disc(x: f32, y: f32, vx: f32, vy: f32) -> Disc {
    Disc::new(Vec2::new(x, y), Vec2::new(vx, vy), PARTICLE_RADIUS)
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-3 * a.abs().max(b.abs()).max(1.0)
}

fn module(temperature: f32) -> ParticleModule {
    let ccs = PARTICLE_DEFAULT_CCS.map(|pair| pair.map(|cc| ControllerNumber::new(cc).unwrap()));
    ParticleModule::new(ccs, Channel::default(), Vec2::new(400.0, 400.0), temperature, 7)
}

#[test]
fn wall_contact_reflects_normal_velocity_exactly() {
    let mut d = disc(390.0, 200.0, 120.0, -35.0);
    assert!(resolve_walls(&mut d, area()));
    assert_eq!(d.velocity, Vec2::new(-120.0, -35.0));
    assert_eq!(d.position.x, 385.0);

    let mut d = disc(200.0, 3.0, 10.0, -80.0);
    assert!(resolve_walls(&mut d, area()));
    assert_eq!(d.velocity, Vec2::new(10.0, 80.0));
    assert_eq!(d.position.y, 15.0);
}

#[test]
fn corner_contact_reflects_both_axes() {
    let mut d = disc(5.0, 396.0, -30.0, 40.0);
    assert!(resolve_walls(&mut d, area()));
    assert_eq!(d.velocity, Vec2::new(30.0, -40.0));
    assert_eq!(d.position, Vec2::new(15.0, 385.0));
}

#[test]
fn no_wall_contact_is_untouched() {
    let mut d = disc(200.0, 200.0, 50.0, 50.0);
    assert!(!resolve_walls(&mut d, area()));
    assert_eq!(d, disc(200.0, 200.0, 50.0, 50.0));
}

#[test]
fn head_on_equal_masses_swap_velocities() {
    let mut a = disc(100.0, 100.0, 50.0, 0.0);
    let mut b = disc(125.0, 100.0, -20.0, 0.0);
    assert!(resolve_pair(&mut a, &mut b));
    assert!(close(a.velocity.x, -20.0));
    assert!(close(b.velocity.x, 50.0));
    assert!(close(a.position.distance(b.position), 2.0 * PARTICLE_RADIUS));
}

#[test]
fn oblique_collision_conserves_momentum_and_energy() {
    let mut a = disc(100.0, 100.0, 40.0, 10.0);
    let mut b = disc(120.0, 110.0, -10.0, -25.0);
    let p0 = a.momentum() + b.momentum();
    let e0 = a.kinetic_energy() + b.kinetic_energy();
    assert!(resolve_pair(&mut a, &mut b));
    let p1 = a.momentum() + b.momentum();
    let e1 = a.kinetic_energy() + b.kinetic_energy();
    assert!(close(p0.x, p1.x) && close(p0.y, p1.y), "{p0} vs {p1}");
    assert!(close(e0, e1), "{e0} vs {e1}");
}

#[test]
fn separating_overlap_keeps_velocities() {
    let mut a = disc(100.0, 100.0, -10.0, 0.0);
    let mut b = disc(120.0, 100.0, 10.0, 0.0);
    assert!(resolve_pair(&mut a, &mut b));
    assert_eq!(a.velocity, Vec2::new(-10.0, 0.0));
    assert_eq!(b.velocity, Vec2::new(10.0, 0.0));
    assert!(close(b.position.x - a.position.x, 30.0));
}

#[test]
fn coincident_centres_separate_along_x() {
    let mut a = disc(200.0, 200.0, 0.0, 0.0);
    let mut b = disc(200.0, 200.0, 0.0, 0.0);
    assert!(resolve_pair(&mut a, &mut b));
    assert!(a.position.is_finite() && b.position.is_finite());
    assert!(close(a.position.x - b.position.x, 30.0));
    assert_eq!(a.position.y, b.position.y);
}

#[test]
fn immovable_disc_acts_as_wall() {
    let mut a = disc(100.0, 100.0, 60.0, 0.0);
    let mut b = disc(125.0, 100.0, 0.0, 0.0);
    assert!(resolve_pair_weighted(&mut a, &mut b, 1.0, 0.0));
    assert_eq!(b.position, Vec2::new(125.0, 100.0));
    assert_eq!(b.velocity, Vec2::ZERO);
    assert!(close(a.velocity.x, -60.0));
    assert!(close(a.position.x, 95.0));
}

#[test]
fn module_wall_bounce_is_exact() {
    let mut m = module(0.0);
    m.particles[0].disc.position = Vec2::new(380.0, 200.0);
    m.particles[0].disc.velocity = Vec2::new(600.0, 0.0);
    m.particles[1].disc.position = Vec2::new(100.0, 100.0);
    m.particles[1].disc.velocity = Vec2::ZERO;

    m.step(FRAME_DT, &mut MemorySink::new());
    assert_eq!(m.particles[0].disc.velocity, Vec2::new(-600.0, 0.0));
    assert_eq!(m.particles[0].disc.position.x, 385.0);
}

#[test]
fn particles_stay_in_bounds_and_outputs_in_range() {
    let mut m = module(1.0);
    let mut sink = MemorySink::new();
    let lo = PARTICLE_RADIUS;
    let hi = 400.0 - PARTICLE_RADIUS;
    for _ in 0..3000 {
        m.step(FRAME_DT, &mut sink);
        for p in &m.particles {
            let pos = p.disc.position;
            assert!(pos.x >= lo && pos.x <= hi && pos.y >= lo && pos.y <= hi, "{pos}");
            assert!(p.disc.velocity.is_finite());
        }
    }
    assert!(!sink.messages.is_empty());
    assert!(sink.messages.iter().all(|m| (0..=127).contains(&m.value)));
}

#[test]
fn overlap_never_grows_across_steps() {
    let mut m = module(0.0);
    m.particles[0].disc.position = Vec2::new(200.0, 200.0);
    m.particles[0].disc.velocity = Vec2::new(100.0, 0.0);
    m.particles[1].disc.position = Vec2::new(240.0, 200.0);
    m.particles[1].disc.velocity = Vec2::new(-100.0, 0.0);
    let mut sink = MemorySink::new();
    for _ in 0..120 {
        m.step(FRAME_DT, &mut sink);
        let gap = m.particles[0].disc.position.distance(m.particles[1].disc.position);
        assert!(gap >= 2.0 * PARTICLE_RADIUS - 1e-3, "gap {gap}");
    }
}

#[test]
fn same_seed_same_motion() {
    let mut a = module(0.7);
    let mut b = module(0.7);
    let mut sink = MemorySink::new();
    for _ in 0..200 {
        a.step(FRAME_DT, &mut sink);
        b.step(FRAME_DT, &mut sink);
    }
    assert_eq!(a.particles[0].disc, b.particles[0].disc);
    assert_eq!(a.particles[1].disc, b.particles[1].disc);
}

#[test]
fn drag_and_throw_uses_last_frame_velocity() {
    let mut m = module(0.0);
    m.particles[0].disc.position = Vec2::new(200.0, 200.0);
    m.particles[0].disc.velocity = Vec2::ZERO;
    m.particles[1].disc.position = Vec2::new(50.0, 350.0);
    m.particles[1].disc.velocity = Vec2::ZERO;
    let mut sink = MemorySink::new();

    let origin = m.origin;
    let at = |x: f32, y: f32| origin + Vec2::new(x, y);
    let p = at(200.0, 200.0);
    m.handle_pointer(PointerEvent::down(p.x, p.y));
    assert!(m.particles[0].mode.is_held());
    m.step(FRAME_DT, &mut sink);
    let p = at(210.0, 200.0);
    m.handle_pointer(PointerEvent::moved(p.x, p.y));
    m.step(FRAME_DT, &mut sink);
    assert_eq!(m.particles[0].disc.position, Vec2::new(210.0, 200.0));
    m.handle_pointer(PointerEvent::up(p.x, p.y));

    assert!(!m.particles[0].mode.is_held());
    let v = m.particles[0].disc.velocity;
    assert!(close(v.x, 600.0) && v.y.abs() < 1e-3, "{v}");
}

#[test]
fn temperature_is_validated() {
    let mut m = module(0.5);
    assert!(m.set_temperature(1.5).is_err());
    assert_eq!(m.temperature, 0.5);
    m.set_temperature(0.0).unwrap();
    assert_eq!(speed_multiplier(m.temperature), 1.0);
    assert_eq!(speed_multiplier(1.0), 3.0);
}

#[test]
fn throw_survives_several_steps_per_redraw() {
    let mut m = module(0.0);
    m.particles[0].disc.position = Vec2::new(200.0, 200.0);
    m.particles[0].disc.velocity = Vec2::ZERO;
    m.particles[1].disc.position = Vec2::new(50.0, 350.0);
    m.particles[1].disc.velocity = Vec2::ZERO;
    let mut sink = MemorySink::new();

    let p = m.origin + Vec2::new(200.0, 200.0);
    m.handle_pointer(PointerEvent::down(p.x, p.y));
    m.step(FRAME_DT, &mut sink);
    let p = m.origin + Vec2::new(205.0, 200.0);
    m.handle_pointer(PointerEvent::moved(p.x, p.y));
    m.step(FRAME_DT, &mut sink);
    m.step(FRAME_DT, &mut sink);
    m.handle_pointer(PointerEvent::up(p.x, p.y));

    let v = m.particles[0].disc.velocity;
    assert!(close(v.x, 300.0) && v.y.abs() < 1e-3, "{v}");
}
