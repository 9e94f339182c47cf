//! Driver lifecycle, input timing and config handling.

use gravfield::prelude::*;
use gravfield::{ConfigError, FrameFault, ParticleStore};

fn config(count: usize) -> FieldConfig {
    FieldConfig { particle_count: count, seed: Some(11), ..FieldConfig::default() }
}

fn running(count: usize) -> FieldDriver {
    let mut driver = FieldDriver::new(config(count)).unwrap();
    assert!(driver.attach(Viewport::new(800.0, 600.0, 1.0)));
    driver
}

#[test]
fn test_attach_seeds_inside_viewport() {
    let driver = running(80);
    assert_eq!(driver.state(), LifecycleState::Running);
    assert_eq!(driver.particles().len(), 80);
    for p in driver.particles() {
        assert!((0.0..=800.0).contains(&p.position.x));
        assert!((0.0..=600.0).contains(&p.position.y));
        assert!((0.5..=1.0).contains(&p.mass));
    }
}

#[test]
fn test_attach_only_once() {
    let mut driver = running(4);
    assert!(!driver.attach(Viewport::new(100.0, 100.0, 1.0)));
    driver.detach();
    assert!(!driver.attach(Viewport::new(100.0, 100.0, 1.0)));
}

#[test]
fn test_each_frame_clears_then_draws_every_particle() {
    let mut driver = running(30);
    let mut canvas = DrawList::new();

    for _ in 0..3 {
        assert_eq!(driver.tick(&mut canvas), FrameStatus::Rendered);
    }

    assert_eq!(canvas.commands()[0], gravfield::DrawCommand::Clear);
    assert_eq!(canvas.discs().count(), 30);
    assert_eq!(driver.frame_count(), 3);
}

#[test]
fn test_detach_stops_drawing_and_state() {
    let mut driver = running(20);
    let mut canvas = DrawList::new();
    for _ in 0..10 {
        driver.tick(&mut canvas);
    }

    driver.detach();
    let calls = canvas.total_calls();
    let snapshot: Vec<Particle> = driver.particles().to_vec();

    for _ in 0..10 {
        assert_eq!(driver.tick(&mut canvas), FrameStatus::Inactive);
    }
    driver.pointer_moved(10.0, 10.0);
    driver.resize(Viewport::new(50.0, 50.0, 1.0));

    assert_eq!(canvas.total_calls(), calls);
    assert_eq!(driver.particles(), snapshot.as_slice());
    assert_eq!(driver.state(), LifecycleState::Stopped);
    assert!(!driver.attractor().is_active());
}

#[test]
fn test_resize_keeps_mass_velocity_and_phase() {
    let mut driver = running(25);
    let mut canvas = DrawList::new();
    driver.tick(&mut canvas);
    let before: Vec<Particle> = driver.particles().to_vec();

    driver.resize(Viewport::new(320.0, 240.0, 2.0));

    assert_eq!(driver.viewport(), Viewport::new(320.0, 240.0, 2.0));
    for (after, before) in driver.particles().iter().zip(&before) {
        assert_eq!(after.mass, before.mass);
        assert_eq!(after.velocity, before.velocity);
        assert_eq!(after.phase, before.phase);
        assert_eq!(after.position, before.position);
    }
}

#[test]
fn test_shrunk_viewport_pulls_particles_back_inside() {
    let mut driver = FieldDriver::new(config(40)).unwrap();
    driver.attach(Viewport::new(1600.0, 1200.0, 1.0));
    let mut canvas = DrawList::new();
    driver.tick(&mut canvas);
    assert!(driver.particles().iter().any(|p| p.position.x > 400.0 || p.position.y > 300.0));

    driver.resize(Viewport::new(400.0, 300.0, 1.0));
    for _ in 0..4000 {
        assert_eq!(driver.tick(&mut canvas), FrameStatus::Rendered);
    }

    assert_eq!(driver.state(), LifecycleState::Running);
    let slack = 5.0;
    for p in driver.particles() {
        assert!(
            (-slack..=400.0 + slack).contains(&p.position.x)
                && (-slack..=300.0 + slack).contains(&p.position.y),
            "particle left behind at {:?}",
            p.position
        );
    }
}

#[test]
fn test_degenerate_viewport_skips_without_drawing() {
    let mut driver = FieldDriver::new(config(10)).unwrap();
    driver.attach(Viewport::new(0.0, 600.0, 1.0));
    let mut canvas = DrawList::new();

    assert_eq!(driver.tick(&mut canvas), FrameStatus::Skipped);
    assert_eq!(canvas.total_calls(), 0);
    assert!(driver.particles().is_empty());

    driver.resize(Viewport::new(400.0, 300.0, 1.0));
    assert_eq!(driver.tick(&mut canvas), FrameStatus::Rendered);
    assert_eq!(driver.particles().len(), 10);
}

#[test]
fn test_pointer_input_applies_next_frame() {
    let mut driver = running(5);
    driver.pointer_moved(200.0, 150.0);
    assert_eq!(driver.attractor().position, Vec2::new(200.0, 150.0));
    assert!(driver.attractor().is_active());

    driver.pointer_left();
    assert!(!driver.attractor().is_active());

    driver.set_attractor_strength(50.0);
    assert_eq!(driver.attractor().strength(), gravfield::ATTRACTOR_STRENGTH_LIMIT);
}

#[test]
fn test_non_finite_state_faults_the_driver() {
    let mut driver = FieldDriver::new(config(1)).unwrap();
    let broken = Particle {
        velocity: Vec2::new(f32::INFINITY, 0.0),
        ..Particle::at_rest(Vec2::new(100.0, 100.0), 1.0, 0.0)
    };
    driver.attach_with_particles(
        Viewport::new(400.0, 300.0, 1.0),
        ParticleStore::from_particles([broken]),
    );
    let mut canvas = DrawList::new();

    assert_eq!(driver.tick(&mut canvas), FrameStatus::Faulted);
    assert_eq!(driver.state(), LifecycleState::Faulted);
    assert_eq!(driver.fault(), Some(&FrameFault::NonFinite));
    assert_eq!(canvas.total_calls(), 0);
    assert_eq!(driver.tick(&mut canvas), FrameStatus::Inactive);
}

#[test]
fn test_tuning_rejects_bad_values() {
    let mut driver = running(5);
    let physics = PhysicsConfig { damping: 1.5, ..PhysicsConfig::default() };
    assert!(matches!(driver.set_physics(physics), Err(ConfigError::Invalid(_))));
    assert_eq!(driver.config().physics.damping, PhysicsConfig::default().damping);

    let render = RenderConfig { line_alpha: 0.25, ..RenderConfig::default() };
    driver.set_render(render).unwrap();
    assert_eq!(driver.config().render.line_alpha, 0.25);
}

#[test]
fn test_tuning_ignored_after_teardown() {
    let mut driver = running(5);
    driver.detach();

    let physics = PhysicsConfig { damping: 0.5, ..PhysicsConfig::default() };
    driver.set_physics(physics).unwrap();
    let render = RenderConfig { line_alpha: 0.9, ..RenderConfig::default() };
    driver.set_render(render).unwrap();

    assert_eq!(driver.config().physics, PhysicsConfig::default());
    assert_eq!(driver.config().render, RenderConfig::default());
}

#[test]
fn test_config_round_trips_through_json() {
    let path = std::env::temp_dir().join(format!("gravfield-it-{}.json", std::process::id()));
    let mut saved = config(120);
    saved.physics.pair_strength = -0.25;
    saved.render.palette.accent = [1, 2, 3];

    saved.save(&path).unwrap();
    let loaded = FieldConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, saved);
}

#[test]
fn test_partial_config_fills_defaults() {
    let path = std::env::temp_dir().join(format!("gravfield-partial-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "particle_count": 12, "physics": { "damping": 0.9 } }"#).unwrap();
    let loaded = FieldConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.particle_count, 12);
    assert_eq!(loaded.physics.damping, 0.9);
    assert_eq!(loaded.physics.pair_max_distance, PhysicsConfig::default().pair_max_distance);
}
